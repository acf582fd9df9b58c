//! Forwarded message extraction.
//!
//! A forwarded message sits below a dashed delimiter line such as
//! `-----Original Message-----` or `---------- Forwarded message ---------`,
//! followed by a `Key: Value` header block and the forwarded body.

use regex::Regex;
use std::sync::OnceLock;

use super::sanitize::signature_index;
use crate::models::ForwardedAttribution;

static FORWARD_DELIMITER_REGEX: OnceLock<Regex> = OnceLock::new();
static ADDRESS_REGEX: OnceLock<Regex> = OnceLock::new();
static FORWARDED_DATE_REGEX: OnceLock<Regex> = OnceLock::new();

/// `-----<anything>-----` on a line of its own, in any language.
fn get_forward_delimiter_regex() -> &'static Regex {
    FORWARD_DELIMITER_REGEX.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*-{3,}.*?-{3,}[ \t]*\r?$").expect("Invalid forward delimiter regex")
    })
}

fn get_address_regex() -> &'static Regex {
    ADDRESS_REGEX.get_or_init(|| {
        Regex::new(r"<?[\w.+-]+@[\w.-]+\.\w+>?").expect("Invalid address regex")
    })
}

/// Day/month tokens in the usual header spellings, followed by a time of day.
///
/// Matches `Mittwoch, 2. Juli 2025 10:15`, `Monday, 7 July 2025 10:15`,
/// `2024-01-01 10:00` and `01.07.2025 10:15`.
fn get_forwarded_date_regex() -> &'static Regex {
    FORWARDED_DATE_REGEX.get_or_init(|| {
        Regex::new(
            r"\b(?:\d{1,2}\.\s*\w+|\w+,\s*\d{1,2}|\d{4}-\d{2}-\d{2}|\d{1,2}[./-]\d{1,2}[./-]\d{2,4})\b.*\d{2}:\d{2}",
        )
        .expect("Invalid forwarded date regex")
    })
}

/// Text of the forwarded message below the delimiter, up to its signature.
pub fn extract_forwarded_message(message: &str) -> Option<String> {
    let delimiter = get_forward_delimiter_regex().find(message)?;
    let forwarded = &message[delimiter.end()..];

    let forwarded = match signature_index(forwarded) {
        Some(end) => &forwarded[..end],
        None => forwarded,
    };

    if forwarded.trim().is_empty() {
        None
    } else {
        log::debug!("found forwarded block below `{}`", delimiter.as_str().trim());
        Some(forwarded.to_string())
    }
}

/// Author and date lines of a forwarded header block.
///
/// The author is the first line carrying an address-shaped token and the
/// date the first line with a date followed by a time; both verbatim.
pub fn extract_forwarded_author_and_date(forwarded: &str) -> ForwardedAttribution {
    let mut attribution = ForwardedAttribution::default();

    for line in forwarded.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if attribution.author.is_none() && get_address_regex().is_match(line) {
            attribution.author = Some(line.to_string());
        }
        if attribution.date.is_none() && get_forwarded_date_regex().is_match(line) {
            attribution.date = Some(line.to_string());
        }
        if attribution.author.is_some() && attribution.date.is_some() {
            break;
        }
    }

    attribution
}

/// Remove the leading `Key: Value` block of a forwarded message.
///
/// The block ends at the first blank line. Unless every non-blank line up
/// to there contains a colon the message is returned unchanged.
pub fn remove_forwarded_header(message: &str) -> String {
    let lines: Vec<&str> = message.split('\n').collect();
    let mut header_end = None;

    for (idx, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            if idx > 0 {
                header_end = Some(idx);
                break;
            }
            continue;
        }
        if !line.contains(':') {
            return message.to_string();
        }
    }

    match header_end {
        Some(end) => lines[end + 1..].join("\n"),
        None => message.to_string(),
    }
}

/// Everything above the forward delimiter, so the forwarded text is not
/// repeated in the outer message.
pub fn remove_forwarded_message(message: &str) -> String {
    match get_forward_delimiter_regex().find(message) {
        Some(delimiter) => message[..delimiter.start()].trim_end().to_string(),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORWARD: &str = "My note\n-----Original Message-----\nFrom: a@b.com\nDate: 2024-01-01 10:00\n\nForwarded body\n-- \nsig";

    #[test]
    fn extracts_forwarded_text_up_to_signature() {
        assert_eq!(
            extract_forwarded_message(FORWARD).as_deref(),
            Some("\nFrom: a@b.com\nDate: 2024-01-01 10:00\n\nForwarded body\n")
        );
    }

    #[test]
    fn no_delimiter_means_no_forward() {
        assert_eq!(extract_forwarded_message("Just text\n--- not closed"), None);
        assert_eq!(extract_forwarded_message("Text\n-----Original Message-----\n  "), None);
    }

    #[test]
    fn localized_delimiters() {
        let message = "Siehe unten\n-----Ursprüngliche Nachricht-----\nVon: Max <max@example.de>\n\nInhalt";
        assert!(extract_forwarded_message(message).is_some());
        let gmail = "FYI\n---------- Forwarded message ---------\nFrom: Ann <ann@example.com>\n\nBody";
        assert!(extract_forwarded_message(gmail).is_some());
    }

    #[test]
    fn finds_author_and_date_lines() {
        let forwarded = "\nVon: Max Mustermann <max@example.de>\nGesendet: Mittwoch, 2. Juli 2025 10:15\nAn: team@example.de\n\nHallo";
        assert_eq!(
            extract_forwarded_author_and_date(forwarded),
            ForwardedAttribution {
                author: Some("Von: Max Mustermann <max@example.de>".to_string()),
                date: Some("Gesendet: Mittwoch, 2. Juli 2025 10:15".to_string()),
            }
        );
    }

    #[test]
    fn missing_author_and_date() {
        assert_eq!(
            extract_forwarded_author_and_date("no header here"),
            ForwardedAttribution::default()
        );
    }

    #[test]
    fn removes_uniform_header_block() {
        let forwarded = "\nFrom: a@b.com\nDate: 2024-01-01 10:00\n\nForwarded body\n";
        assert_eq!(remove_forwarded_header(forwarded), "Forwarded body\n");
    }

    #[test]
    fn keeps_message_when_header_shape_is_unclear() {
        let forwarded = "From: a@b.com\nsome prose without a colon\n\nbody";
        assert_eq!(remove_forwarded_header(forwarded), forwarded);
        assert_eq!(remove_forwarded_header("Subject: only header"), "Subject: only header");
    }

    #[test]
    fn outer_message_loses_forwarded_section() {
        assert_eq!(remove_forwarded_message(FORWARD), "My note");
        assert_eq!(remove_forwarded_message("untouched"), "untouched");
    }
}
