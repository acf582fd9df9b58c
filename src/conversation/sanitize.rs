//! Body cleanup for reconstructed messages.
//!
//! Removes what is not part of the written message: quote markers,
//! signatures, decorative separator lines and configured disclaimer
//! footers. Blank-line runs are collapsed so the result renders cleanly in
//! an issue description.

use regex::Regex;
use std::sync::OnceLock;

use crate::config::{DisclaimerList, ParserConfig};

static PLAIN_SIGNATURE_REGEX: OnceLock<Regex> = OnceLock::new();
static HTML_SIGNATURE_REGEX: OnceLock<Regex> = OnceLock::new();
static SEPARATOR_LINE_REGEX: OnceLock<Regex> = OnceLock::new();

/// RFC 3676 signature delimiter: a line holding exactly `-- `.
fn get_plain_signature_regex() -> &'static Regex {
    PLAIN_SIGNATURE_REGEX
        .get_or_init(|| Regex::new(r"(?m)^-- \r?$").expect("Invalid plain signature regex"))
}

/// A bare `--` wrapped in the tags HTML-to-text conversion tends to leave
/// behind. The `--` must start a line or directly follow a tag.
fn get_html_signature_regex() -> &'static Regex {
    HTML_SIGNATURE_REGEX.get_or_init(|| {
        Regex::new(r"(?im)(?:^|<br\s*/?>|</div>|</pre>)[ \t]*--[ \t]*(?:<br\s*/?>|</div>|</pre>)")
            .expect("Invalid HTML signature regex")
    })
}

/// Lines made only of decorative runs such as `-=-=-=` or `*** ###`.
fn get_separator_line_regex() -> &'static Regex {
    SEPARATOR_LINE_REGEX.get_or_init(|| {
        Regex::new(r"^(?:[*\-_=+#~]{3,}\s*)+$").expect("Invalid separator line regex")
    })
}

/// True for a run of three or more identical non-alphanumeric characters.
fn is_uniform_run(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if first.is_alphanumeric() || first.is_whitespace() {
        return false;
    }
    let mut count = 1;
    for c in chars {
        if c != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

/// Generic separator line: `--`, `__`, or a uniform run like `=====`,
/// optionally preceded by `>` markers or wrapped in `*`.
fn is_generic_separator(line: &str) -> bool {
    let trimmed = line.trim_end();
    if trimmed == "--" || trimmed == "__" {
        return true;
    }

    let core = trimmed.trim_start_matches('>').trim_start();
    if is_uniform_run(core) {
        return true;
    }

    core.len() > 2
        && core.starts_with('*')
        && core.ends_with('*')
        && is_uniform_run(&core[1..core.len() - 1])
}

fn generic_separator_index(message: &str) -> Option<usize> {
    let mut offset = 0;
    for line in message.split('\n') {
        if is_generic_separator(line) {
            return Some(offset);
        }
        offset += line.len() + 1;
    }
    None
}

/// Byte offset where the signature block starts.
///
/// The plain `-- ` delimiter, the HTML-wrapped `--` and the generic
/// separator line are all searched; the earliest match wins.
pub fn signature_index(message: &str) -> Option<usize> {
    let plain = get_plain_signature_regex().find(message).map(|m| m.start());
    let html = get_html_signature_regex().find(message).map(|m| m.start());
    let generic = generic_separator_index(message);

    [plain, html, generic].into_iter().flatten().min()
}

/// Drop everything from the signature delimiter on.
pub fn remove_signature(message: &str) -> String {
    match signature_index(message) {
        Some(index) => message[..index].trim_end().to_string(),
        None => message.to_string(),
    }
}

/// Strip leading `>` markers (and the space after them) from every line.
pub fn strip_quote_markers(message: &str) -> String {
    message
        .split('\n')
        .map(|line| {
            let unquoted = line.trim_start_matches('>');
            if unquoted.len() == line.len() {
                line
            } else {
                unquoted.trim_start()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove lines that consist only of decorative separator runs.
pub fn remove_separator_lines(message: &str) -> String {
    let re = get_separator_line_regex();
    message
        .split('\n')
        .filter(|line| !re.is_match(line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cut the message at the first configured disclaimer phrase.
pub fn truncate_at_disclaimer<'a>(message: &'a str, disclaimers: &DisclaimerList) -> &'a str {
    match disclaimers.earliest_match(message) {
        Some(index) => {
            log::trace!("truncating message at disclaimer offset {}", index);
            message[..index].trim_end()
        }
        None => message,
    }
}

/// Trim trailing whitespace per line and collapse blank-line runs to one.
pub fn remove_empty_lines(message: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut last_was_blank = true;

    for line in message.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            if last_was_blank {
                continue;
            }
            last_was_blank = true;
        } else {
            last_was_blank = false;
        }
        kept.push(trimmed);
    }

    kept.join("\n").trim().to_string()
}

/// Full cleanup chain; never returns an empty string.
pub fn clean_message(message: &str, config: &ParserConfig) -> String {
    let text = strip_quote_markers(message);
    let text = remove_signature(&text);
    let text = remove_separator_lines(&text);
    let text = truncate_at_disclaimer(&text, &config.disclaimers);
    let text = remove_empty_lines(text);

    if text.is_empty() {
        config.no_content_text.clone()
    } else {
        text
    }
}
