//! Raw RFC 5322 message loading.
//!
//! Builds the same part tree the mail host hands out, so a message saved as
//! `.eml` goes through exactly the same text-part lookup and attachment
//! filtering as one coming from the host.

use chrono::{DateTime, Utc};
use mailparse::{MailHeaderMap, ParsedMail, parse_mail};

use crate::error::MessageError;
use crate::models::{MessageMeta, MessagePart};

/// Parsed message headers plus its part tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub meta: MessageMeta,
    pub parts: Vec<MessagePart>,
}

/// Remove NUL bytes and surrounding whitespace.
fn sanitize_text(text: &str) -> String {
    text.replace('\0', "").trim().to_string()
}

/// Parse raw message bytes into headers and a part tree.
///
/// Missing headers are not errors: the subject defaults to `(No Subject)`,
/// the author to an empty string and an unparseable date to `None`.
pub fn parse_raw_message(raw: &[u8]) -> Result<RawMessage, MessageError> {
    let parsed = parse_mail(raw).map_err(|e| {
        log::debug!("failed to parse MIME: {}", e);
        MessageError::MimeParse(e)
    })?;

    let subject = parsed
        .headers
        .get_first_value("Subject")
        .map(|s| sanitize_text(&s))
        .unwrap_or_else(|| "(No Subject)".to_string());

    let author = parsed
        .headers
        .get_first_value("From")
        .map(|s| sanitize_text(&s))
        .unwrap_or_default();

    let date = parse_message_date(parsed.headers.get_first_value("Date"), &subject);

    let root = convert_part(&parsed, "1".to_string());
    log::trace!("loaded message: {}", subject);

    Ok(RawMessage {
        meta: MessageMeta {
            subject,
            author,
            date,
        },
        parts: vec![root],
    })
}

fn parse_message_date(raw_date: Option<String>, subject: &str) -> Option<DateTime<Utc>> {
    let raw = raw_date.unwrap_or_default();
    if raw.trim().is_empty() {
        log::warn!("message ({}) has no Date header", subject);
        return None;
    }

    match dateparser::parse(&raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(source) => {
            log::warn!("message ({}) has invalid date `{}`: {}", subject, raw, source);
            None
        }
    }
}

/// Convert one MIME node; `part_name` follows the host's `1.2.1` numbering.
fn convert_part(part: &ParsedMail, part_name: String) -> MessagePart {
    let content_type = part.ctype.mimetype.to_ascii_lowercase();
    let is_leaf = part.subparts.is_empty();

    let name = part
        .get_content_disposition()
        .params
        .get("filename")
        .or_else(|| part.ctype.params.get("name"))
        .map(|name| sanitize_text(name))
        .filter(|name| !name.is_empty());

    let body = if is_leaf && content_type.starts_with("text/") {
        part.get_body().ok().map(|body| body.replace('\0', ""))
    } else {
        None
    };

    let size = if is_leaf {
        part.get_body_raw().ok().map(|raw| raw.len() as u64)
    } else {
        None
    };

    let parts = part
        .subparts
        .iter()
        .enumerate()
        .map(|(idx, sub)| convert_part(sub, format!("{}.{}", part_name, idx + 1)))
        .collect();

    MessagePart {
        content_type,
        body,
        name,
        size,
        part_name: Some(part_name),
        parts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{find_attachment_parts, find_text_part};

    const MULTIPART: &str = concat!(
        "Message-ID: <multi@test>\r\n",
        "Subject: Printer broken\r\n",
        "From: Max Mustermann <max@example.de>\r\n",
        "Date: Sat, 12 Jul 2025 14:35:00 +0200\r\n",
        "MIME-Version: 1.0\r\n",
        "Content-Type: multipart/mixed; boundary=\"XYZ\"\r\n",
        "\r\n",
        "--XYZ\r\n",
        "Content-Type: text/plain; charset=utf-8\r\n",
        "\r\n",
        "The printer on floor 2 is broken.\r\n",
        "--XYZ\r\n",
        "Content-Type: application/pdf; name=\"report.pdf\"\r\n",
        "Content-Disposition: attachment; filename=\"report.pdf\"\r\n",
        "Content-Transfer-Encoding: base64\r\n",
        "\r\n",
        "JVBERi0xLjQK\r\n",
        "--XYZ--\r\n",
    );

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text("hello\0world"), "helloworld");
        assert_eq!(sanitize_text("  test  "), "test");
    }

    #[test]
    fn test_parse_multipart_message() {
        let message = parse_raw_message(MULTIPART.as_bytes()).unwrap();

        assert_eq!(message.meta.subject, "Printer broken");
        assert_eq!(message.meta.author, "Max Mustermann <max@example.de>");
        assert_eq!(
            message.meta.date.map(|d| d.to_rfc3339()),
            Some("2025-07-12T12:35:00+00:00".to_string())
        );

        let root = &message.parts[0];
        assert_eq!(root.content_type, "multipart/mixed");
        assert_eq!(root.parts.len(), 2);
        assert_eq!(root.parts[1].part_name.as_deref(), Some("1.2"));

        let text = find_text_part(&message.parts).expect("text part");
        assert!(text.body.as_deref().unwrap().contains("floor 2"));

        let attachments = find_attachment_parts(&message.parts);
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].name, "report.pdf");
        assert_eq!(attachments[0].size, Some(9));
    }

    #[test]
    fn test_missing_headers_use_defaults() {
        let raw = "Content-Type: text/plain\r\n\r\nJust a body\r\n";
        let message = parse_raw_message(raw.as_bytes()).unwrap();

        assert_eq!(message.meta.subject, "(No Subject)");
        assert_eq!(message.meta.author, "");
        assert_eq!(message.meta.date, None);
        assert_eq!(message.parts[0].body.as_deref().map(str::trim), Some("Just a body"));
    }

    #[test]
    fn test_invalid_date_is_dropped() {
        let raw = "Subject: x\r\nDate: not-a-real-date\r\n\r\nBody\r\n";
        let message = parse_raw_message(raw.as_bytes()).unwrap();
        assert_eq!(message.meta.date, None);
    }
}
