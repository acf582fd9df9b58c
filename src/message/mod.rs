//! Message store adapter: part-tree lookups and raw message loading.

pub mod mime;
pub mod parts;

pub use mime::{RawMessage, parse_raw_message};
pub use parts::{ALLOWED_ATTACHMENT_TYPES, find_attachment_parts, find_text_part};

use crate::conversation::ConversationParser;
use crate::models::EmailContent;

/// Collect the header fields, attachments and conversation of a message.
///
/// A message without a usable `text/plain` part gets an empty history.
pub fn get_email_content(message: &RawMessage, parser: &ConversationParser) -> EmailContent {
    let body = find_text_part(&message.parts).and_then(|part| part.body.as_deref());
    if body.is_none() {
        log::debug!("message ({}) has no text/plain body", message.meta.subject);
    }

    EmailContent {
        meta: message.meta.clone(),
        attachments: find_attachment_parts(&message.parts),
        conversation_history: parser.parse(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessagePart;

    #[test]
    fn html_only_message_has_no_history() {
        let message = RawMessage {
            meta: Default::default(),
            parts: vec![MessagePart {
                content_type: "text/html".to_string(),
                body: Some("<p>Hello</p>".to_string()),
                ..MessagePart::default()
            }],
        };
        let content = get_email_content(&message, &ConversationParser::default());
        assert!(content.conversation_history.is_empty());
        assert!(content.attachments.is_empty());
    }

    #[test]
    fn text_message_is_parsed() {
        let raw = concat!(
            "Subject: Login fails\r\n",
            "From: Ann Lee <ann@example.com>\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "Still failing.\r\n",
            "\r\n",
            "On 3/4/2024 9:15 AM, Bob Stone wrote:\r\n",
            "> Please try again.\r\n",
        );
        let message = parse_raw_message(raw.as_bytes()).unwrap();
        let content = get_email_content(&message, &ConversationParser::default());

        assert_eq!(content.meta.subject, "Login fails");
        assert_eq!(content.conversation_history.len(), 2);
        assert_eq!(content.conversation_history[0].message, "Still failing.");
        assert_eq!(content.conversation_history[1].from, "Bob Stone");
        assert_eq!(content.conversation_history[1].message, "Please try again.");
    }
}
