use crate::models::{AttachmentInfo, MessagePart};

/// Content types offered for upload alongside a new issue.
pub const ALLOWED_ATTACHMENT_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/png"];

/// First `text/plain` part with a body, searched depth-first.
pub fn find_text_part(parts: &[MessagePart]) -> Option<&MessagePart> {
    for part in parts {
        let has_body = part.body.as_deref().is_some_and(|body| !body.is_empty());
        if part.content_type.eq_ignore_ascii_case("text/plain") && has_body {
            return Some(part);
        }
        if let Some(nested) = find_text_part(&part.parts) {
            return Some(nested);
        }
    }
    None
}

/// Named parts with an allowed content type, searched depth-first.
///
/// A named PDF or image counts as an attachment regardless of its
/// content disposition, since inline images are often what a ticket needs.
pub fn find_attachment_parts(parts: &[MessagePart]) -> Vec<AttachmentInfo> {
    let mut attachments = Vec::new();
    collect_attachments(parts, &mut attachments);
    attachments
}

fn collect_attachments(parts: &[MessagePart], attachments: &mut Vec<AttachmentInfo>) {
    for part in parts {
        let content_type = part.content_type.to_ascii_lowercase();
        if let Some(name) = part.name.as_deref().filter(|name| !name.is_empty()) {
            if ALLOWED_ATTACHMENT_TYPES.contains(&content_type.as_str()) {
                attachments.push(AttachmentInfo {
                    name: name.to_string(),
                    content_type,
                    size: part.size,
                    part_name: part.part_name.clone(),
                });
            }
        }
        collect_attachments(&part.parts, attachments);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(content_type: &str) -> MessagePart {
        MessagePart {
            content_type: content_type.to_string(),
            ..MessagePart::default()
        }
    }

    fn sample_tree() -> Vec<MessagePart> {
        let mut html = part("text/html");
        html.body = Some("<p>Hi</p>".to_string());

        let mut text = part("text/plain");
        text.body = Some("Hi".to_string());
        text.part_name = Some("1.1.2".to_string());

        let mut alternative = part("multipart/alternative");
        alternative.parts = vec![html, text];

        let mut pdf = part("application/pdf");
        pdf.name = Some("invoice.pdf".to_string());
        pdf.size = Some(2048);
        pdf.part_name = Some("1.2".to_string());

        let mut zip = part("application/zip");
        zip.name = Some("logs.zip".to_string());

        let mut unnamed_png = part("image/png");
        unnamed_png.part_name = Some("1.4".to_string());

        let mut root = part("multipart/mixed");
        root.parts = vec![alternative, pdf, zip, unnamed_png];
        vec![root]
    }

    #[test]
    fn finds_nested_text_part() {
        let tree = sample_tree();
        let text = find_text_part(&tree).expect("text part");
        assert_eq!(text.part_name.as_deref(), Some("1.1.2"));
        assert_eq!(text.body.as_deref(), Some("Hi"));
    }

    #[test]
    fn empty_text_part_is_skipped() {
        let mut empty = part("text/plain");
        empty.body = Some(String::new());
        assert!(find_text_part(&[empty]).is_none());
        assert!(find_text_part(&[]).is_none());
    }

    #[test]
    fn only_named_allowed_attachments_are_listed() {
        let attachments = find_attachment_parts(&sample_tree());
        assert_eq!(
            attachments,
            vec![AttachmentInfo {
                name: "invoice.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                size: Some(2048),
                part_name: Some("1.2".to_string()),
            }]
        );
    }
}
