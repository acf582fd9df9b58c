//! Issue description rendering.
//!
//! Turns a reconstructed conversation into the Markdown body of a new
//! issue: one block per entry (sender, date, message), entries separated by
//! horizontal rules, forwarded messages rendered below their parent, and an
//! optional `[attachments]` preview block at the end.

use chrono::{Datelike, NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::models::{AttachmentInfo, ConversationEntry, MessageMeta};

/// Parse formats for header dates, tried in order.
///
/// Slash dates are read month-first like most mail clients write them; a
/// day-first reading is only used when month-first is impossible. `%Y`
/// also accepts two digits, so the `%y` forms go first.
const DATE_FORMATS: &[&str] = &[
    "%d.%m.%y",
    "%d.%m.%Y",
    "%Y-%m-%d",
    "%m/%d/%y",
    "%d/%m/%y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

static ATTACHMENT_BLOCK_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_attachment_block_regex() -> &'static Regex {
    ATTACHMENT_BLOCK_REGEX.get_or_init(|| {
        Regex::new(r"\n*\[attachments\][\s\S]*?\[/attachments\]\s*")
            .expect("Invalid attachment block regex")
    })
}

/// User-facing strings of the rendered description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub from: String,
    pub date_received: String,
    pub forwarded_message: String,
    pub unknown_sender: String,
    pub no_date: String,
    pub no_content: String,
    pub no_email_content: String,
    pub attachments_title: String,
    pub attachment_preview_text: String,
    pub attachment_disclaimer: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            from: "From".to_string(),
            date_received: "Received on".to_string(),
            forwarded_message: "Forwarded Message".to_string(),
            unknown_sender: "Unknown sender".to_string(),
            no_date: "No date available.".to_string(),
            no_content: "No content available.".to_string(),
            no_email_content: "No email content available.".to_string(),
            attachments_title: "Attachments".to_string(),
            attachment_preview_text: "This attachment will be uploaded when the issue is created."
                .to_string(),
            attachment_disclaimer: "DO NOT EDIT!".to_string(),
        }
    }
}

/// Render the conversation as the issue description.
///
/// The first entry is attributed to the message's own author and date.
pub fn generate_base_description(
    history: &[ConversationEntry],
    meta: &MessageMeta,
    labels: &Labels,
) -> String {
    if history.is_empty() {
        return labels.no_content.clone();
    }

    history
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let separator = if index > 0 { "\n---\n" } else { "" };
            let main = format_entry(entry, index, false, meta, labels);
            let forwarded = entry
                .forwarded_message
                .as_deref()
                .map(|fwd| format!("\n\n{}", format_entry(fwd, index, true, meta, labels)))
                .unwrap_or_default();
            format!("{separator}{main}{forwarded}")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn format_entry(
    entry: &ConversationEntry,
    index: usize,
    is_forwarded: bool,
    meta: &MessageMeta,
    labels: &Labels,
) -> String {
    let from = determine_sender(entry, index, is_forwarded, meta, labels);
    let date = format_date(entry, index, is_forwarded, meta, labels);
    let prefix = if is_forwarded {
        format!("**({})**\n", labels.forwarded_message)
    } else {
        "\n".to_string()
    };

    let message = entry.message.trim();
    let message = if message.is_empty() {
        labels.no_email_content.as_str()
    } else {
        message
    };

    format!(
        "{prefix}**{}**: {from}\n**{}**: {date}\n\n{message}",
        labels.from, labels.date_received
    )
}

fn determine_sender(
    entry: &ConversationEntry,
    index: usize,
    is_forwarded: bool,
    meta: &MessageMeta,
    labels: &Labels,
) -> String {
    if index == 0 && !is_forwarded && !meta.author.is_empty() {
        return meta.author.clone();
    }
    if entry.from.is_empty() {
        labels.unknown_sender.clone()
    } else {
        entry.from.clone()
    }
}

fn format_date(
    entry: &ConversationEntry,
    index: usize,
    is_forwarded: bool,
    meta: &MessageMeta,
    labels: &Labels,
) -> String {
    if index == 0 && !is_forwarded {
        if let Some(date) = meta.date {
            return date.format("%Y-%m-%d %H:%M").to_string();
        }
    }

    if entry.date.is_empty() {
        return labels.no_date.clone();
    }

    let date = parse_entry_date(&entry.date)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| entry.date.clone());
    format!("{} {}", date, format_time(&entry.time))
        .trim()
        .to_string()
}

/// Read a header date token with the known formats.
pub fn parse_entry_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .find(|date| date.year() >= 100)
}

/// Normalize a header time token to 24-hour `HH:MM`.
///
/// Unparseable tokens are returned unchanged.
pub fn format_time(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    let upper = raw.to_ascii_uppercase();
    let is_12_hour = upper.contains("AM") || upper.contains("PM");
    let formats: &[&str] = if is_12_hour {
        &["%I:%M %p", "%I:%M%p", "%I:%M:%S %p"]
    } else {
        &["%H:%M", "%H:%M:%S"]
    };

    match formats
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(&upper, format).ok())
    {
        Some(time) => time.format("%H:%M").to_string(),
        None => {
            log::warn!("invalid time format: {}", raw);
            raw.to_string()
        }
    }
}

/// One preview line per attachment that will be uploaded with the issue.
pub fn attachment_preview(attachments: &[AttachmentInfo], labels: &Labels) -> String {
    attachments
        .iter()
        .map(|attachment| {
            format!(
                "**{}:** _{}_ *({})* **{}**",
                labels.attachments_title,
                attachment.name,
                labels.attachment_preview_text,
                labels.attachment_disclaimer
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Combine the current description text with a fresh attachment block.
///
/// Any previous `[attachments]` block is replaced. Blank text falls back to
/// `base_description`.
pub fn generate_full_description(
    current_text: &str,
    base_description: &str,
    attachments: &[AttachmentInfo],
    labels: &Labels,
) -> String {
    let stripped = get_attachment_block_regex().replace_all(current_text.trim(), "");
    let text = stripped.trim();
    let text = if text.is_empty() { base_description } else { text };

    if attachments.is_empty() {
        return text.to_string();
    }

    format!(
        "{text}\n\n[attachments]\n{}\n[/attachments]",
        attachment_preview(attachments, labels)
    )
}
