use serde::{Deserialize, Serialize};

// ===== Conversation Models =====

/// One logical message reconstructed from an email body.
///
/// The first entry of a conversation is the unquoted top message; its
/// author and date come from the message metadata, so `from`, `date` and
/// `time` stay empty here. Quoted entries carry whatever the attribution
/// header of the previous chunk said, in its original textual form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEntry {
    pub from: String,
    pub date: String,
    pub time: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forwarded_message: Option<Box<ConversationEntry>>,
}

impl ConversationEntry {
    pub fn new(attribution: Attribution, message: String) -> Self {
        ConversationEntry {
            from: attribution.from,
            date: attribution.date,
            time: attribution.time,
            message,
            forwarded_message: None,
        }
    }

    pub fn with_forwarded(mut self, forwarded: Option<ConversationEntry>) -> Self {
        self.forwarded_message = forwarded.map(Box::new);
        self
    }

    /// True when no attribution header was found for this entry.
    pub fn is_unattributed(&self) -> bool {
        self.from.is_empty() && self.date.is_empty() && self.time.is_empty()
    }
}

/// Sender, date and time recovered from a reply header line.
///
/// Either all three fields are set or none is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attribution {
    pub from: String,
    pub date: String,
    pub time: String,
}

impl Attribution {
    pub fn new(from: String, date: String, time: String) -> Self {
        if from.is_empty() || date.is_empty() || time.is_empty() {
            return Attribution::default();
        }
        Attribution { from, date, time }
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_empty()
    }
}

/// Author and date lines found in the header block of a forwarded message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ForwardedAttribution {
    pub author: Option<String>,
    pub date: Option<String>,
}

// ===== Message Store Models =====

/// A node of the structured message tree handed out by the mail host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default)]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<MessagePart>,
}

/// Attachment metadata that can be uploaded alongside a new issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentInfo {
    pub name: String,
    pub content_type: String,
    pub size: Option<u64>,
    pub part_name: Option<String>,
}

/// Header fields of the message an issue is created from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageMeta {
    pub subject: String,
    pub author: String,
    pub date: Option<chrono::DateTime<chrono::Utc>>,
}

/// Everything the issue form needs from a single email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailContent {
    #[serde(flatten)]
    pub meta: MessageMeta,
    pub attachments: Vec<AttachmentInfo>,
    pub conversation_history: Vec<ConversationEntry>,
}
