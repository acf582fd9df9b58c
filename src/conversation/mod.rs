//! Conversation history reconstruction.
//!
//! Turns the plain-text body of a reply thread into an ordered list of
//! [`ConversationEntry`] values, newest first.
//!
//! ## Pipeline
//!
//! 1. `quotes`: split unquoted text from `>` lines, then segment the quoted
//!    lines into one chunk per original message.
//! 2. `header`: find each chunk's attribution line and strip it.
//! 3. `forwarded`: split off a forwarded message and its header block.
//! 4. `sanitize`: remove signatures, separators, disclaimers, blank runs.
//!
//! ## Attribution shift
//!
//! The line "On …, Ann wrote:" introducing a quoted message is written by
//! the person replying, so it ends up at the bottom of the *newer* chunk.
//! The header found in chunk `i` therefore describes chunk `i + 1`; the
//! top chunk never gets a header-derived author.
//!
//! Nothing in here fails: unrecognized structure stays in the message body.

pub mod forwarded;
pub mod header;
pub mod quotes;
pub mod sanitize;

pub use forwarded::{
    extract_forwarded_author_and_date, extract_forwarded_message, remove_forwarded_header,
    remove_forwarded_message,
};
pub use header::{
    extract_date_and_author_line, parse_date_and_author_line, remove_date_and_author_lines,
};
pub use quotes::{SplitBody, extract_quoted_messages, quote_level, split_quoted_and_latest};
pub use sanitize::{clean_message, remove_empty_lines, remove_signature, signature_index};

use crate::config::ParserConfig;
use crate::models::{Attribution, ConversationEntry};

/// Reconstruct a conversation with the default configuration.
///
/// `None`, empty and whitespace-only bodies yield an empty list.
pub fn extract_conversation_history<'a>(body: impl Into<Option<&'a str>>) -> Vec<ConversationEntry> {
    ConversationParser::default().parse(body)
}

/// Conversation parser bound to a [`ParserConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConversationParser {
    config: ParserConfig,
}

impl ConversationParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Reconstruct the conversation contained in `body`, newest entry first.
    pub fn parse<'a>(&self, body: impl Into<Option<&'a str>>) -> Vec<ConversationEntry> {
        let Some(body) = body.into() else {
            return Vec::new();
        };
        let body = normalize_line_endings(body);
        if body.trim().is_empty() {
            return Vec::new();
        }

        let chunks = self.raw_chunks(&body);
        let strategy = self.config.header_strategy;

        let header_lines: Vec<Option<&str>> = chunks
            .iter()
            .map(|chunk| extract_date_and_author_line(chunk, strategy))
            .collect();
        let attributions = self.attribute_chunks(&header_lines);

        let entries: Vec<ConversationEntry> = chunks
            .iter()
            .zip(attributions)
            .map(|(chunk, attribution)| self.build_entry(chunk, attribution))
            .collect();

        log::debug!(
            "reconstructed {} conversation entries ({} attributed)",
            entries.len(),
            entries.iter().filter(|entry| !entry.is_unattributed()).count()
        );
        entries
    }

    /// Unquoted text followed by the quoted chunks, newest to oldest.
    fn raw_chunks(&self, body: &str) -> Vec<String> {
        let split = split_quoted_and_latest(body);
        let quoted = extract_quoted_messages(&split.quoted_lines, self.config.tolerate_spaced_quotes);

        let mut chunks = Vec::with_capacity(quoted.len() + 1);
        chunks.push(split.latest_message);
        chunks.extend(quoted);
        chunks
    }

    /// Pair `chunks[1..]` with the headers found in `chunks[..n - 1]`.
    ///
    /// The result has one attribution per chunk; the first is always empty.
    fn attribute_chunks(&self, header_lines: &[Option<&str>]) -> Vec<Attribution> {
        let strategy = self.config.header_strategy;
        let describing_next = &header_lines[..header_lines.len().saturating_sub(1)];

        std::iter::once(Attribution::default())
            .chain(describing_next.iter().map(|line| match line {
                Some(line) => parse_date_and_author_line(line, strategy),
                None => Attribution::default(),
            }))
            .take(header_lines.len())
            .collect()
    }

    fn build_entry(&self, chunk: &str, attribution: Attribution) -> ConversationEntry {
        let body = remove_date_and_author_lines(chunk, self.config.header_strategy);

        let forwarded = extract_forwarded_message(&body).map(|text| {
            let header = extract_forwarded_author_and_date(&text);
            ConversationEntry {
                from: header.author.unwrap_or_default(),
                date: header.date.unwrap_or_default(),
                time: String::new(),
                message: clean_message(&remove_forwarded_header(&text), &self.config),
                forwarded_message: None,
            }
        });

        let outer = if forwarded.is_some() {
            remove_forwarded_message(&body)
        } else {
            body
        };

        ConversationEntry::new(attribution, clean_message(&outer, &self.config))
            .with_forwarded(forwarded)
    }
}

fn normalize_line_endings(body: &str) -> String {
    body.replace("\r\n", "\n").replace('\r', "\n")
}
