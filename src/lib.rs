//! Reconstruct the conversation history of a reply email and render it as
//! an issue description.
//!
//! The entry points are [`extract_conversation_history`] for a plain-text
//! body and [`get_email_content`] for a whole message.

pub mod config;
pub mod conversation;
pub mod description;
pub mod error;
pub mod message;
pub mod models;

pub use config::{DisclaimerList, HeaderStrategy, ParserConfig};
pub use conversation::{ConversationParser, extract_conversation_history};
pub use description::{Labels, generate_base_description, generate_full_description};
pub use error::{ConfigError, MessageError};
pub use message::{get_email_content, parse_raw_message};
pub use models::{AttachmentInfo, ConversationEntry, EmailContent, MessageMeta, MessagePart};

use env_logger::Env;
use std::sync::Once;

static LOGGER: Once = Once::new();

/// Install the `env_logger` backend once; `RUST_LOG` overrides `info`.
pub fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(Env::default().default_filter_or("info"))
            .format_timestamp(None)
            .init();
    });
}
