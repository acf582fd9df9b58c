use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning raw message bytes into a message tree.
///
/// Conversation parsing itself never fails; only the loaders around it do.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("failed to parse MIME structure: {0}")]
    MimeParse(#[from] mailparse::MailParseError),
}

/// Errors raised while loading parser configuration from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid disclaimer list in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown header strategy `{0}`")]
    UnknownHeaderStrategy(String),
}
