use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Placeholder used when a message is empty after cleaning.
pub const DEFAULT_NO_CONTENT_TEXT: &str = "No content available.";

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// How reply attribution lines are recognized and parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderStrategy {
    /// Fixed table of per-locale grammars, most specific first, generic last.
    #[default]
    Grammar,
    /// Any date token plus any time token; the author is the capitalized
    /// words between the time and the next colon.
    TokenScan,
}

impl fmt::Display for HeaderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HeaderStrategy::Grammar => "grammar",
            HeaderStrategy::TokenScan => "token-scan",
        })
    }
}

impl FromStr for HeaderStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grammar" | "" => Ok(HeaderStrategy::Grammar),
            "token-scan" | "token_scan" | "tokens" => Ok(HeaderStrategy::TokenScan),
            other => Err(ConfigError::UnknownHeaderStrategy(other.to_string())),
        }
    }
}

/// Phrases at which a message body is truncated (legal footers, company
/// boilerplate and the like). Empty unless the caller supplies phrases.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisclaimerList {
    phrases: Vec<String>,
}

impl DisclaimerList {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(Into::into)
                .filter(|phrase: &String| !phrase.is_empty())
                .collect(),
        }
    }

    /// Load a JSON array of phrases.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let phrases: Vec<String> =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(phrases))
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Byte offset of the earliest phrase occurrence in `text`.
    pub fn earliest_match(&self, text: &str) -> Option<usize> {
        self.phrases
            .iter()
            .filter_map(|phrase| text.find(phrase.as_str()))
            .min()
    }
}

/// Runtime configuration for conversation parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    pub header_strategy: HeaderStrategy,
    /// Count `> > text` as two quote levels instead of one.
    pub tolerate_spaced_quotes: bool,
    pub no_content_text: String,
    pub disclaimers: DisclaimerList,
}

impl ParserConfig {
    pub fn from_env() -> Self {
        let header_strategy = env::var("MAIL2TICKET_HEADER_STRATEGY")
            .ok()
            .and_then(|value| match HeaderStrategy::from_str(&value) {
                Ok(strategy) => Some(strategy),
                Err(err) => {
                    log::warn!("ignoring MAIL2TICKET_HEADER_STRATEGY: {}", err);
                    None
                }
            })
            .unwrap_or_default();

        let disclaimers = match env::var("MAIL2TICKET_DISCLAIMERS_FILE") {
            Ok(path) if !path.trim().is_empty() => DisclaimerList::from_json_file(path.trim())
                .unwrap_or_else(|err| {
                    log::warn!("ignoring disclaimer list: {}", err);
                    DisclaimerList::default()
                }),
            _ => DisclaimerList::default(),
        };

        Self {
            header_strategy,
            tolerate_spaced_quotes: env_bool("MAIL2TICKET_SPACED_QUOTES", false),
            no_content_text: env_string("MAIL2TICKET_NO_CONTENT_TEXT", DEFAULT_NO_CONTENT_TEXT),
            disclaimers,
        }
    }

    pub fn with_header_strategy(mut self, strategy: HeaderStrategy) -> Self {
        self.header_strategy = strategy;
        self
    }

    pub fn with_disclaimers(mut self, disclaimers: DisclaimerList) -> Self {
        self.disclaimers = disclaimers;
        self
    }

    pub fn with_spaced_quotes(mut self, tolerate: bool) -> Self {
        self.tolerate_spaced_quotes = tolerate;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            header_strategy: HeaderStrategy::default(),
            tolerate_spaced_quotes: false,
            no_content_text: DEFAULT_NO_CONTENT_TEXT.to_string(),
            disclaimers: DisclaimerList::default(),
        }
    }
}
