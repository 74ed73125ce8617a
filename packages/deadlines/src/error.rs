//! Typed errors for the deadline engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can
//! match on per-conference failures. Fetch errors stay in their own type and
//! never abort a crawl.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while crawling and reconciling deadlines.
#[derive(Debug, Error)]
pub enum DeadlineError {
    /// Registry or rule file could not be loaded
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// No rule set exists for a conference family
    #[error("no crawler rules for family: {family}")]
    MissingRules { family: String },

    /// History requested for an id that was never registered
    #[error("unknown conference: {id}")]
    UnknownConference { id: String },

    /// History append would break time ordering
    #[error("observation for {id} at {observed_at} is not after the last entry at {last}")]
    OutOfOrder {
        id: String,
        observed_at: DateTime<Utc>,
        last: DateTime<Utc>,
    },

    /// Snapshot or history storage failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Errors raised while loading the registry or rule files. The binary exits
/// non-zero on any of them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed YAML in {origin}: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("duplicate conference id: {0}")]
    DuplicateId(String),

    #[error("conference {id} has an empty {field}")]
    EmptyField { id: String, field: &'static str },
}

/// Errors from the page fetch boundary. Always recovered per URL.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Could not connect, including TLS handshake failures
    #[error("connect failed for {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Connection timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// A date-like token was found but does not name a usable calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    #[error("not a calendar date: {raw}")]
    Impossible { raw: String },

    #[error("no year in {raw} and none to assume")]
    MissingYear { raw: String },

    #[error("ambiguous day/month order: {raw}")]
    Ambiguous { raw: String },
}

/// Result type alias for deadline operations.
pub type Result<T> = std::result::Result<T, DeadlineError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
