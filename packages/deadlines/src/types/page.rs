//! Fetched page text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Plain text of a fetched page, one logical line per `\n`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    /// URL the page was requested from
    pub url: String,

    /// Normalised page text
    pub text: String,

    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,

    /// Caveat about how the page was obtained, e.g. TLS verification skipped
    #[serde(default)]
    pub note: Option<String>,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            fetched_at: Utc::now(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = fetched_at;
        self
    }

    /// Trimmed, non-empty lines of the page.
    pub fn lines(&self) -> Vec<&str> {
        self.text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }

    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
