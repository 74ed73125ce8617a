//! Current-state and history record types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// What justified a resolved deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineSource {
    Parsed,
    Seed,
    Fallback,
}

impl fmt::Display for DeadlineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeadlineSource::Parsed => "parsed",
            DeadlineSource::Seed => "seed",
            DeadlineSource::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

/// Current deadline state of one conference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineRecord {
    pub current_deadline: NaiveDate,
    pub source: DeadlineSource,
    pub last_checked: DateTime<Utc>,
    pub last_changed: DateTime<Utc>,
}

impl DeadlineRecord {
    /// Record implied by the last history entry, for conferences with no
    /// published state.
    pub fn from_history(entry: &HistoryEntry) -> Self {
        Self {
            current_deadline: entry.deadline,
            source: entry.source,
            last_checked: entry.observed_at,
            last_changed: entry.observed_at,
        }
    }
}

/// One observed deadline value in a conference's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub deadline: NaiveDate,
    pub observed_at: DateTime<Utc>,
    pub source: DeadlineSource,
}
