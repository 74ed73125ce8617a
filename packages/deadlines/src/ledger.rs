//! Append-only deadline history per conference.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DeadlineError, Result};
use crate::types::record::{DeadlineSource, HistoryEntry};

/// Every distinct deadline value observed for each registered conference.
///
/// Serialises as a map from conference id to its time-ordered entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLedger {
    entries: BTreeMap<String, Vec<HistoryEntry>>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a conference known to the ledger. Existing history is kept.
    pub fn register(&mut self, conference_id: &str) {
        self.entries.entry(conference_id.to_string()).or_default();
    }

    pub fn is_registered(&self, conference_id: &str) -> bool {
        self.entries.contains_key(conference_id)
    }

    /// Record an observed deadline.
    ///
    /// Returns `Ok(false)` without touching the ledger when `deadline` equals
    /// the last recorded value.
    pub fn append(
        &mut self,
        conference_id: &str,
        deadline: NaiveDate,
        observed_at: DateTime<Utc>,
        source: DeadlineSource,
    ) -> Result<bool> {
        let history = self.entries.get_mut(conference_id).ok_or_else(|| {
            DeadlineError::UnknownConference {
                id: conference_id.to_string(),
            }
        })?;

        if let Some(last) = history.last() {
            if last.deadline == deadline {
                return Ok(false);
            }
            if observed_at <= last.observed_at {
                return Err(DeadlineError::OutOfOrder {
                    id: conference_id.to_string(),
                    observed_at,
                    last: last.observed_at,
                });
            }
        }

        history.push(HistoryEntry {
            deadline,
            observed_at,
            source,
        });
        Ok(true)
    }

    /// Ordered history of one conference.
    pub fn history_for(&self, conference_id: &str) -> Result<&[HistoryEntry]> {
        self.entries
            .get(conference_id)
            .map(Vec::as_slice)
            .ok_or_else(|| DeadlineError::UnknownConference {
                id: conference_id.to_string(),
            })
    }

    /// Most recently recorded deadline, if any.
    pub fn latest(&self, conference_id: &str) -> Option<&HistoryEntry> {
        self.entries.get(conference_id).and_then(|h| h.last())
    }

    pub fn conference_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Total number of entries across all conferences.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, 6, 0, 0).unwrap()
    }

    #[test]
    fn test_append_skips_repeated_value() {
        let mut ledger = HistoryLedger::new();
        ledger.register("a-2027");

        assert!(ledger
            .append("a-2027", date(2027, 3, 20), at(1), DeadlineSource::Parsed)
            .unwrap());
        assert!(!ledger
            .append("a-2027", date(2027, 3, 20), at(2), DeadlineSource::Parsed)
            .unwrap());
        assert!(ledger
            .append("a-2027", date(2027, 3, 27), at(3), DeadlineSource::Parsed)
            .unwrap());

        let history = ledger.history_for("a-2027").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].observed_at, at(1));
        assert_eq!(history[1].deadline, date(2027, 3, 27));
    }

    #[test]
    fn test_unknown_conference() {
        let mut ledger = HistoryLedger::new();
        assert!(matches!(
            ledger.history_for("ghost"),
            Err(DeadlineError::UnknownConference { .. })
        ));
        assert!(matches!(
            ledger.append("ghost", date(2027, 1, 1), at(1), DeadlineSource::Fallback),
            Err(DeadlineError::UnknownConference { .. })
        ));
    }

    #[test]
    fn test_registered_without_entries_is_empty() {
        let mut ledger = HistoryLedger::new();
        ledger.register("a-2027");
        assert!(ledger.history_for("a-2027").unwrap().is_empty());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_out_of_order_rejected() {
        let mut ledger = HistoryLedger::new();
        ledger.register("a-2027");
        ledger
            .append("a-2027", date(2027, 3, 20), at(5), DeadlineSource::Parsed)
            .unwrap();

        let err = ledger
            .append("a-2027", date(2027, 3, 27), at(4), DeadlineSource::Parsed)
            .unwrap_err();
        assert!(matches!(err, DeadlineError::OutOfOrder { .. }));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_serialises_as_map_of_id_to_entries() {
        let mut ledger = HistoryLedger::new();
        ledger.register("a-2027");
        ledger
            .append("a-2027", date(2027, 3, 20), at(1), DeadlineSource::Seed)
            .unwrap();

        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json["a-2027"][0]["deadline"], "2027-03-20");
        assert_eq!(json["a-2027"][0]["source"], "seed");
    }
}
