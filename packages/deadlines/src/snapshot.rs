//! Flat current-state snapshot read by the calendar page.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::reconcile::Resolution;
use crate::types::candidate::CandidateDate;
use crate::types::conference::Conference;
use crate::types::record::{DeadlineRecord, DeadlineSource};

/// Window before the deadline in which earlier dates count as extensions.
pub const EXTENSION_LOOKBACK_DAYS: i64 = 120;

/// Whether any page for the conference was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStatus {
    Ok,
    Fallback,
}

/// Snapshot entry for one conference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConferenceStatus {
    pub id: String,
    pub family: String,
    pub year: Option<i32>,
    pub name: String,
    pub short_name: Option<String>,
    pub url: String,

    #[serde(flatten)]
    pub record: DeadlineRecord,

    pub fallback_deadline: NaiveDate,

    /// Seed and parsed dates up to the deadline, plus the deadline itself
    pub dates_found: Vec<NaiveDate>,

    pub observed_extension_days: i64,
    pub is_firm: bool,
    pub confidence: f64,
    pub status: CrawlStatus,

    #[serde(default)]
    pub errors: Vec<String>,
}

impl ConferenceStatus {
    pub fn build(
        conference: &Conference,
        resolution: &Resolution,
        candidates: &[CandidateDate],
        pages_fetched: usize,
        errors: Vec<String>,
    ) -> Self {
        let record = resolution.record.clone();
        let deadline = record.current_deadline;

        let chosen_firm = candidates
            .iter()
            .any(|c| c.date == resolution.considered && c.is_firm);
        let is_firm = match record.source {
            DeadlineSource::Parsed => chosen_firm,
            DeadlineSource::Seed => true,
            DeadlineSource::Fallback => false,
        };

        let mut confidence = confidence_score(candidates, chosen_firm);
        if record.source == DeadlineSource::Seed {
            confidence = confidence.max(0.95);
        }

        let dates_found = dates_found(
            conference
                .seed_submission_dates
                .iter()
                .copied()
                .chain(candidates.iter().map(|c| c.date)),
            deadline,
        );
        let observed_extension_days = extension_days(&dates_found, deadline);

        Self {
            id: conference.id.clone(),
            family: conference.family.clone(),
            year: conference.year,
            name: conference.name.clone(),
            short_name: conference.short_name.clone(),
            url: conference.url.clone(),
            record,
            fallback_deadline: conference.fallback_deadline,
            dates_found,
            observed_extension_days,
            is_firm,
            confidence,
            status: if pages_fetched > 0 {
                CrawlStatus::Ok
            } else {
                CrawlStatus::Fallback
            },
            errors,
        }
    }
}

/// Current state of every conference, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    entries: IndexMap<String, ConferenceStatus>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, status: ConferenceStatus) {
        self.entries.insert(status.id.clone(), status);
    }

    pub fn get(&self, id: &str) -> Option<&ConferenceStatus> {
        self.entries.get(id)
    }

    /// Prior deadline state for reconciliation.
    pub fn record_for(&self, id: &str) -> Option<&DeadlineRecord> {
        self.entries.get(id).map(|s| &s.record)
    }

    /// Order entries by deadline, then id.
    pub fn sort_by_deadline(&mut self) {
        self.entries.sort_by(|a_id, a, b_id, b| {
            a.record
                .current_deadline
                .cmp(&b.record.current_deadline)
                .then_with(|| a_id.cmp(b_id))
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConferenceStatus> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sorted distinct dates not after `deadline`, plus `deadline`.
pub fn dates_found(dates: impl IntoIterator<Item = NaiveDate>, deadline: NaiveDate) -> Vec<NaiveDate> {
    let mut found: Vec<NaiveDate> = dates.into_iter().filter(|d| *d <= deadline).collect();
    found.push(deadline);
    found.sort();
    found.dedup();
    found
}

/// Days between the earliest and latest dates within the lookback window
/// before `deadline`. Zero with fewer than two such dates.
pub fn extension_days(dates: &[NaiveDate], deadline: NaiveDate) -> i64 {
    let relevant: Vec<NaiveDate> = dates
        .iter()
        .copied()
        .filter(|d| {
            let delta = (deadline - *d).num_days();
            (0..=EXTENSION_LOOKBACK_DAYS).contains(&delta)
        })
        .collect();

    match (relevant.iter().min(), relevant.iter().max()) {
        (Some(first), Some(last)) if relevant.len() >= 2 => (*last - *first).num_days().max(0),
        _ => 0,
    }
}

/// Heuristic trust in the parsed result.
fn confidence_score(candidates: &[CandidateDate], chosen_firm: bool) -> f64 {
    if candidates.is_empty() {
        return 0.0;
    }
    // every candidate was found next to an include keyword
    let mut score: f64 = 0.45 + 0.25;
    if candidates.len() > 1 {
        score += 0.1;
    }
    if chosen_firm {
        score += 0.15;
    }
    (score.min(0.95) * 100.0).round() / 100.0
}
