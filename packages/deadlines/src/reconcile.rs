//! Deadline reconciliation.
//!
//! Decision order for the newly considered value:
//! 1. latest parsed candidate (`parsed`)
//! 2. latest seed date, if it beats the prior deadline or there is no prior (`seed`)
//! 3. the fallback deadline (`fallback`)
//!
//! The published value is then the later of that value and the prior
//! deadline, so a deadline never moves backwards. `source` still names what
//! justified the newly considered value.

use chrono::{DateTime, NaiveDate, Utc};

use crate::types::candidate::CandidateDate;
use crate::types::conference::Conference;
use crate::types::record::{DeadlineRecord, DeadlineSource};

/// Outcome of reconciling one conference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub record: DeadlineRecord,

    /// Value considered this pass, before the monotonic merge
    pub considered: NaiveDate,

    /// Published deadline differs from the prior one (or there was none)
    pub changed: bool,
}

/// Decide the current deadline for `conference`.
pub fn resolve(
    conference: &Conference,
    candidates: &[CandidateDate],
    prior: Option<&DeadlineRecord>,
    now: DateTime<Utc>,
) -> Resolution {
    let prior_deadline = prior.map(|p| p.current_deadline);
    let (considered, source) = consider(conference, candidates, prior_deadline);

    let current_deadline = match prior_deadline {
        Some(prev) => prev.max(considered),
        None => considered,
    };
    let changed = prior_deadline != Some(current_deadline);

    let last_changed = match prior {
        Some(p) if !changed => p.last_changed,
        _ => now,
    };

    Resolution {
        record: DeadlineRecord {
            current_deadline,
            source,
            last_checked: now,
            last_changed,
        },
        considered,
        changed,
    }
}

fn consider(
    conference: &Conference,
    candidates: &[CandidateDate],
    prior_deadline: Option<NaiveDate>,
) -> (NaiveDate, DeadlineSource) {
    if let Some(latest) = candidates.iter().map(|c| c.date).max() {
        return (latest, DeadlineSource::Parsed);
    }

    if let Some(seed) = conference.latest_seed() {
        if prior_deadline.map_or(true, |prev| seed > prev) {
            return (seed, DeadlineSource::Seed);
        }
    }

    (conference.fallback_deadline, DeadlineSource::Fallback)
}
