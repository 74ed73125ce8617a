//! Crawl orchestration.
//!
//! Each conference is handled independently: its pages are fetched in
//! order, candidates from every fetched page are pooled, and the pool is
//! reconciled once. A failing URL, missing rules, or an unparsable date only
//! affects that conference. State is written once, after all conferences.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{DeadlineError, Result};
use crate::extract::Extractor;
use crate::reconcile::{resolve, Resolution};
use crate::rule_store::RuleStore;
use crate::snapshot::{ConferenceStatus, Snapshot};
use crate::traits::fetcher::PageFetcher;
use crate::traits::store::{CrawlState, StateStore};
use crate::types::candidate::CandidateDate;
use crate::types::conference::{Conference, Registry};
use crate::types::page::FetchedPage;
use crate::types::record::DeadlineRecord;

/// Default number of conferences crawled concurrently.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Options for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Conferences processed at once
    pub concurrency: usize,

    /// Run everything but skip saving state
    pub dry_run: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            dry_run: false,
        }
    }
}

impl CrawlOptions {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    pub conferences: usize,
    pub urls_fetched: usize,
    pub urls_failed: usize,
    pub missing_rules: usize,
    pub candidates: usize,
    pub deadlines_changed: usize,
    pub history_appended: usize,
}

/// Result of crawling one conference, before it is merged into state.
#[derive(Debug, Clone)]
struct ConferenceOutcome {
    status: ConferenceStatus,
    resolution: Resolution,
    prior: Option<DeadlineRecord>,
    urls_fetched: usize,
    urls_failed: usize,
    missing_rules: bool,
    candidates: usize,
}

/// Runs the fetch, extract, reconcile, record pipeline over a registry.
///
/// # Example
///
/// ```rust,ignore
/// use deadlines::{Crawler, HttpFetcher, JsonFileStore};
///
/// let crawler = Crawler::new(registry, rules, fetcher, JsonFileStore::new("data"));
/// let report = crawler.run().await?;
/// ```
pub struct Crawler<F: PageFetcher, S: StateStore> {
    registry: Registry,
    rules: RuleStore,
    fetcher: F,
    store: S,
    options: CrawlOptions,
}

impl<F: PageFetcher, S: StateStore> Crawler<F, S> {
    pub fn new(registry: Registry, rules: RuleStore, fetcher: F, store: S) -> Self {
        Self {
            registry,
            rules,
            fetcher,
            store,
            options: CrawlOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CrawlOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Load state, crawl every conference, save state.
    pub async fn run(&self) -> Result<CrawlReport> {
        self.run_at(Utc::now()).await
    }

    /// `run` with an explicit clock.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<CrawlReport> {
        let state = self.store.load().await?;
        let (state, report) = self.crawl(state, now).await?;

        if self.options.dry_run {
            info!("Dry run, state not saved");
        } else {
            self.store.save(&state).await?;
        }

        info!(
            conferences = report.conferences,
            urls_fetched = report.urls_fetched,
            urls_failed = report.urls_failed,
            changed = report.deadlines_changed,
            "Crawl complete"
        );
        Ok(report)
    }

    /// Crawl all conferences against `state` and return the updated state.
    ///
    /// Conferences no longer in the registry are dropped from the snapshot;
    /// their history is kept. A conference without a snapshot entry takes its
    /// prior deadline from its last history entry.
    ///
    /// A history append that fails for one conference keeps that
    /// conference's prior record and does not affect the others.
    pub async fn crawl(
        &self,
        mut state: CrawlState,
        now: DateTime<Utc>,
    ) -> Result<(CrawlState, CrawlReport)> {
        let mut report = CrawlReport::default();
        let mut snapshot = Snapshot::new();
        let concurrency = self.options.concurrency.max(1);

        info!(
            conferences = self.registry.len(),
            concurrency, "Starting deadline crawl"
        );

        for chunk in self.registry.conferences.chunks(concurrency) {
            let futures: Vec<_> = chunk
                .iter()
                .map(|conf| {
                    let prior = prior_record(&state, &conf.id);
                    self.crawl_conference(conf, prior, now)
                })
                .collect();

            for mut outcome in join_all(futures).await {
                let id = outcome.status.id.clone();

                state.history.register(&id);
                if outcome.resolution.changed {
                    let record = &outcome.status.record;
                    match state.history.append(&id, record.current_deadline, now, record.source) {
                        Ok(appended) => {
                            report.deadlines_changed += 1;
                            if appended {
                                report.history_appended += 1;
                            }
                        }
                        Err(e) => {
                            warn!(conference_id = %id, error = %e, "History append failed, keeping prior record");
                            outcome.status.errors.push(e.to_string());
                            if let Some(prior) = outcome.prior.take() {
                                outcome.status.record = DeadlineRecord {
                                    last_checked: now,
                                    ..prior
                                };
                            }
                        }
                    }
                }

                report.conferences += 1;
                report.urls_fetched += outcome.urls_fetched;
                report.urls_failed += outcome.urls_failed;
                report.candidates += outcome.candidates;
                if outcome.missing_rules {
                    report.missing_rules += 1;
                }

                snapshot.insert(outcome.status);
            }
        }

        snapshot.sort_by_deadline();
        state.snapshot = snapshot;
        Ok((state, report))
    }

    async fn crawl_conference(
        &self,
        conf: &Conference,
        prior: Option<DeadlineRecord>,
        now: DateTime<Utc>,
    ) -> ConferenceOutcome {
        let mut errors = Vec::new();

        let (pages, urls_failed) = self.fetch_pages(conf, &mut errors).await;

        let mut missing_rules = false;
        let candidates: Vec<CandidateDate> = match self.rules.rules_for_conference(conf) {
            Ok(rules) => Extractor::new(&rules)
                .with_year(conf.year)
                .extract_all(&pages),
            Err(e @ DeadlineError::MissingRules { .. }) => {
                warn!(conference_id = %conf.id, error = %e, "No rules, using seeds or fallback");
                errors.push(e.to_string());
                missing_rules = true;
                Vec::new()
            }
            Err(e) => {
                warn!(conference_id = %conf.id, error = %e, "Rule lookup failed");
                errors.push(e.to_string());
                Vec::new()
            }
        };

        let resolution = resolve(conf, &candidates, prior.as_ref(), now);
        debug!(
            conference_id = %conf.id,
            candidates = candidates.len(),
            deadline = %resolution.record.current_deadline,
            source = %resolution.record.source,
            changed = resolution.changed,
            "Resolved deadline"
        );

        let status =
            ConferenceStatus::build(conf, &resolution, &candidates, pages.len(), errors);

        ConferenceOutcome {
            status,
            resolution,
            prior,
            urls_fetched: pages.len(),
            urls_failed,
            missing_rules,
            candidates: candidates.len(),
        }
    }

    /// Fetch every URL of a conference in order. Failures are logged and
    /// recorded, never propagated.
    async fn fetch_pages(
        &self,
        conf: &Conference,
        errors: &mut Vec<String>,
    ) -> (Vec<FetchedPage>, usize) {
        let mut pages = Vec::new();
        let mut failed = 0;

        for url in conf.urls_to_crawl() {
            match self.fetcher.fetch(url).await {
                Ok(page) => {
                    if let Some(note) = &page.note {
                        errors.push(format!("{url}: {note}"));
                    }
                    if page.has_content() {
                        pages.push(page);
                    }
                }
                Err(e) => {
                    warn!(conference_id = %conf.id, url = %url, error = %e, "Fetch failed, skipping URL");
                    errors.push(format!("{url}: {e}"));
                    failed += 1;
                }
            }
        }

        (pages, failed)
    }
}

/// Published record if any, else the one implied by the last history entry.
fn prior_record(state: &CrawlState, id: &str) -> Option<DeadlineRecord> {
    state
        .snapshot
        .record_for(id)
        .cloned()
        .or_else(|| state.history.latest(id).map(DeadlineRecord::from_history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::MockFetcher;
    use crate::stores::MemoryStore;
    use crate::types::record::DeadlineSource;
    use chrono::{NaiveDate, TimeZone};

    const RULES: &str = r#"
families:
  myconf:
    include_keywords: ["paper submission deadline"]
    exclude_keywords: ["notification"]
"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, 6, 0, 0).unwrap()
    }

    fn conference(id: &str, url: &str) -> Conference {
        Conference::new(id, "myconf", url, date(2027, 3, 15)).with_year(2027)
    }

    #[tokio::test]
    async fn test_fetch_order_follows_crawl_urls() {
        let conf = conference("a-2027", "https://a.org")
            .with_crawl_url("https://a.org/cfp")
            .with_crawl_url("https://a.org/dates");
        let fetcher = MockFetcher::new();
        let crawler = Crawler::new(
            Registry::new(vec![conf]),
            RuleStore::from_yaml_str(RULES, "inline").unwrap(),
            fetcher.clone(),
            MemoryStore::new(),
        );

        crawler.run_at(at(1)).await.unwrap();

        assert_eq!(fetcher.calls(), vec!["https://a.org/cfp", "https://a.org/dates"]);
    }

    #[tokio::test]
    async fn test_dry_run_does_not_save() {
        let crawler = Crawler::new(
            Registry::new(vec![conference("a-2027", "https://a.org")]),
            RuleStore::from_yaml_str(RULES, "inline").unwrap(),
            MockFetcher::new(),
            MemoryStore::new(),
        )
        .with_options(CrawlOptions::default().with_dry_run(true));

        let report = crawler.run_at(at(1)).await.unwrap();

        assert_eq!(report.conferences, 1);
        assert_eq!(crawler.store().save_count(), 0);
    }

    #[tokio::test]
    async fn test_candidates_pooled_across_urls() {
        let conf = conference("a-2027", "https://a.org")
            .with_crawl_url("https://a.org/cfp")
            .with_crawl_url("https://a.org/news");
        let fetcher = MockFetcher::new()
            .with_page("https://a.org/cfp", "Paper submission deadline: March 20, 2027")
            .with_page("https://a.org/news", "Paper submission deadline: March 27, 2027");
        let crawler = Crawler::new(
            Registry::new(vec![conf]),
            RuleStore::from_yaml_str(RULES, "inline").unwrap(),
            fetcher,
            MemoryStore::new(),
        );

        let (state, report) = crawler.crawl(CrawlState::default(), at(1)).await.unwrap();
        let status = state.snapshot.get("a-2027").unwrap();

        assert_eq!(report.candidates, 2);
        assert_eq!(status.record.current_deadline, date(2027, 3, 27));
        assert_eq!(status.record.source, DeadlineSource::Parsed);
        assert_eq!(status.dates_found, vec![date(2027, 3, 20), date(2027, 3, 27)]);
    }

    #[tokio::test]
    async fn test_missing_rules_uses_fallback() {
        let conf = Conference::new("b-2027", "unknown", "https://b.org", date(2027, 5, 1));
        let fetcher =
            MockFetcher::new().with_page("https://b.org", "Paper submission deadline: 2027-06-01");
        let crawler = Crawler::new(
            Registry::new(vec![conf]),
            RuleStore::from_yaml_str(RULES, "inline").unwrap(),
            fetcher,
            MemoryStore::new(),
        );

        let (state, report) = crawler.crawl(CrawlState::default(), at(1)).await.unwrap();
        let status = state.snapshot.get("b-2027").unwrap();

        assert_eq!(report.missing_rules, 1);
        assert_eq!(status.record.current_deadline, date(2027, 5, 1));
        assert_eq!(status.record.source, DeadlineSource::Fallback);
        assert!(status.errors.iter().any(|e| e.contains("unknown")));
    }

    #[tokio::test]
    async fn test_removed_conference_leaves_snapshot_keeps_history() {
        let rules = RuleStore::from_yaml_str(RULES, "inline").unwrap();
        let first = Crawler::new(
            Registry::new(vec![
                conference("a-2027", "https://a.org"),
                conference("old-2026", "https://old.org"),
            ]),
            rules.clone(),
            MockFetcher::new(),
            MemoryStore::new(),
        );
        let (state, _) = first.crawl(CrawlState::default(), at(1)).await.unwrap();

        let second = Crawler::new(
            Registry::new(vec![conference("a-2027", "https://a.org")]),
            rules,
            MockFetcher::new(),
            MemoryStore::new(),
        );
        let (state, _) = second.crawl(state, at(2)).await.unwrap();

        assert!(state.snapshot.get("old-2026").is_none());
        assert_eq!(state.history.history_for("old-2026").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_readded_conference_keeps_deadline_from_history() {
        let rules = RuleStore::from_yaml_str(RULES, "inline").unwrap();
        let conf = Conference::new("a-2027", "myconf", "https://a.org", date(2027, 3, 1));
        let other = Conference::new("b-2027", "myconf", "https://b.org", date(2027, 3, 1));
        let fetcher =
            MockFetcher::new().with_page("https://a.org", "Paper submission deadline: 2027-03-27");

        let full = Crawler::new(
            Registry::new(vec![conf.clone(), other.clone()]),
            rules.clone(),
            fetcher.clone(),
            MemoryStore::new(),
        );
        let without_a = Crawler::new(
            Registry::new(vec![other]),
            rules,
            fetcher.clone(),
            MemoryStore::new(),
        );

        let (state, _) = full.crawl(CrawlState::default(), at(1)).await.unwrap();
        let (state, _) = without_a.crawl(state, at(2)).await.unwrap();
        assert!(state.snapshot.get("a-2027").is_none());

        fetcher.set_failure("https://a.org");
        let (state, report) = full.crawl(state, at(3)).await.unwrap();

        let record = state.snapshot.record_for("a-2027").unwrap();
        assert_eq!(record.current_deadline, date(2027, 3, 27));
        assert_eq!(record.last_changed, at(1));
        assert_eq!(report.history_appended, 0);

        let history: Vec<NaiveDate> = state
            .history
            .history_for("a-2027")
            .unwrap()
            .iter()
            .map(|e| e.deadline)
            .collect();
        assert_eq!(history, vec![date(2027, 3, 27)]);
    }

    #[tokio::test]
    async fn test_history_clock_skew_isolated_to_one_conference() {
        let a = conference("a-2027", "https://a.org");
        let b = conference("b-2027", "https://b.org");
        let fetcher = MockFetcher::new()
            .with_page("https://a.org", "Paper submission deadline: March 20, 2027")
            .with_page("https://b.org", "Paper submission deadline: March 22, 2027");

        // a-2027 carries an entry observed after the run's clock.
        let mut state = CrawlState::default();
        state.history.register("a-2027");
        state
            .history
            .append("a-2027", date(2027, 3, 1), at(20), DeadlineSource::Fallback)
            .unwrap();

        let crawler = Crawler::new(
            Registry::new(vec![a, b]),
            RuleStore::from_yaml_str(RULES, "inline").unwrap(),
            fetcher,
            MemoryStore::with_state(state),
        );

        let report = crawler.run_at(at(3)).await.unwrap();
        let state = crawler.store().state();

        assert_eq!(crawler.store().save_count(), 1);
        assert_eq!(report.deadlines_changed, 1);

        let a = state.snapshot.get("a-2027").unwrap();
        assert_eq!(a.record.current_deadline, date(2027, 3, 1));
        assert_eq!(a.record.last_changed, at(20));
        assert_eq!(a.record.last_checked, at(3));
        assert!(a.errors.iter().any(|e| e.contains("not after")));
        assert_eq!(state.history.history_for("a-2027").unwrap().len(), 1);

        let b = state.snapshot.get("b-2027").unwrap();
        assert_eq!(b.record.current_deadline, date(2027, 3, 22));
        assert_eq!(b.record.source, DeadlineSource::Parsed);
        assert_eq!(state.history.history_for("b-2027").unwrap().len(), 1);
    }
}
