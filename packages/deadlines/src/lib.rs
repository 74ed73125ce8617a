//! Conference Deadline Crawler
//!
//! Keeps a curated list of academic conferences up to date with their
//! paper-submission deadlines by fetching each conference's pages,
//! extracting date candidates near deadline keywords, and reconciling them
//! with seeds, a fallback and the previously published value.
//!
//! # Pipeline
//!
//! 1. Fetch every crawl URL of a conference ([`PageFetcher`])
//! 2. Extract candidate dates using the family's rules ([`Extractor`], [`RuleStore`])
//! 3. Pick one deadline, never moving it earlier ([`reconcile::resolve`])
//! 4. Publish it to the snapshot and append changes to the history ([`Snapshot`], [`HistoryLedger`])
//!
//! # Usage
//!
//! ```rust,ignore
//! use deadlines::{Crawler, HttpFetcher, JsonFileStore, Registry, RuleStore};
//!
//! let registry = Registry::load("conferences.yaml".as_ref())?;
//! let rules = RuleStore::load("crawler_rules.yaml".as_ref())?;
//! let fetcher = HttpFetcher::new(DEFAULT_USER_AGENT, Duration::from_secs(30))?;
//!
//! let crawler = Crawler::new(registry, rules, fetcher, JsonFileStore::new("data"));
//! let report = crawler.run().await?;
//! ```
//!
//! # Modules
//!
//! - [`types`] - Conferences, rules, candidates and records
//! - [`extract`] - Keyword-anchored date extraction
//! - [`reconcile`] - Deadline selection policy
//! - [`ledger`] - Append-only deadline history
//! - [`snapshot`] - Published per-conference state
//! - [`crawler`] - Run orchestration
//! - [`fetchers`] - HTTP and mock page fetchers
//! - [`stores`] - JSON file and in-memory state stores

pub mod config;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetchers;
pub mod ledger;
pub mod reconcile;
pub mod rule_store;
pub mod snapshot;
pub mod stores;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use config::Config;
pub use crawler::{CrawlOptions, CrawlReport, Crawler};
pub use error::{ConfigError, DateParseError, DeadlineError, FetchError, FetchResult, Result};
pub use extract::Extractor;
pub use fetchers::{HttpFetcher, MockFetcher, DEFAULT_USER_AGENT};
pub use ledger::HistoryLedger;
pub use reconcile::{resolve, Resolution};
pub use rule_store::RuleStore;
pub use snapshot::{ConferenceStatus, CrawlStatus, Snapshot};
pub use stores::{JsonFileStore, MemoryStore};
pub use traits::{
    fetcher::PageFetcher,
    store::{CrawlState, StateStore},
};
pub use types::{
    candidate::CandidateDate,
    conference::{Conference, Registry},
    page::FetchedPage,
    record::{DeadlineRecord, DeadlineSource, HistoryEntry},
    rules::{FamilyRules, RuleFile, RuleLayer},
};
