//! Persistence of crawl state between runs.

use async_trait::async_trait;

use crate::error::Result;
use crate::ledger::HistoryLedger;
use crate::snapshot::Snapshot;

/// Everything a crawl reads from and writes back to storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlState {
    pub snapshot: Snapshot,
    pub history: HistoryLedger,
}

/// Load and save the snapshot and history ledger.
///
/// `save` is called once, after every conference has been processed.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Previous state, or an empty state on first run.
    async fn load(&self) -> Result<CrawlState>;

    async fn save(&self, state: &CrawlState) -> Result<()>;
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for std::sync::Arc<T> {
    async fn load(&self) -> Result<CrawlState> {
        (**self).load().await
    }

    async fn save(&self, state: &CrawlState) -> Result<()> {
        (**self).save(state).await
    }
}
