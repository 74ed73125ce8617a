//! In-memory state store for testing and development.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::error::Result;
use crate::traits::store::{CrawlState, StateStore};

/// In-memory crawl state.
///
/// Useful for testing. Not suitable for production as data is lost on
/// restart.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<CrawlState>,
    saves: RwLock<usize>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with state.
    pub fn with_state(state: CrawlState) -> Self {
        Self {
            state: RwLock::new(state),
            saves: RwLock::new(0),
        }
    }

    /// Copy of the stored state.
    pub fn state(&self) -> CrawlState {
        self.state.read().unwrap().clone()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        *self.saves.read().unwrap()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<CrawlState> {
        Ok(self.state.read().unwrap().clone())
    }

    async fn save(&self, state: &CrawlState) -> Result<()> {
        *self.state.write().unwrap() = state.clone();
        *self.saves.write().unwrap() += 1;
        Ok(())
    }
}
