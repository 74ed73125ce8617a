//! Mock fetcher for testing.
//!
//! Serves canned pages by URL and records every request.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::PageFetcher;
use crate::types::page::FetchedPage;

/// Mock fetcher for testing.
///
/// Unknown URLs answer with HTTP 404; URLs marked as failing answer with
/// HTTP 503.
///
/// # Example
///
/// ```rust
/// use deadlines::fetchers::MockFetcher;
///
/// let mock = MockFetcher::new()
///     .with_page("https://myconf.org/cfp", "Paper submission deadline: March 20, 2027")
///     .with_failure("https://down.example.org");
/// ```
#[derive(Default, Clone)]
pub struct MockFetcher {
    /// Canned page text indexed by URL
    pages: Arc<RwLock<HashMap<String, String>>>,
    /// URLs that always fail
    failing: Arc<RwLock<HashSet<String>>>,
    /// Requested URLs, in order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create a new empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `text` for `url`, replacing any previous page.
    pub fn set_page(&self, url: impl Into<String>, text: impl Into<String>) {
        self.pages.write().unwrap().insert(url.into(), text.into());
    }

    /// Make `url` fail on every request.
    pub fn set_failure(&self, url: impl Into<String>) {
        self.failing.write().unwrap().insert(url.into());
    }

    /// Builder form of `set_page`.
    pub fn with_page(self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.set_page(url, text);
        self
    }

    /// Builder form of `set_failure`.
    pub fn with_failure(self, url: impl Into<String>) -> Self {
        self.set_failure(url);
        self
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Clear all recorded calls.
    pub fn reset_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.calls.write().unwrap().push(url.to_string());

        if self.failing.read().unwrap().contains(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 503,
            });
        }

        let pages = self.pages.read().unwrap();
        match pages.get(url) {
            Some(text) => Ok(FetchedPage::new(url, text.clone())),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_pages_and_records_calls() {
        let mock = MockFetcher::new()
            .with_page("https://a.org", "Deadline: 2027-03-20")
            .with_failure("https://b.org");

        let page = mock.fetch("https://a.org").await.unwrap();
        assert_eq!(page.text, "Deadline: 2027-03-20");

        assert!(matches!(
            mock.fetch("https://b.org").await,
            Err(FetchError::Status { status: 503, .. })
        ));
        assert!(matches!(
            mock.fetch("https://c.org").await,
            Err(FetchError::Status { status: 404, .. })
        ));

        assert_eq!(
            mock.calls(),
            vec!["https://a.org", "https://b.org", "https://c.org"]
        );
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let mock = MockFetcher::new();
        let clone = mock.clone();
        clone.set_page("https://a.org", "text");

        assert!(mock.fetch("https://a.org").await.is_ok());
        assert_eq!(clone.call_count(), 1);
    }
}
