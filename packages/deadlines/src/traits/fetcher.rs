//! Page fetch boundary.
//!
//! # Usage
//!
//! ```rust,ignore
//! use deadlines::traits::fetcher::PageFetcher;
//!
//! let page = fetcher.fetch("https://myconf.org/2027/cfp").await?;
//! for line in page.lines() {
//!     println!("{line}");
//! }
//! ```

use async_trait::async_trait;

use crate::error::FetchResult;
use crate::types::page::FetchedPage;

/// Fetches one URL and returns its text.
///
/// Implementations own timeouts. Retries are not expected: a failed fetch
/// is reported and the crawl moves on to the next URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for std::sync::Arc<T> {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        (**self).fetch(url).await
    }
}
