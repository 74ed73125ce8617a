//! Page fetcher implementations.
//!
//! - `HttpFetcher` - plain HTTP GET with HTML-to-text conversion
//! - `MockFetcher` - canned pages for tests

pub mod http;
mod mock;

pub use http::{html_to_text, HttpFetcher, DEFAULT_USER_AGENT};
pub use mock::MockFetcher;

pub use crate::traits::fetcher::PageFetcher;
