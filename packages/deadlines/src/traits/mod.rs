//! Boundary traits for the crawl pipeline.
//!
//! Applications implement these to plug in page fetching and state
//! persistence.

pub mod fetcher;
pub mod store;
