//! Data types shared across the crawl pipeline.

pub mod candidate;
pub mod conference;
pub mod page;
pub mod record;
pub mod rules;
