//! Keyword-guided deadline extraction from page text.
//!
//! A line containing an include keyword opens a window of
//! `context_radius` lines on either side. The window is dropped entirely if
//! any of its lines carries an exclude keyword; otherwise every date token
//! in it becomes a candidate. Tokens never span lines.

pub mod dates;

use std::collections::HashSet;

use tracing::debug;

use crate::types::candidate::CandidateDate;
use crate::types::page::FetchedPage;
use crate::types::rules::FamilyRules;

pub use dates::{find_date_tokens, DateForm, DateToken};

const CONTEXT_CHARS: usize = 240;

/// Extracts candidate deadline dates using one rule set.
#[derive(Debug, Clone)]
pub struct Extractor<'a> {
    rules: &'a FamilyRules,
    year: Option<i32>,
}

impl<'a> Extractor<'a> {
    pub fn new(rules: &'a FamilyRules) -> Self {
        Self { rules, year: None }
    }

    /// Year assumed for dates written without one.
    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    /// Candidates from one page, in page order. Empty when no keyword matches.
    pub fn extract(&self, page: &FetchedPage) -> Vec<CandidateDate> {
        self.extract_text(&page.text, &page.url)
    }

    /// Candidates from several pages. No page short-circuits another.
    pub fn extract_all(&self, pages: &[FetchedPage]) -> Vec<CandidateDate> {
        pages.iter().flat_map(|p| self.extract(p)).collect()
    }

    /// Candidates from raw text attributed to `url`.
    pub fn extract_text(&self, text: &str, url: &str) -> Vec<CandidateDate> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let lowered: Vec<String> = lines.iter().map(|l| l.to_lowercase()).collect();

        let radius = self.rules.context_radius;
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut candidates = Vec::new();

        for (idx, lower) in lowered.iter().enumerate() {
            let Some(keyword) = self.rules.include_match(lower) else {
                continue;
            };

            let lo = idx.saturating_sub(radius);
            let hi = (idx + radius).min(lines.len() - 1);

            if (lo..=hi).any(|j| self.rules.is_excluded(&lowered[j])) {
                debug!(url = %url, line = idx, keyword = %keyword, "Window excluded");
                continue;
            }

            for j in lo..=hi {
                for token in find_date_tokens(lines[j]) {
                    if !seen.insert((j, token.start)) {
                        continue;
                    }
                    match token.resolve(self.year) {
                        Ok(date) => candidates.push(CandidateDate {
                            date,
                            keyword: keyword.to_string(),
                            url: url.to_string(),
                            raw: token.raw.clone(),
                            context: lines[j].chars().take(CONTEXT_CHARS).collect(),
                            is_firm: self.rules.is_firm(&lowered[j]),
                            is_extension: self.rules.is_extension(&lowered[j]),
                        }),
                        Err(e) => {
                            debug!(url = %url, token = %token.raw, error = %e, "Dropping date token");
                        }
                    }
                }
            }
        }

        candidates
    }
}
