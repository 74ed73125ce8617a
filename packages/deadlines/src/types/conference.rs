//! Conference registry types.
//!
//! The registry is maintained by hand in YAML. A crawl reads it and never
//! writes it back.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One conference instance, e.g. the 2027 edition of a venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conference {
    /// Stable unique id, e.g. "myconf-2027"
    pub id: String,

    /// Recurring venue this instance belongs to; selects the rule set
    pub family: String,

    /// Edition year, used to complete dates written without a year
    #[serde(default)]
    pub year: Option<i32>,

    pub name: String,

    #[serde(default)]
    pub short_name: Option<String>,

    /// Canonical conference URL
    pub url: String,

    /// Deadline used when nothing better is known
    pub fallback_deadline: NaiveDate,

    /// Maintainer-entered deadlines, including known extensions
    #[serde(default)]
    pub seed_submission_dates: Vec<NaiveDate>,

    /// Pages to crawl, in priority order. Empty means crawl `url`.
    #[serde(default)]
    pub crawl_urls: Vec<String>,
}

impl Conference {
    /// Create a conference with only the required fields set.
    pub fn new(
        id: impl Into<String>,
        family: impl Into<String>,
        url: impl Into<String>,
        fallback_deadline: NaiveDate,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            family: family.into(),
            year: None,
            short_name: None,
            url: url.into(),
            fallback_deadline,
            seed_submission_dates: Vec::new(),
            crawl_urls: Vec::new(),
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_seeds(mut self, seeds: Vec<NaiveDate>) -> Self {
        self.seed_submission_dates = seeds;
        self
    }

    pub fn with_crawl_url(mut self, url: impl Into<String>) -> Self {
        self.crawl_urls.push(url.into());
        self
    }

    /// URLs to fetch for this conference, in order.
    pub fn urls_to_crawl(&self) -> Vec<&str> {
        if self.crawl_urls.is_empty() {
            vec![self.url.as_str()]
        } else {
            self.crawl_urls.iter().map(String::as_str).collect()
        }
    }

    /// Latest maintainer-supplied seed date, if any.
    pub fn latest_seed(&self) -> Option<NaiveDate> {
        self.seed_submission_dates.iter().copied().max()
    }
}

/// The curated list of conferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub conferences: Vec<Conference>,
}

impl Registry {
    pub fn new(conferences: Vec<Conference>) -> Self {
        Self { conferences }
    }

    /// Parse and validate registry YAML.
    pub fn from_yaml_str(yaml: &str, origin: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let registry: Registry =
            serde_yaml::from_str(yaml).map_err(|source| ConfigError::Yaml {
                origin: origin.to_string(),
                source,
            })?;
        registry.validate()?;
        Ok(registry)
    }

    /// Read the registry from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml, &path.display().to_string())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for conf in &self.conferences {
            if conf.id.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    id: conf.name.clone(),
                    field: "id",
                });
            }
            if conf.family.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    id: conf.id.clone(),
                    field: "family",
                });
            }
            if conf.url.trim().is_empty() && conf.crawl_urls.is_empty() {
                return Err(ConfigError::EmptyField {
                    id: conf.id.clone(),
                    field: "url",
                });
            }
            if !seen.insert(conf.id.as_str()) {
                return Err(ConfigError::DuplicateId(conf.id.clone()));
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Conference> {
        self.conferences.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.conferences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conferences.is_empty()
    }
}
