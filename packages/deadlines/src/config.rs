use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::crawler::DEFAULT_CONCURRENCY;
use crate::fetchers::http::DEFAULT_USER_AGENT;

/// Crawler configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub registry_path: PathBuf,
    pub rules_path: PathBuf,
    pub data_dir: PathBuf,
    pub user_agent: String,
    pub fetch_timeout: Duration,
    pub concurrency: usize,
    pub insecure_tls_retry: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from("conferences.yaml"),
            rules_path: PathBuf::from("crawler_rules.yaml"),
            data_dir: PathBuf::from("data"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout: Duration::from_secs(30),
            concurrency: DEFAULT_CONCURRENCY,
            insecure_tls_retry: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from any variable source. Unset variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            registry_path: lookup("DEADLINES_REGISTRY")
                .map(PathBuf::from)
                .unwrap_or(defaults.registry_path),
            rules_path: lookup("DEADLINES_RULES")
                .map(PathBuf::from)
                .unwrap_or(defaults.rules_path),
            data_dir: lookup("DEADLINES_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            user_agent: lookup("DEADLINES_USER_AGENT").unwrap_or(defaults.user_agent),
            fetch_timeout: match lookup("DEADLINES_FETCH_TIMEOUT_SECS") {
                Some(v) => Duration::from_secs(
                    v.parse()
                        .context("DEADLINES_FETCH_TIMEOUT_SECS must be a whole number of seconds")?,
                ),
                None => defaults.fetch_timeout,
            },
            concurrency: match lookup("DEADLINES_CONCURRENCY") {
                Some(v) => v
                    .parse::<usize>()
                    .context("DEADLINES_CONCURRENCY must be a positive number")?
                    .max(1),
                None => defaults.concurrency,
            },
            insecure_tls_retry: match lookup("DEADLINES_INSECURE_TLS_RETRY") {
                Some(v) => parse_flag(&v)
                    .context("DEADLINES_INSECURE_TLS_RETRY must be true or false")?,
                None => defaults.insecure_tls_retry,
            },
        })
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("invalid boolean: {other}"),
    }
}
