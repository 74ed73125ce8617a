//! Deadline crawl CLI
//!
//! Runs one crawl over the conference registry and writes the snapshot and
//! history into the data directory. Flags override environment settings.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use deadlines::{
    Config, CrawlOptions, Crawler, HttpFetcher, JsonFileStore, Registry, RuleStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "crawl-deadlines")]
#[command(about = "Crawl conference pages and update submission deadlines")]
struct Cli {
    /// Conference registry (YAML)
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Crawler rules (YAML)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Directory for conferences.json and deadline_history.json
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[arg(long)]
    user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Conferences crawled at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Retry once without TLS verification when a connection fails
    #[arg(long)]
    insecure_tls_retry: bool,

    /// Crawl and report without writing any files
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn apply(self, mut config: Config) -> (Config, bool) {
        if let Some(path) = self.registry {
            config.registry_path = path;
        }
        if let Some(path) = self.rules {
            config.rules_path = path;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(ua) = self.user_agent {
            config.user_agent = ua;
        }
        if let Some(secs) = self.timeout {
            config.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = self.concurrency {
            config.concurrency = n.max(1);
        }
        if self.insecure_tls_retry {
            config.insecure_tls_retry = true;
        }
        (config, self.dry_run)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,deadlines=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();
    let (config, dry_run) = cli.apply(Config::from_env()?);

    tracing::info!(
        registry = %config.registry_path.display(),
        rules = %config.rules_path.display(),
        data_dir = %config.data_dir.display(),
        dry_run,
        "Starting deadline crawl"
    );

    let registry = Registry::load(&config.registry_path).context("Failed to load registry")?;
    let rules = RuleStore::load(&config.rules_path).context("Failed to load crawler rules")?;

    let mut fetcher = HttpFetcher::new(config.user_agent.clone(), config.fetch_timeout)
        .context("Failed to build HTTP client")?;
    if config.insecure_tls_retry {
        fetcher = fetcher
            .with_insecure_retry(config.fetch_timeout)
            .context("Failed to build insecure HTTP client")?;
    }

    let options = CrawlOptions::default()
        .with_concurrency(config.concurrency)
        .with_dry_run(dry_run);

    let crawler = Crawler::new(
        registry,
        rules,
        fetcher,
        JsonFileStore::new(config.data_dir.clone()),
    )
    .with_options(options);

    let report = crawler.run().await.context("Crawl failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
