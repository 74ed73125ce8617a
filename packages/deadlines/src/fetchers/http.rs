//! HTTP page fetcher.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::PageFetcher;
use crate::types::page::FetchedPage;

pub const DEFAULT_USER_AGENT: &str = "ConferenceCalendarBot/0.2";

lazy_static! {
    static ref SCRIPT_REGEX: Regex = Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap();
    static ref STYLE_REGEX: Regex = Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap();
    static ref COMMENT_REGEX: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref CELL_REGEX: Regex = Regex::new(r"(?i)</t[dh]\s*>").unwrap();
    static ref BLOCK_REGEX: Regex = Regex::new(
        r"(?i)<br\s*/?>|</?(?:p|div|li|ul|ol|tr|table|h[1-6]|section|article|header|footer|dt|dd|dl|blockquote)\b[^>]*>"
    )
    .unwrap();
    static ref TAG_REGEX: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref SPACES_REGEX: Regex = Regex::new(r"[ \t\u{a0}]+").unwrap();
}

/// Fetches pages over HTTP(S) and converts HTML to plain text lines.
///
/// # Example
///
/// ```rust,ignore
/// use deadlines::fetchers::HttpFetcher;
///
/// let fetcher = HttpFetcher::new(DEFAULT_USER_AGENT, Duration::from_secs(30))?;
/// let page = fetcher.fetch("https://myconf.org/2027/cfp").await?;
/// ```
pub struct HttpFetcher {
    client: reqwest::Client,
    /// Used once per URL when the verified request fails to connect
    insecure_client: Option<reqwest::Client>,
    user_agent: String,
}

impl HttpFetcher {
    /// Create a fetcher with the given user agent and request timeout.
    pub fn new(user_agent: impl Into<String>, timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        Ok(Self {
            client,
            insecure_client: None,
            user_agent: user_agent.into(),
        })
    }

    /// Retry once without certificate verification after a connect failure.
    pub fn with_insecure_retry(mut self, timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;
        self.insecure_client = Some(client);
        Ok(self)
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    async fn get_html(&self, client: &reqwest::Client, url: &str) -> FetchResult<String> {
        let response = client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify(url, e))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
            });
        }

        debug!(url = %url, "HTTP fetch starting");

        let (html, note) = match (
            self.get_html(&self.client, url).await,
            &self.insecure_client,
        ) {
            (Ok(html), _) => (html, None),
            (Err(FetchError::Connect { source, .. }), Some(insecure)) => {
                warn!(url = %url, error = %source, "Verified fetch failed, retrying without TLS verification");
                let html = self.get_html(insecure, url).await?;
                (
                    html,
                    Some("fetched without TLS verification".to_string()),
                )
            }
            (Err(e), _) => return Err(e),
        };

        let text = html_to_text(&html);
        debug!(url = %url, lines = text.lines().count(), "Page fetched successfully");

        let mut page = FetchedPage::new(url, text).with_fetched_at(Utc::now());
        page.note = note;
        Ok(page)
    }
}

fn classify(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            source: Box::new(e),
        }
    } else {
        FetchError::Http(Box::new(e))
    }
}

/// Convert HTML to plain text, one block element per line.
///
/// Table cells stay on their row's line so a label and its date remain
/// together.
pub fn html_to_text(html: &str) -> String {
    let text = SCRIPT_REGEX.replace_all(html, "");
    let text = STYLE_REGEX.replace_all(&text, "");
    let text = COMMENT_REGEX.replace_all(&text, "");
    let text = CELL_REGEX.replace_all(&text, " ");
    let text = BLOCK_REGEX.replace_all(&text, "\n");
    let text = TAG_REGEX.replace_all(&text, "");

    let text = text
        .replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    text.lines()
        .map(|l| SPACES_REGEX.replace_all(l, " ").trim().to_string())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
