//! Feed fetcher with bounded retry.
//!
//! This module retrieves feed documents over HTTP and extracts digest items
//! from them. Failures never escape: a feed that cannot be fetched or parsed
//! simply contributes no items.

use std::time::Duration;

use feed_rs::parser;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::FetchConfig;
use crate::rss::types::FeedItem;
use crate::text::normalize;
use crate::{DigestError, Result};

/// A source of digest items keyed by feed URL.
///
/// Implementations must not fail: problems are logged and yield no items.
#[allow(async_fn_in_trait)]
pub trait FeedSource {
    /// Fetch and extract the items of one feed, in document order.
    async fn fetch_items(&self, url: &str) -> Vec<FeedItem>;
}

/// HTTP feed fetcher.
pub struct FeedFetcher {
    client: Client,
    accept: String,
    max_attempts: u32,
    backoff: Duration,
    max_feed_size: u64,
}

impl FeedFetcher {
    /// Create a new fetcher from the fetch configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| DigestError::Feed(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            accept: config.accept.clone(),
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_secs(config.backoff_secs),
            max_feed_size: config.max_feed_size,
        })
    }

    /// Fetch the raw body of a feed.
    ///
    /// Retries on HTTP status >= 400, on bodies larger than the configured
    /// maximum and on transport errors, waiting `attempt * backoff` between
    /// attempts. Returns `None` once every attempt has failed.
    pub async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        for attempt in 1..=self.max_attempts {
            match self.fetch_once(url).await {
                Ok(bytes) => {
                    debug!("Fetched {} ({} bytes)", url, bytes.len());
                    return Some(bytes);
                }
                Err(e) => {
                    warn!(
                        "Fetch attempt {}/{} failed for {}: {}",
                        attempt, self.max_attempts, url, e
                    );
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.backoff * attempt).await;
                    }
                }
            }
        }

        warn!(
            "Giving up on {} after {} attempt(s)",
            url, self.max_attempts
        );
        None
    }

    /// Perform a single GET request.
    async fn fetch_once(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, self.accept.as_str())
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(DigestError::Feed(format!("HTTP error: {}", status)));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_feed_size {
                return Err(DigestError::Feed(format!(
                    "feed too large: {} bytes (max {} bytes)",
                    content_length, self.max_feed_size
                )));
            }
        }

        let bytes = response.bytes().await?;

        // Content-Length may be absent or wrong
        if bytes.len() as u64 > self.max_feed_size {
            return Err(DigestError::Feed(format!(
                "feed too large: {} bytes (max {} bytes)",
                bytes.len(),
                self.max_feed_size
            )));
        }

        Ok(bytes.to_vec())
    }
}

impl FeedSource for FeedFetcher {
    async fn fetch_items(&self, url: &str) -> Vec<FeedItem> {
        let items = match self.fetch(url).await {
            Some(bytes) => match parse_feed(&bytes) {
                Ok(items) => items,
                Err(e) => {
                    warn!("Could not parse feed {}: {}", url, e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        if items.is_empty() {
            info!("Feed {} contributed 0 items", url);
        } else {
            debug!("Feed {} contributed {} item(s)", url, items.len());
        }
        items
    }
}

/// Parse feed bytes into digest items, in document order.
///
/// Entries without a title or link are skipped. The description is the
/// summary when present, otherwise the content body.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedItem>> {
    let feed = parser::parse(bytes)
        .map_err(|e| DigestError::Feed(format!("failed to parse feed: {}", e)))?;

    let items = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let title = entry
                .title
                .map(|t| normalize(&t.content))
                .unwrap_or_default();
            let link = entry
                .links
                .into_iter()
                .next()
                .map(|l| l.href.trim().to_string())
                .unwrap_or_default();

            if title.is_empty() || link.is_empty() {
                return None;
            }

            let description = entry
                .summary
                .map(|s| normalize(&s.content))
                .filter(|s| !s.is_empty())
                .or_else(|| {
                    entry
                        .content
                        .and_then(|c| c.body)
                        .map(|b| normalize(&b))
                        .filter(|b| !b.is_empty())
                })
                .unwrap_or_default();

            Some(FeedItem::new(title, link, description))
        })
        .collect();

    Ok(items)
}
