//! Configuration module for the digest job.
//!
//! Settings come from an optional TOML file; credentials and the dry-run flag
//! are normally supplied through the environment and override the file.

use serde::Deserialize;
use std::path::Path;

use crate::text::ELLIPSIS;
use crate::{DigestError, Result};

/// Config file read when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "news-digest.toml";

/// Environment variable holding the Telegram bot token.
pub const ENV_BOT_TOKEN: &str = "BOT_TOKEN";

/// Environment variable holding the destination chat id.
pub const ENV_CHAT_ID: &str = "CHAT_ID";

/// Environment variable enabling dry-run mode.
pub const ENV_DRY_RUN: &str = "DRY_RUN";

/// Digest composition settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DigestConfig {
    /// Title shown in the first line of the digest.
    #[serde(default = "default_digest_title")]
    pub title: String,
    /// Maximum number of items collected per region.
    #[serde(default = "default_max_items_per_region")]
    pub max_items_per_region: usize,
    /// Character budget for a single-line item description.
    #[serde(default = "default_description_chars")]
    pub description_chars: usize,
    /// Maximum characters per delivered message chunk.
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

fn default_digest_title() -> String {
    "CT Daily News Digest".to_string()
}

fn default_max_items_per_region() -> usize {
    20
}

fn default_description_chars() -> usize {
    140
}

fn default_max_message_chars() -> usize {
    3800 // Telegram hard limit is 4096
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            title: default_digest_title(),
            max_items_per_region: default_max_items_per_region(),
            description_chars: default_description_chars(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

/// Seen-set file configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SeenConfig {
    /// Path to the newline-delimited fingerprint file.
    #[serde(default = "default_seen_path")]
    pub path: String,
    /// Maximum number of fingerprints kept on save.
    #[serde(default = "default_seen_max_entries")]
    pub max_entries: usize,
}

fn default_seen_path() -> String {
    "seen_hashes.txt".to_string()
}

fn default_seen_max_entries() -> usize {
    2000
}

impl Default for SeenConfig {
    fn default() -> Self {
        Self {
            path: default_seen_path(),
            max_entries: default_seen_max_entries(),
        }
    }
}

/// Feed fetching configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header sent with every feed request.
    #[serde(default = "default_fetch_user_agent")]
    pub user_agent: String,
    /// Accept header sent with every feed request.
    #[serde(default = "default_fetch_accept")]
    pub accept: String,
    /// Total request timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
    /// Number of attempts per feed before giving up.
    #[serde(default = "default_fetch_max_attempts")]
    pub max_attempts: u32,
    /// Backoff unit in seconds; attempt `n` waits `n * backoff_secs`.
    #[serde(default = "default_fetch_backoff")]
    pub backoff_secs: u64,
    /// Maximum number of redirects to follow.
    #[serde(default = "default_fetch_max_redirects")]
    pub max_redirects: usize,
    /// Maximum feed body size in bytes.
    #[serde(default = "default_fetch_max_feed_size")]
    pub max_feed_size: u64,
}

fn default_fetch_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
        .to_string()
}

fn default_fetch_accept() -> String {
    "application/rss+xml, application/xml;q=0.9, */*;q=0.8".to_string()
}

fn default_fetch_timeout() -> u64 {
    20
}

fn default_fetch_max_attempts() -> u32 {
    3
}

fn default_fetch_backoff() -> u64 {
    2
}

fn default_fetch_max_redirects() -> usize {
    5
}

fn default_fetch_max_feed_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_fetch_user_agent(),
            accept: default_fetch_accept(),
            timeout_secs: default_fetch_timeout(),
            max_attempts: default_fetch_max_attempts(),
            backoff_secs: default_fetch_backoff(),
            max_redirects: default_fetch_max_redirects(),
            max_feed_size: default_fetch_max_feed_size(),
        }
    }
}

/// Telegram delivery configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token (usually from `BOT_TOKEN`).
    #[serde(default)]
    pub bot_token: String,
    /// Destination chat, e.g. `@channel` or a numeric id (usually from `CHAT_ID`).
    #[serde(default)]
    pub chat_id: String,
    /// Base URL of the Bot API.
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
    /// Suppress link previews in delivered messages.
    #[serde(default = "default_disable_link_preview")]
    pub disable_link_preview: bool,
    /// Request timeout in seconds.
    #[serde(default = "default_telegram_timeout")]
    pub timeout_secs: u64,
    /// Log messages instead of posting them.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_disable_link_preview() -> bool {
    true
}

fn default_telegram_timeout() -> u64 {
    30
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_base: default_telegram_api_base(),
            disable_link_preview: default_disable_link_preview(),
            timeout_secs: default_telegram_timeout(),
            dry_run: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file; diagnostics always go to stderr as well.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// A named group of feeds rendered as one digest section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionConfig {
    /// Region name shown in the section header.
    pub name: String,
    /// Feed URLs, scanned in order.
    #[serde(default)]
    pub feeds: Vec<String>,
}

impl RegionConfig {
    /// Create a region from a name and feed URLs.
    pub fn new<S: AsRef<str>>(name: impl Into<String>, feeds: &[S]) -> Self {
        Self {
            name: name.into(),
            feeds: feeds.iter().map(|f| f.as_ref().to_string()).collect(),
        }
    }
}

fn default_regions() -> Vec<RegionConfig> {
    vec![
        RegionConfig::new(
            "Singapore",
            &[
                "https://www.channelnewsasia.com/api/v1/rss-outbound-feed?_format=xml",
                "https://www.businesstimes.com.sg/rss.xml",
                "https://sg.news.yahoo.com/rss/",
            ],
        ),
        RegionConfig::new(
            "US",
            &[
                "https://feeds.reuters.com/reuters/domesticNews",
                "https://apnews.com/rss",
                "https://feeds.npr.org/1001/rss.xml",
            ],
        ),
        RegionConfig::new(
            "Global",
            &[
                "https://feeds.reuters.com/reuters/worldNews",
                "http://feeds.bbci.co.uk/news/world/rss.xml",
                "https://www.aljazeera.com/xml/rss/all.xml",
            ],
        ),
    ]
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Digest composition settings.
    #[serde(default)]
    pub digest: DigestConfig,
    /// Seen-set file settings.
    #[serde(default)]
    pub seen: SeenConfig,
    /// Feed fetching settings.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Telegram delivery settings.
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Regions in digest order.
    #[serde(default = "default_regions")]
    pub regions: Vec<RegionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            digest: DigestConfig::default(),
            seen: SeenConfig::default(),
            fetch: FetchConfig::default(),
            telegram: TelegramConfig::default(),
            logging: LoggingConfig::default(),
            regions: default_regions(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DigestError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration for a run, then apply environment variable overrides.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_PATH`] is
    /// read when present and the built-in defaults are used otherwise.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| DigestError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `BOT_TOKEN`: Telegram bot token
    /// - `CHAT_ID`: destination chat id
    /// - `DRY_RUN`: `1` or `true` logs messages instead of posting them
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values never override.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = var(ENV_BOT_TOKEN) {
            self.telegram.bot_token = token;
        }
        if let Some(chat_id) = var(ENV_CHAT_ID) {
            self.telegram.chat_id = chat_id;
        }
        if let Some(flag) = var(ENV_DRY_RUN) {
            self.telegram.dry_run = parse_flag(&flag);
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the bot token or chat id is missing
    /// - no region is configured, or a feed URL is not http(s)
    /// - a limit or timeout that must be positive is zero
    /// - the description budget leaves no room before the ellipsis
    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() || self.telegram.chat_id.trim().is_empty() {
            return Err(DigestError::Config(format!(
                "missing {ENV_BOT_TOKEN} or {ENV_CHAT_ID} environment variables"
            )));
        }

        if self.regions.is_empty() {
            return Err(DigestError::Config("no regions configured".to_string()));
        }

        for region in &self.regions {
            if region.name.trim().is_empty() {
                return Err(DigestError::Config("region name is empty".to_string()));
            }
            for feed in &region.feeds {
                validate_feed_url(feed)?;
            }
        }

        if self.digest.description_chars <= ELLIPSIS.chars().count() {
            return Err(DigestError::Config(format!(
                "digest.description_chars must be greater than {}",
                ELLIPSIS.chars().count()
            )));
        }
        if self.digest.max_message_chars == 0 {
            return Err(DigestError::Config(
                "digest.max_message_chars must be positive".to_string(),
            ));
        }
        if self.seen.max_entries == 0 {
            return Err(DigestError::Config(
                "seen.max_entries must be positive".to_string(),
            ));
        }
        if self.fetch.max_attempts == 0 {
            return Err(DigestError::Config(
                "fetch.max_attempts must be positive".to_string(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(DigestError::Config(
                "fetch.timeout_secs must be positive".to_string(),
            ));
        }
        if self.fetch.max_feed_size == 0 {
            return Err(DigestError::Config(
                "fetch.max_feed_size must be positive".to_string(),
            ));
        }
        if self.telegram.timeout_secs == 0 {
            return Err(DigestError::Config(
                "telegram.timeout_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Check that a feed URL parses and uses http or https.
fn validate_feed_url(feed: &str) -> Result<()> {
    let parsed = url::Url::parse(feed)
        .map_err(|e| DigestError::Config(format!("invalid feed URL {feed}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(DigestError::Config(format!(
            "unsupported URL scheme in {feed}: {scheme}"
        ))),
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
