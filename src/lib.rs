//! news-digest - a daily regional news digest for Telegram.
//!
//! Fetches RSS/Atom feeds per region, drops items already posted on earlier
//! runs, and posts an HTML-formatted digest through the Telegram Bot API.

pub mod config;
pub mod digest;
pub mod error;
pub mod logging;
pub mod rss;
pub mod seen;
pub mod telegram;
pub mod text;

pub use config::{Config, RegionConfig};
pub use digest::{run_digest, RunSummary};
pub use error::{DigestError, Result};
pub use rss::{FeedFetcher, FeedItem, FeedSource};
pub use seen::{SeenSet, SeenStore};
pub use telegram::{Delivery, TelegramClient};
