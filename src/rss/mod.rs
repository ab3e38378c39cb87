//! Feed retrieval module.
//!
//! This module fetches RSS/Atom feeds and turns their entries into digest items.

pub mod fetcher;
pub mod types;

pub use fetcher::{parse_feed, FeedFetcher, FeedSource};
pub use types::{fingerprint, FeedItem, FINGERPRINT_LENGTH};
