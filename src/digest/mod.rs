//! Digest pipeline.
//!
//! Loads the seen-set, collects unseen items per region, renders and chunks
//! the digest, delivers every chunk in order, and only then persists the
//! updated seen-set. A delivery failure aborts the run before the save, so
//! undelivered items are offered again next time.

pub mod aggregate;
pub mod chunk;
pub mod format;

use chrono::NaiveDate;
use tracing::info;

pub use aggregate::collect_region;
pub use chunk::chunk_message;
pub use format::{compose_digest, format_region, DIVIDER};

use crate::config::Config;
use crate::rss::FeedSource;
use crate::seen::SeenStore;
use crate::telegram::Delivery;
use crate::Result;

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Item count per region, in digest order.
    pub region_counts: Vec<(String, usize)>,
    /// Number of chunks delivered.
    pub chunks_sent: usize,
    /// Number of fingerprints held after the run (before truncation on save).
    pub seen_total: usize,
}

impl RunSummary {
    /// Total number of items in the digest.
    pub fn total_items(&self) -> usize {
        self.region_counts.iter().map(|(_, count)| count).sum()
    }
}

/// Run the digest once.
///
/// Regions are processed sequentially in configured order. Fingerprints of
/// a region's items are added to the seen-set before the next region is
/// collected, so a story already listed is not repeated further down.
pub async fn run_digest<S: FeedSource>(
    config: &Config,
    source: &S,
    delivery: &Delivery,
    today: NaiveDate,
) -> Result<RunSummary> {
    let store = SeenStore::new(&config.seen.path, config.seen.max_entries);
    let mut seen = store.load()?;
    info!(
        "Loaded {} seen fingerprint(s) from {}",
        seen.len(),
        store.path().display()
    );

    let mut blocks = Vec::with_capacity(config.regions.len());
    let mut region_counts = Vec::with_capacity(config.regions.len());

    for region in &config.regions {
        let items = collect_region(
            source,
            &region.name,
            &region.feeds,
            config.digest.max_items_per_region,
            &seen,
        )
        .await;

        for item in &items {
            seen.insert(item.fingerprint.clone());
        }

        info!("Region {}: {} item(s)", region.name, items.len());
        blocks.push(format_region(
            &region.name,
            &items,
            config.digest.description_chars,
        ));
        region_counts.push((region.name.clone(), items.len()));
    }

    let digest = compose_digest(&config.digest.title, today, &blocks);
    let chunks = chunk_message(&digest, config.digest.max_message_chars);
    info!(
        "Digest is {} chars in {} chunk(s)",
        digest.chars().count(),
        chunks.len()
    );

    for (i, chunk) in chunks.iter().enumerate() {
        delivery.send(chunk).await?;
        info!("Sent chunk {}/{}", i + 1, chunks.len());
    }

    store.save(&seen)?;
    info!("Saved seen-set to {}", store.path().display());

    Ok(RunSummary {
        region_counts,
        chunks_sent: chunks.len(),
        seen_total: seen.len(),
    })
}
