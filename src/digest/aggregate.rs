//! Region aggregation.

use tracing::{debug, warn};

use crate::rss::{FeedItem, FeedSource};
use crate::seen::SeenSet;

/// Collect up to `cap` unseen items for one region.
///
/// Feeds are scanned in order and entries in document order. Items whose
/// fingerprint is in `seen` are skipped; items gathered earlier in the same
/// call are not compared against each other. Scanning stops as soon as the
/// cap is reached, so later feeds are not fetched.
pub async fn collect_region<S: FeedSource>(
    source: &S,
    region: &str,
    feeds: &[String],
    cap: usize,
    seen: &SeenSet,
) -> Vec<FeedItem> {
    let mut items = Vec::with_capacity(cap);

    if cap == 0 {
        return items;
    }

    'feeds: for url in feeds {
        for item in source.fetch_items(url).await {
            if seen.contains(&item.fingerprint) {
                debug!("Skipping seen item {} ({})", item.fingerprint, item.title);
                continue;
            }

            items.push(item);
            if items.len() >= cap {
                break 'feeds;
            }
        }
    }

    if items.is_empty() {
        warn!(
            "Region {} collected 0 items (feeds may be unavailable)",
            region
        );
    } else {
        debug!("Region {} collected {} item(s)", region, items.len());
    }

    items
}
