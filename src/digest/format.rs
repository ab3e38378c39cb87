//! Digest formatting for Telegram's HTML parse mode.

use chrono::NaiveDate;

use crate::rss::FeedItem;
use crate::text::{escape_attribute, escape_html, normalize, truncate_line};

/// Separator placed between region blocks.
pub const DIVIDER: &str = "\n\n──────────\n\n";

/// Render one region as a text block.
///
/// The header reports the number of items actually included. Each item is a
/// numbered link; a non-empty description follows on an indented line,
/// truncated to `description_chars` characters.
pub fn format_region(region: &str, items: &[FeedItem], description_chars: usize) -> String {
    let mut lines = Vec::with_capacity(items.len() + 1);
    lines.push(format!(
        "🗞️ <b>{}</b>  <i>(Top {})</i>",
        escape_html(region),
        items.len()
    ));

    for (i, item) in items.iter().enumerate() {
        let entry = format!(
            "{}. <a href=\"{}\">{}</a>",
            i + 1,
            escape_attribute(&item.link),
            escape_html(&item.title)
        );

        let description = normalize(&item.description);
        if description.is_empty() {
            lines.push(entry);
        } else {
            let description = truncate_line(&description, description_chars);
            lines.push(format!("{}\n   {}", entry, escape_html(&description)));
        }
    }

    lines.join("\n")
}

/// Assemble the full digest from rendered region blocks.
pub fn compose_digest(title: &str, date: NaiveDate, blocks: &[String]) -> String {
    format!(
        "<b>{}</b>\n<i>{} (UTC)</i>\n\n{}",
        escape_html(title),
        date.format("%Y-%m-%d"),
        blocks.join(DIVIDER)
    )
}
