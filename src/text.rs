//! Text helpers: markup stripping, entity decoding and HTML escaping.

use std::sync::OnceLock;

use regex::Regex;

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

fn tag_regex() -> &'static Regex {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    TAG_RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"))
}

/// Normalize feed text to a single line of plain text.
///
/// Markup spans are replaced with a space, entities are decoded, and runs of
/// whitespace collapse to one space. Empty input gives an empty string.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let without_tags = tag_regex().replace_all(raw, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);

    decoded.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Escape a value placed inside a double-quoted attribute such as `href`.
pub fn escape_attribute(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

/// Truncate `text` to at most `max_chars` characters.
///
/// Truncated text keeps `max_chars - 3` characters, drops trailing whitespace
/// and ends with [`ELLIPSIS`].
pub fn truncate_line(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let head: String = text.chars().take(keep).collect();
    format!("{}{}", head.trim_end(), ELLIPSIS)
}
