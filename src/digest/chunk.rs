//! Message chunking.

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Each cut is made at the last newline before the limit, or exactly at the
/// limit when the range holds no newline. Chunks are trimmed and never empty.
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut parts = Vec::new();
    let mut rest = text.trim();

    // `limit` is the byte offset of the first character past the budget.
    while let Some((limit, _)) = rest.char_indices().nth(max_chars) {
        let cut = match rest[..limit].rfind('\n') {
            Some(newline) if newline > 0 => newline,
            _ => limit,
        };

        let head = rest[..cut].trim();
        if !head.is_empty() {
            parts.push(head.to_string());
        }
        rest = rest[cut..].trim();
    }

    if !rest.is_empty() {
        parts.push(rest.to_string());
    }

    parts
}
