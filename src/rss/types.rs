//! Feed item types.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the SHA-256 digest.
pub const FINGERPRINT_LENGTH: usize = 24;

/// Compute the deduplication fingerprint of an item.
///
/// SHA-256 over `"{title}|{link}"`, truncated to [`FINGERPRINT_LENGTH`]
/// lowercase hex characters. Pass the normalized title.
pub fn fingerprint(title: &str, link: &str) -> String {
    let digest = Sha256::digest(format!("{title}|{link}").as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(FINGERPRINT_LENGTH);
    hex
}

/// A parsed feed entry ready for the digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Normalized title.
    pub title: String,
    /// Item link.
    pub link: String,
    /// Normalized description, possibly empty.
    pub description: String,
    /// Deduplication key derived from title and link.
    pub fingerprint: String,
}

impl FeedItem {
    /// Create an item, computing its fingerprint.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let link = link.into();
        let fingerprint = fingerprint(&title, &link);
        Self {
            title,
            link,
            description: description.into(),
            fingerprint,
        }
    }

    /// Check whether the item carries a description.
    pub fn has_description(&self) -> bool {
        !self.description.is_empty()
    }
}
