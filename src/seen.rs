//! Seen-set persistence.
//!
//! Fingerprints of items already delivered are kept in a flat text file,
//! one per line:
//! ```text
//! 3f1c0a9be27d4c55a1e0b2f9
//! 9a0d77c31b2e48f6c0d5e1a4
//! ```
//! The file is read once at start-up and rewritten once after delivery.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::Result;

/// Insertion-ordered set of item fingerprints.
///
/// Order follows the file on load, with new fingerprints appended, so
/// truncation on save drops the oldest entries first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    entries: IndexSet<String>,
}

impl SeenSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a fingerprint has been seen.
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.entries.contains(fingerprint)
    }

    /// Record a fingerprint. Returns `false` if it was already present.
    pub fn insert(&mut self, fingerprint: impl Into<String>) -> bool {
        self.entries.insert(fingerprint.into())
    }

    /// Number of fingerprints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate fingerprints from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// File-backed store for the seen-set.
#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
    max_entries: usize,
}

impl SeenStore {
    /// Create a store for the given file, keeping at most `max_entries`.
    pub fn new(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            path: path.into(),
            max_entries,
        }
    }

    /// Get the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the seen-set.
    ///
    /// A missing file yields an empty set. Blank lines are ignored and
    /// surrounding whitespace is trimmed.
    pub fn load(&self) -> Result<SeenSet> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SeenSet::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect())
    }

    /// Save the seen-set, keeping only the newest `max_entries` fingerprints.
    ///
    /// The file is overwritten; an empty set produces an empty file.
    pub fn save(&self, seen: &SeenSet) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let skip = seen.len().saturating_sub(self.max_entries);
        let mut content = String::with_capacity((seen.len() - skip) * 25);
        for fingerprint in seen.iter().skip(skip) {
            content.push_str(fingerprint);
            content.push('\n');
        }

        fs::write(&self.path, content)?;
        Ok(())
    }
}
