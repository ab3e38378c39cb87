//! Error types for the digest job.

use thiserror::Error;

/// Common error type for the digest job.
#[derive(Error, Debug)]
pub enum DigestError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error (missing credentials, bad feed URL, parse failure).
    #[error("configuration error: {0}")]
    Config(String),

    /// Feed fetch or parse error.
    ///
    /// These are recovered inside the fetcher and only surface when building
    /// the HTTP client fails.
    #[error("feed error: {0}")]
    Feed(String),

    /// Delivery rejected by the messaging API.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for digest operations.
pub type Result<T> = std::result::Result<T, DigestError>;
