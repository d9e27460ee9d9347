//! Error types for store operations.

use crate::etag::Etag;

/// Errors surfaced by node, container and property operations.
///
/// None of these are fatal: every variant describes a condition the
/// caller can recover from by re-reading, retrying or fixing its input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A conditional write carried an etag that is no longer current
    #[error("etag mismatch: expected {expected}, current is {current}")]
    ConcurrencyConflict { expected: Etag, current: Etag },

    /// Lookup without creation on a key that was never created
    #[error("not found: {0}")]
    NotFound(String),

    /// Lookup hit a tombstoned child and the caller asked for a live one
    #[error("deleted: {0}")]
    Deleted(String),

    /// The URL is not under any known pod, or its path is not rooted
    #[error("malformed address {url}: {reason}")]
    MalformedAddress { url: String, reason: &'static str },

    /// Reserved or read-only property written through the generic setter
    #[error("property {0} is reserved and cannot be set")]
    RejectedProperty(String),

    /// A content property was given a value of the wrong shape
    #[error("property {key} expects a {expected} value")]
    InvalidPropertyValue { key: String, expected: &'static str },

    /// The node already holds as many pending waiters as allowed
    #[error("too many pending waiters (limit {limit})")]
    TooManyWaiters { limit: usize },
}

impl StoreError {
    pub(crate) fn malformed(url: &str, reason: &'static str) -> Self {
        StoreError::MalformedAddress {
            url: url.to_string(),
            reason,
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
