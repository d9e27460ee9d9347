use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::etag::Etag;

/// Consistent read of a node's content triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSnapshot {
    pub content_type: String,
    pub content: String,
    pub etag: Etag,
}

/// Result of a conditional write.
///
/// A conflict is an expected outcome of optimistic concurrency rather
/// than a failure, so it is reported as a value. Use
/// [`WriteOutcome::into_result`] to turn it into a [`StoreError`].
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write was applied; carries the new etag
    Written(Etag),
    /// `if_match` was stale; nothing changed
    Conflict { expected: Etag, current: Etag },
}

impl WriteOutcome {
    pub fn matched(&self) -> bool {
        matches!(self, WriteOutcome::Written(_))
    }

    /// The etag after the call: the new one on success, the current one
    ///  on conflict
    pub fn etag(&self) -> &Etag {
        match self {
            WriteOutcome::Written(etag) => etag,
            WriteOutcome::Conflict { current, .. } => current,
        }
    }

    pub fn into_result(self) -> Result<Etag> {
        match self {
            WriteOutcome::Written(etag) => Ok(etag),
            WriteOutcome::Conflict { expected, current } => {
                Err(StoreError::ConcurrencyConflict { expected, current })
            }
        }
    }
}
