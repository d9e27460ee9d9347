//! Versioned, lockable nodes
//!
//! - **[`Node`]**: content, version/etag, tombstone, property bag and waiters
//! - **[`ContentSnapshot`]**: a consistent `(content_type, content, etag)` read
//! - **[`WriteOutcome`]**: result of a compare-and-swap write
//!
//! # Concurrency
//!
//! ```text
//!   content() / etag() ---------- shared lock
//!   set_content() / delete() ---- exclusive lock: mutate, bump version,
//!                                 release waiters, unlock
//!   wait_for_change(etag) ------- shared lock: compare, register waiter,
//!                                 unlock, then suspend
//! ```
//!
//! Because registration happens under the shared lock and release under
//! the exclusive lock, a write can never land between a waiter's etag
//! check and its registration, so no wake-up is lost.

mod node_inner;
mod outcome;
mod waiters;

pub use node_inner::Node;
pub(crate) use node_inner::NodeState;
pub use outcome::{ContentSnapshot, WriteOutcome};
