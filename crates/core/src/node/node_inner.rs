use std::time::Duration;

use parking_lot::{RwLock, RwLockReadGuard};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::Result;
use crate::etag::Etag;

use super::outcome::{ContentSnapshot, WriteOutcome};
use super::waiters::{Registration, WaiterSet};

/// Everything guarded by a node's lock.
#[derive(Debug, Default)]
pub(crate) struct NodeState {
    pub content_type: String,
    pub content: String,
    pub version: u64,
    pub deleted: bool,
    pub properties: Map<String, Value>,
}

impl NodeState {
    pub fn etag(&self) -> Etag {
        Etag::from_version(self.version)
    }
}

/// The shared building block of pages, pods and clusters.
///
/// A node owns its content, a version counter that doubles as its etag,
/// a tombstone flag, an application property bag and the set of callers
/// waiting for it to change. All state sits behind one reader/writer
/// lock; nodes never share locks, so unrelated nodes never contend.
#[derive(Debug)]
pub struct Node {
    path: String,
    data_only: bool,
    state: RwLock<NodeState>,
    waiters: WaiterSet,
}

enum Watch<'a> {
    Changed(Etag),
    Pending(Registration<'a>),
}

impl Node {
    pub(crate) fn new(path: impl Into<String>, data_only: bool, config: &Config) -> Self {
        Self {
            path: path.into(),
            data_only,
            state: RwLock::new(NodeState::default()),
            waiters: WaiterSet::new(config.waiter_limit()),
        }
    }

    /// Path relative to the owning container, empty for a container's
    ///  own node
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Data-only nodes hide `_contentType` and `_content` from their
    ///  property view
    pub fn is_data_only(&self) -> bool {
        self.data_only
    }

    pub fn content(&self) -> ContentSnapshot {
        let state = self.state.read();
        tracing::trace!(path = %self.path, version = state.version, "content read");
        ContentSnapshot {
            content_type: state.content_type.clone(),
            content: state.content.clone(),
            etag: state.etag(),
        }
    }

    pub fn etag(&self) -> Etag {
        self.state.read().etag()
    }

    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    pub fn is_deleted(&self) -> bool {
        self.state.read().deleted
    }

    /// Number of callers currently parked in a wait on this node
    pub fn pending_waiters(&self) -> usize {
        self.waiters.len()
    }

    /// Compare-and-swap write.
    ///
    /// With `if_match` of `None` (or an empty etag) the write is
    /// unconditional. Otherwise it only applies when `if_match` is the
    /// current etag. A successful write clears any tombstone, bumps the
    /// version once and wakes every waiter.
    pub fn set_content(
        &self,
        content_type: impl Into<String>,
        content: impl Into<String>,
        if_match: Option<&Etag>,
    ) -> WriteOutcome {
        let mut state = self.state.write();
        let current = state.etag();

        if let Some(expected) = if_match.filter(|etag| !etag.is_empty()) {
            if *expected != current {
                tracing::warn!(
                    path = %self.path,
                    expected = %expected,
                    current = %current,
                    "conditional write rejected"
                );
                return WriteOutcome::Conflict {
                    expected: expected.clone(),
                    current,
                };
            }
        }

        state.content_type = content_type.into();
        state.content = content.into();
        state.deleted = false;
        let etag = self.touched(&mut state);
        tracing::debug!(path = %self.path, etag = %etag, "content written");
        WriteOutcome::Written(etag)
    }

    /// Tombstone the node. Deleting twice is still a state transition and
    ///  bumps the version again.
    pub fn delete(&self) -> Etag {
        let mut state = self.state.write();
        state.deleted = true;
        state.content_type.clear();
        state.content.clear();
        let etag = self.touched(&mut state);
        tracing::debug!(path = %self.path, etag = %etag, "node deleted");
        etag
    }

    /// Wait until the node's etag differs from `etag`.
    ///
    /// Returns immediately when it already does. Otherwise parks until
    /// the next write or delete and returns the etag that write produced.
    /// There is no built-in deadline; dropping the returned future
    /// abandons the wait and deregisters it.
    pub async fn wait_for_change(&self, etag: &Etag) -> Result<Etag> {
        let registration = match self.watch(etag)? {
            Watch::Changed(current) => return Ok(current),
            Watch::Pending(registration) => registration,
        };
        Ok(match registration.signaled().await {
            Some(changed) => changed,
            None => self.etag(),
        })
    }

    /// Like [`Node::wait_for_change`] with a deadline. `Ok(None)` means the
    ///  deadline passed with no change.
    pub async fn wait_for_change_timeout(
        &self,
        etag: &Etag,
        timeout: Duration,
    ) -> Result<Option<Etag>> {
        match tokio::time::timeout(timeout, self.wait_for_change(etag)).await {
            Ok(result) => result.map(Some),
            Err(_) => {
                tracing::trace!(path = %self.path, etag = %etag, "wait timed out");
                Ok(None)
            }
        }
    }

    /// Thread-blocking form of [`Node::wait_for_change`] for callers outside
    ///  an async runtime. Panics if called from within one.
    pub fn blocking_wait_for_change(&self, etag: &Etag) -> Result<Etag> {
        let registration = match self.watch(etag)? {
            Watch::Changed(current) => return Ok(current),
            Watch::Pending(registration) => registration,
        };
        Ok(match registration.blocking_signaled() {
            Some(changed) => changed,
            None => self.etag(),
        })
    }

    // registers under the shared lock, which is released on return and
    //  before the caller suspends
    fn watch(&self, etag: &Etag) -> Result<Watch<'_>> {
        let state = self.state.read();
        let current = state.etag();
        if current != *etag {
            return Ok(Watch::Changed(current));
        }

        let registration = self.waiters.register().map_err(|e| {
            tracing::warn!(path = %self.path, error = %e, "wait refused");
            e
        })?;
        tracing::debug!(path = %self.path, etag = %etag, "waiter registered");
        Ok(Watch::Pending(registration))
    }

    /// Clear the tombstone without a version bump; the caller is expected
    ///  to write content next. Returns whether the node was deleted.
    pub(crate) fn revive(&self) -> bool {
        let mut state = self.state.write();
        let was_deleted = state.deleted;
        state.deleted = false;
        was_deleted
    }

    /// Apply a content mutation under the exclusive lock, then bump the
    ///  version and wake waiters before the lock is released
    pub(crate) fn mutate_content(&self, f: impl FnOnce(&mut NodeState)) -> Etag {
        let mut state = self.state.write();
        f(&mut state);
        self.touched(&mut state)
    }

    /// Mutate non-content state (the property bag); no version bump
    pub(crate) fn with_state_mut<R>(&self, f: impl FnOnce(&mut NodeState) -> R) -> R {
        f(&mut self.state.write())
    }

    pub(crate) fn read_state(&self) -> RwLockReadGuard<'_, NodeState> {
        self.state.read()
    }

    // caller holds the write lock
    fn touched(&self, state: &mut NodeState) -> Etag {
        state.version += 1;
        let etag = state.etag();
        let released = self.waiters.release(&etag);
        if released > 0 {
            tracing::trace!(path = %self.path, released, "waiters released");
        }
        etag
    }
}
