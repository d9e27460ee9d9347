use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::{Result, StoreError};
use crate::etag::Etag;

/// Bounded set of single-use change signals.
///
/// Registration must happen while the owning node's shared lock is held
/// and release while its exclusive lock is held; that pairing is what
/// keeps a writer from slipping between "etag still matches" and "waiter
/// registered".
#[derive(Debug)]
pub(crate) struct WaiterSet {
    limit: Option<usize>,
    inner: Mutex<WaiterSetInner>,
}

#[derive(Debug, Default)]
struct WaiterSetInner {
    next_id: u64,
    pending: HashMap<u64, oneshot::Sender<Etag>>,
}

impl WaiterSet {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            inner: Mutex::new(WaiterSetInner::default()),
        }
    }

    pub fn register(&self) -> Result<Registration<'_>> {
        let mut inner = self.inner.lock();
        if let Some(limit) = self.limit {
            if inner.pending.len() >= limit {
                return Err(StoreError::TooManyWaiters { limit });
            }
        }

        let id = inner.next_id;
        inner.next_id += 1;
        let (tx, rx) = oneshot::channel();
        inner.pending.insert(id, tx);

        Ok(Registration { id, rx, set: self })
    }

    /// Fire every pending signal with the new etag, returns how many fired
    pub fn release(&self, etag: &Etag) -> usize {
        let drained: Vec<_> = self.inner.lock().pending.drain().collect();
        let released = drained.len();
        for (_, tx) in drained {
            // receiver may already be gone if its wait was abandoned mid-release
            let _ = tx.send(etag.clone());
        }
        released
    }

    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    fn deregister(&self, id: u64) {
        self.inner.lock().pending.remove(&id);
    }
}

/// A pending wait. Dropping it, whether after the signal or because the
/// caller gave up, removes it from the set.
pub(crate) struct Registration<'a> {
    id: u64,
    rx: oneshot::Receiver<Etag>,
    set: &'a WaiterSet,
}

impl Registration<'_> {
    /// Resolves with the releasing etag, `None` if the sender vanished
    pub async fn signaled(mut self) -> Option<Etag> {
        (&mut self.rx).await.ok()
    }

    /// Blocks the current thread. Must not be called from async context.
    pub fn blocking_signaled(mut self) -> Option<Etag> {
        let rx = std::mem::replace(&mut self.rx, oneshot::channel().1);
        rx.blocking_recv().ok()
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.set.deregister(self.id);
    }
}
