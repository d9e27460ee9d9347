use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Result, StoreError};
use crate::resource::Resource;

/// Outcome of a keyed child lookup.
#[derive(Debug)]
pub enum Lookup<C> {
    /// The child existed and is live
    Found(Arc<C>),
    /// The child was created, or revived from a tombstone
    Created(Arc<C>),
    /// The child exists but is tombstoned and creation was not requested.
    ///  It is still returned so callers can watch it.
    Deleted(Arc<C>),
}

impl<C> Lookup<C> {
    pub fn child(&self) -> &Arc<C> {
        match self {
            Lookup::Found(child) | Lookup::Created(child) | Lookup::Deleted(child) => child,
        }
    }

    pub fn into_child(self) -> Arc<C> {
        match self {
            Lookup::Found(child) | Lookup::Created(child) | Lookup::Deleted(child) => child,
        }
    }

    pub fn created(&self) -> bool {
        matches!(self, Lookup::Created(_))
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Lookup::Deleted(_))
    }
}

impl<C: Resource> Lookup<C> {
    /// The child if it is live, `StoreError::Deleted` otherwise
    pub fn into_live(self) -> Result<Arc<C>> {
        match self {
            Lookup::Found(child) | Lookup::Created(child) => Ok(child),
            Lookup::Deleted(child) => Err(StoreError::Deleted(
                child
                    .url()
                    .unwrap_or_else(|| child.node().path().to_string()),
            )),
        }
    }
}

#[derive(Debug)]
struct ContainerInner<C> {
    children: HashMap<String, Arc<C>>,
    next_auto_id: u64,
}

/// Keyed set of children with its own lock, separate from the lock of
///  the node it sits next to.
///
/// Lock order is always container first, then a child's node.
#[derive(Debug)]
pub struct Container<C> {
    inner: RwLock<ContainerInner<C>>,
}

impl<C> Default for Container<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Container<C> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ContainerInner {
                children: HashMap::new(),
                next_auto_id: 0,
            }),
        }
    }

    /// Snapshot of the current children, in no particular order
    pub fn children(&self) -> Vec<Arc<C>> {
        self.inner.read().children.values().cloned().collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.read().children.keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<Arc<C>> {
        self.inner.read().children.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().children.is_empty()
    }

    /// Register a child under a freshly minted key.
    ///
    /// Keys come from `mint(n)` for increasing `n`, skipping any key
    /// already present (such as one created by hand), so minted keys are
    /// never reused, not even for tombstoned children.
    pub fn new_child(
        &self,
        mint: impl Fn(u64) -> String,
        make: impl FnOnce(&str) -> Arc<C>,
    ) -> Arc<C> {
        let mut inner = self.inner.write();
        let key = loop {
            let candidate = mint(inner.next_auto_id);
            inner.next_auto_id += 1;
            if !inner.children.contains_key(&candidate) {
                break candidate;
            }
        };

        let child = make(&key);
        tracing::debug!(key = %key, "child minted");
        inner.children.insert(key, child.clone());
        child
    }

    /// Return the child at `key`, inserting `make(key)` if absent.
    ///  The flag reports whether it already existed.
    pub fn get_or_insert_with(
        &self,
        key: &str,
        make: impl FnOnce(&str) -> Arc<C>,
    ) -> (Arc<C>, bool) {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.children.get(key) {
            return (existing.clone(), true);
        }
        let child = make(key);
        tracing::debug!(key = %key, "child created");
        inner.children.insert(key.to_string(), child.clone());
        (child, false)
    }
}

impl<C: Resource> Container<C> {
    /// Look a child up by key, optionally creating or reviving it.
    ///
    /// | present | tombstoned | `may_create` | result |
    /// |---------|------------|--------------|--------|
    /// | no      | -          | true         | `Created` (new child) |
    /// | no      | -          | false        | `Err(NotFound)` |
    /// | yes     | no         | any          | `Found` |
    /// | yes     | yes        | true         | `Created` (tombstone cleared, version kept) |
    /// | yes     | yes        | false        | `Deleted` |
    pub fn child_by_key(
        &self,
        key: &str,
        may_create: bool,
        make: impl FnOnce(&str) -> Arc<C>,
    ) -> Result<Lookup<C>> {
        let mut inner = self.inner.write();

        let Some(existing) = inner.children.get(key).cloned() else {
            if !may_create {
                return Err(StoreError::NotFound(key.to_string()));
            }
            let child = make(key);
            tracing::debug!(key = %key, "child created on lookup");
            inner.children.insert(key.to_string(), child.clone());
            return Ok(Lookup::Created(child));
        };

        if !existing.node().is_deleted() {
            return Ok(Lookup::Found(existing));
        }
        if !may_create {
            return Ok(Lookup::Deleted(existing));
        }

        existing.node().revive();
        tracing::debug!(key = %key, "child revived");
        Ok(Lookup::Created(existing))
    }
}
