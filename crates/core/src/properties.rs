//! Property view
//!
//! Every node can be read as a flat map of properties, built from four
//! layers in precedence order:
//!
//! 1. reserved system keys: `_id` (absolute URL), `_etag`, `_owner`
//!    (owning container's URL)
//! 2. content keys: `_contentType` and `_content`, hidden for data-only
//!    nodes
//! 3. virtual properties contributed by the resource kind (pods list their
//!    pages, clusters their pods)
//! 4. the application property bag
//!
//! Keys starting with `_` or `@` belong to the store. Application code
//! can only write them where a layer explicitly accepts the write.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Result, StoreError};
use crate::node::NodeState;
use crate::resource::Resource;

pub const ID: &str = "_id";
pub const ETAG: &str = "_etag";
pub const OWNER: &str = "_owner";
pub const CONTENT_TYPE: &str = "_contentType";
pub const CONTENT: &str = "_content";

const RESERVED_PREFIXES: [char; 2] = ['_', '@'];

pub fn is_reserved(key: &str) -> bool {
    key.starts_with(RESERVED_PREFIXES)
}

/// Synthetic properties a resource kind adds to its view.
///
/// Implementations must not lock the node they belong to: the view
/// already holds that node's shared lock when it calls in.
pub trait VirtualProperties {
    fn virtual_keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn virtual_get(&self, _key: &str) -> Option<Value> {
        None
    }

    /// First refusal on writes. `None` passes the key on to the next
    ///  layer; `Some` claims it with the given result.
    fn virtual_set(&self, _key: &str, _value: &Value) -> Option<Result<()>> {
        None
    }
}

/// Read/write view over a resource's properties.
pub struct PropertyView<'a, R: ?Sized> {
    resource: &'a R,
}

impl<'a, R: Resource + ?Sized> PropertyView<'a, R> {
    pub fn new(resource: &'a R) -> Self {
        Self { resource }
    }

    /// Every key that currently resolves, without duplicates
    pub fn keys(&self) -> Vec<String> {
        let state = self.resource.node().read_state();
        self.keys_locked(&state)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let state = self.resource.node().read_state();
        self.get_locked(&state, key)
    }

    /// Write a property.
    ///
    /// `_contentType` and `_content` take string values and count as a
    /// content write: the version is bumped and waiters woken. Other
    /// reserved keys are refused with `StoreError::RejectedProperty`.
    /// Anything else lands in the application bag without a version bump.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if let Some(result) = self.resource.virtual_set(key, &value) {
            return result;
        }

        let node = self.resource.node();
        match key {
            CONTENT_TYPE | CONTENT => {
                let Value::String(text) = value else {
                    return Err(StoreError::InvalidPropertyValue {
                        key: key.to_string(),
                        expected: "string",
                    });
                };
                let etag = node.mutate_content(|state| {
                    if key == CONTENT {
                        state.content = text;
                    } else {
                        state.content_type = text;
                    }
                    state.deleted = false;
                });
                tracing::debug!(path = %node.path(), key, etag = %etag, "content property set");
                Ok(())
            }
            _ if key.is_empty() || is_reserved(key) => {
                tracing::warn!(path = %node.path(), key, "reserved property rejected");
                Err(StoreError::RejectedProperty(key.to_string()))
            }
            _ => {
                node.with_state_mut(|state| state.properties.insert(key.to_string(), value));
                tracing::trace!(path = %node.path(), key, "property set");
                Ok(())
            }
        }
    }

    /// Remove an application property, returning its old value
    pub fn remove(&self, key: &str) -> Result<Option<Value>> {
        if is_reserved(key) {
            return Err(StoreError::RejectedProperty(key.to_string()));
        }
        Ok(self
            .resource
            .node()
            .with_state_mut(|state| state.properties.remove(key)))
    }

    /// All properties as one map, read under a single shared lock
    pub fn to_map(&self) -> Map<String, Value> {
        let state = self.resource.node().read_state();
        self.keys_locked(&state)
            .into_iter()
            .filter_map(|key| {
                let value = self.get_locked(&state, &key)?;
                Some((key, value))
            })
            .collect()
    }

    fn keys_locked(&self, state: &NodeState) -> Vec<String> {
        let virtual_keys = self.resource.virtual_keys();
        let mut keys = Vec::with_capacity(5 + virtual_keys.len() + state.properties.len());

        if self.resource.url().is_some() {
            keys.push(ID.to_string());
        }
        keys.push(ETAG.to_string());
        if self.resource.owner_url().is_some() {
            keys.push(OWNER.to_string());
        }
        if !self.resource.node().is_data_only() {
            keys.push(CONTENT_TYPE.to_string());
            keys.push(CONTENT.to_string());
        }
        for key in virtual_keys.into_iter().chain(state.properties.keys().cloned()) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    fn get_locked(&self, state: &NodeState, key: &str) -> Option<Value> {
        let data_only = self.resource.node().is_data_only();
        match key {
            ID => self.resource.url().map(Value::String),
            ETAG => Some(Value::String(state.etag().to_string())),
            OWNER => self.resource.owner_url().map(Value::String),
            CONTENT_TYPE if !data_only => Some(Value::String(state.content_type.clone())),
            CONTENT if !data_only => Some(Value::String(state.content.clone())),
            _ => self
                .resource
                .virtual_get(key)
                .or_else(|| state.properties.get(key).cloned()),
        }
    }
}

impl<R: Resource + ?Sized> Serialize for PropertyView<'_, R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}
