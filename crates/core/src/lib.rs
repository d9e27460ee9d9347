//! In-memory hierarchical document store.
//!
//! The hierarchy is Cluster -> Pod -> Page, and every level answers the
//! same leaf contract: versioned content guarded by etags, compare-and-swap
//! writes, tombstone deletes and a long-poll "wait until changed" primitive.
//!
//! ```rust
//! use pods::prelude::*;
//!
//! let cluster = Cluster::new("http://cluster.example");
//! let (pod, _) = cluster.new_pod("http://pod1.example");
//! let page = pod.new_page();
//!
//! let first = page.set_content("text/plain", "v1", None).into_result().unwrap();
//! let second = page.set_content("text/plain", "v2", Some(&first));
//! assert!(second.matched());
//!
//! // a stale etag is reported, not applied
//! let stale = page.set_content("text/plain", "v3", Some(&first));
//! assert!(!stale.matched());
//! assert_eq!(page.content().content, "v2");
//! ```

/**
 * Cluster: the root container, owning pods keyed
 *  by absolute URL and routing URLs to them.
 */
pub mod cluster;
/**
 * Store-wide configuration, loadable from TOML.
 */
pub mod config;
/**
 * Keyed child collections shared by pods and clusters.
 */
pub mod container;
pub mod error;
/**
 * Opaque concurrency tokens.
 */
pub mod etag;
/**
 * The versioned, lockable node every page, pod
 *  and cluster is built around.
 */
pub mod node;
pub mod page;
pub mod pod;
/**
 * Dynamic property view used to build a uniform
 *  serializable map for any node.
 */
pub mod properties;
pub mod resource;

pub use cluster::Cluster;
pub use config::{Config, ConfigError};
pub use container::{Container, Lookup};
pub use error::{Result, StoreError};
pub use etag::Etag;
pub use node::{ContentSnapshot, Node, WriteOutcome};
pub use page::Page;
pub use pod::Pod;
pub use properties::{PropertyView, VirtualProperties};
pub use resource::{Resource, Target};

pub mod prelude {
    pub use crate::cluster::Cluster;
    pub use crate::config::Config;
    pub use crate::container::Lookup;
    pub use crate::error::{Result, StoreError};
    pub use crate::etag::Etag;
    pub use crate::node::{ContentSnapshot, WriteOutcome};
    pub use crate::page::Page;
    pub use crate::pod::Pod;
    pub use crate::properties::VirtualProperties;
    pub use crate::resource::{Resource, Target};
}
