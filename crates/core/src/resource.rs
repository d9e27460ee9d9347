use std::ops::Deref;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::cluster::Cluster;
use crate::container::Lookup;
use crate::node::Node;
use crate::page::Page;
use crate::pod::Pod;
use crate::properties::{PropertyView, VirtualProperties};

/// Anything addressable in the hierarchy.
///
/// Pages, pods and clusters all own a [`Node`] by composition and answer
/// the same leaf contract through it; they differ in how they compute
/// their address and in the virtual properties they contribute.
pub trait Resource: VirtualProperties + Send + Sync {
    fn node(&self) -> &Node;

    /// Absolute URL, `None` when the owner needed to compute it is gone
    fn url(&self) -> Option<String>;

    /// URL of the owning container, `None` for a root
    fn owner_url(&self) -> Option<String>;

    fn properties(&self) -> PropertyView<'_, Self>
    where
        Self: Sized,
    {
        PropertyView::new(self)
    }
}

/// What a URL resolved to.
#[derive(Debug)]
pub enum Target {
    Cluster(Arc<Cluster>),
    Pod(Arc<Pod>),
    Page(Lookup<Page>),
}

impl Target {
    pub fn as_resource(&self) -> &(dyn Resource + 'static) {
        match self {
            Target::Cluster(cluster) => &**cluster,
            Target::Pod(pod) => &**pod,
            Target::Page(lookup) => &**lookup.child(),
        }
    }

    pub fn properties(&self) -> PropertyView<'_, dyn Resource> {
        PropertyView::new(self.as_resource())
    }

    pub fn url(&self) -> Option<String> {
        self.as_resource().url()
    }

    pub fn to_map(&self) -> Map<String, Value> {
        self.properties().to_map()
    }

    /// Whether resolving created (or revived) a page
    pub fn created(&self) -> bool {
        matches!(self, Target::Page(lookup) if lookup.created())
    }

    pub fn into_page(self) -> Option<Lookup<Page>> {
        match self {
            Target::Page(lookup) => Some(lookup),
            _ => None,
        }
    }
}

impl Deref for Target {
    type Target = Node;

    fn deref(&self) -> &Node {
        self.as_resource().node()
    }
}
