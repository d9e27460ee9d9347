use std::ops::Deref;
use std::sync::{Arc, Weak};

use crate::config::Config;
use crate::node::Node;
use crate::pod::Pod;
use crate::properties::VirtualProperties;
use crate::resource::Resource;

/// A leaf document inside a pod.
///
/// The page keeps a weak back-reference to its pod, used only to compute
/// its URL and owner; the pod owns the page, never the other way round.
/// Dereferences to its [`Node`] for the content and watch contract.
#[derive(Debug)]
pub struct Page {
    node: Node,
    pod: Weak<Pod>,
}

impl Page {
    pub(crate) fn new(path: &str, data_only: bool, pod: Weak<Pod>, config: &Config) -> Self {
        Self {
            node: Node::new(path, data_only, config),
            pod,
        }
    }

    /// Path within the pod, always starting with `/`
    pub fn path(&self) -> &str {
        self.node.path()
    }

    pub fn pod(&self) -> Option<Arc<Pod>> {
        self.pod.upgrade()
    }
}

impl Deref for Page {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}

impl VirtualProperties for Page {}

impl Resource for Page {
    fn node(&self) -> &Node {
        &self.node
    }

    fn url(&self) -> Option<String> {
        self.pod
            .upgrade()
            .map(|pod| format!("{}{}", pod.url(), self.path()))
    }

    fn owner_url(&self) -> Option<String> {
        self.pod.upgrade().map(|pod| pod.url().to_string())
    }
}
