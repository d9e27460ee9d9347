use std::ops::Deref;
use std::sync::{Arc, Weak};

use serde_json::Value;

use crate::config::{Config, ConfigError};
use crate::container::{Container, Lookup};
use crate::error::{Result, StoreError};
use crate::node::Node;
use crate::page::Page;
use crate::pod::Pod;
use crate::properties::VirtualProperties;
use crate::resource::{Resource, Target};

pub const PODS: &str = "_pods";
pub const POD_COUNT: &str = "_podCount";

/// The root of the hierarchy: a set of pods keyed by absolute URL.
///
/// The cluster URL names the cluster itself and need not be related to
/// its pods' URLs. Address resolution for the whole store starts here.
#[derive(Debug)]
pub struct Cluster {
    node: Node,
    url: String,
    pods: Container<Pod>,
    config: Arc<Config>,
    this: Weak<Cluster>,
}

impl Cluster {
    pub fn new(url: &str) -> Arc<Self> {
        Self::build(url, Config::default())
    }

    /// Create a cluster whose pods and pages share `config`. Refuses a
    ///  config that would mint unreachable page paths.
    pub fn with_config(
        url: &str,
        config: Config,
    ) -> std::result::Result<Arc<Self>, ConfigError> {
        config.validate()?;
        Ok(Self::build(url, config))
    }

    fn build(url: &str, config: Config) -> Arc<Self> {
        let config = Arc::new(config);
        tracing::debug!(url, "cluster created");
        Arc::new_cyclic(|this| Self {
            node: Node::new("", false, &config),
            url: trim_url(url).to_string(),
            pods: Container::new(),
            config,
            this: this.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot of every pod, in no particular order
    pub fn pods(&self) -> Vec<Arc<Pod>> {
        self.pods.children()
    }

    /// Register a pod at `url`, or return the one already there.
    ///  The flag is true when the pod already existed.
    pub fn new_pod(&self, url: &str) -> (Arc<Pod>, bool) {
        let url = trim_url(url);
        self.pods.get_or_insert_with(url, |url| {
            tracing::debug!(url, cluster = %self.url, "pod created");
            Pod::new(url, self.this.clone(), self.config.clone())
        })
    }

    /// Exact lookup by pod URL
    pub fn pod_by_url(&self, url: &str) -> Option<Arc<Pod>> {
        self.pods.get(trim_url(url))
    }

    /// The pod whose URL prefixes `url` at a path boundary. If pod URLs
    ///  nest, the longest match wins.
    pub fn owning_pod(&self, url: &str) -> Option<Arc<Pod>> {
        self.pods
            .children()
            .into_iter()
            .filter(|pod| {
                url.strip_prefix(pod.url())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            })
            .max_by_key(|pod| pod.url().len())
    }

    /// Resolve an absolute URL to a page of whichever pod owns it
    pub fn page_by_url(&self, url: &str, may_create: bool) -> Result<Lookup<Page>> {
        let pod = self
            .owning_pod(url)
            .ok_or_else(|| StoreError::malformed(url, "no pod owns this address"))?;
        pod.page_by_url(url, may_create)
    }

    /// Resolve any URL in the hierarchy: the cluster itself, a pod, or a
    ///  page (created on demand when `may_create` is set)
    pub fn resolve(self: &Arc<Self>, url: &str, may_create: bool) -> Result<Target> {
        let trimmed = trim_url(url);
        if trimmed == self.url {
            return Ok(Target::Cluster(self.clone()));
        }
        if let Some(pod) = self.pod_by_url(trimmed) {
            return Ok(Target::Pod(pod));
        }
        self.page_by_url(url, may_create).map(Target::Page)
    }

    fn pod_urls(&self) -> Vec<String> {
        let mut urls = self.pods.keys();
        urls.sort();
        urls
    }
}

// pod and cluster URLs are stored without a trailing separator so that
//  "pod url" + "page path" is always the page URL
fn trim_url(url: &str) -> &str {
    url.trim_end_matches('/')
}

impl Deref for Cluster {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}

impl VirtualProperties for Cluster {
    fn virtual_keys(&self) -> Vec<String> {
        vec![PODS.to_string(), POD_COUNT.to_string()]
    }

    fn virtual_get(&self, key: &str) -> Option<Value> {
        match key {
            PODS => Some(Value::from(self.pod_urls())),
            POD_COUNT => Some(Value::from(self.pods.len())),
            _ => None,
        }
    }

    fn virtual_set(&self, key: &str, _value: &Value) -> Option<Result<()>> {
        match key {
            PODS | POD_COUNT => Some(Err(StoreError::RejectedProperty(key.to_string()))),
            _ => None,
        }
    }
}

impl Resource for Cluster {
    fn node(&self) -> &Node {
        &self.node
    }

    fn url(&self) -> Option<String> {
        Some(self.url.clone())
    }

    fn owner_url(&self) -> Option<String> {
        None
    }
}
