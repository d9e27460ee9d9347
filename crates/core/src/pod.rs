use std::ops::Deref;
use std::sync::{Arc, Weak};

use serde_json::Value;

use crate::cluster::Cluster;
use crate::config::Config;
use crate::container::{Container, Lookup};
use crate::error::{Result, StoreError};
use crate::node::Node;
use crate::page::Page;
use crate::properties::VirtualProperties;
use crate::resource::Resource;

pub const PAGES: &str = "_pages";
pub const PAGE_COUNT: &str = "_pageCount";

/// A set of pages owned by a single user, itself answerable as a page
/// (empty path) at the pod's own URL.
#[derive(Debug)]
pub struct Pod {
    node: Node,
    url: String,
    cluster: Weak<Cluster>,
    pages: Container<Page>,
    config: Arc<Config>,
    this: Weak<Pod>,
}

impl Pod {
    pub(crate) fn new(url: &str, cluster: Weak<Cluster>, config: Arc<Config>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            node: Node::new("", false, &config),
            url: url.to_string(),
            cluster,
            pages: Container::new(),
            config,
            this: this.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn cluster(&self) -> Option<Arc<Cluster>> {
        self.cluster.upgrade()
    }

    /// Snapshot of every page, tombstoned ones included, in no
    ///  particular order
    pub fn pages(&self) -> Vec<Arc<Page>> {
        self.pages.children()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Create a page at the next unused auto-generated path
    pub fn new_page(&self) -> Arc<Page> {
        self.mint_page(false)
    }

    /// Create a data-only page at the next unused auto-generated path
    pub fn new_data_page(&self) -> Arc<Page> {
        self.mint_page(true)
    }

    pub fn page_by_path(&self, path: &str, may_create: bool) -> Result<Lookup<Page>> {
        if !path.starts_with('/') {
            return Err(StoreError::malformed(path, "page paths must start with '/'"));
        }
        self.pages
            .child_by_key(path, may_create, |path| self.make_page(path, false))
    }

    /// Resolve an absolute URL under this pod to one of its pages
    pub fn page_by_url(&self, url: &str, may_create: bool) -> Result<Lookup<Page>> {
        let path = self.local_path(url)?;
        self.page_by_path(path, may_create)
    }

    /// The page path of `url`: what follows the pod URL, separator included
    pub(crate) fn local_path<'u>(&self, url: &'u str) -> Result<&'u str> {
        let rest = url
            .strip_prefix(self.url.as_str())
            .ok_or_else(|| StoreError::malformed(url, "not under this pod"))?;
        if !rest.starts_with('/') {
            return Err(StoreError::malformed(url, "page paths must start with '/'"));
        }
        Ok(rest)
    }

    fn mint_page(&self, data_only: bool) -> Arc<Page> {
        let prefix = &self.config.auto_path_prefix;
        self.pages.new_child(
            |n| format!("{prefix}{n}"),
            |path| self.make_page(path, data_only),
        )
    }

    fn make_page(&self, path: &str, data_only: bool) -> Arc<Page> {
        Arc::new(Page::new(path, data_only, self.this.clone(), &self.config))
    }

    fn page_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .pages
            .keys()
            .into_iter()
            .map(|path| format!("{}{}", self.url, path))
            .collect();
        urls.sort();
        urls
    }
}

impl Deref for Pod {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}

impl VirtualProperties for Pod {
    fn virtual_keys(&self) -> Vec<String> {
        vec![PAGES.to_string(), PAGE_COUNT.to_string()]
    }

    fn virtual_get(&self, key: &str) -> Option<Value> {
        match key {
            PAGES => Some(Value::from(self.page_urls())),
            PAGE_COUNT => Some(Value::from(self.page_count())),
            _ => None,
        }
    }

    fn virtual_set(&self, key: &str, _value: &Value) -> Option<Result<()>> {
        match key {
            PAGES | PAGE_COUNT => Some(Err(StoreError::RejectedProperty(key.to_string()))),
            _ => None,
        }
    }
}

impl Resource for Pod {
    fn node(&self) -> &Node {
        &self.node
    }

    fn url(&self) -> Option<String> {
        Some(self.url.clone())
    }

    fn owner_url(&self) -> Option<String> {
        self.cluster.upgrade().map(|cluster| cluster.url().to_string())
    }
}
