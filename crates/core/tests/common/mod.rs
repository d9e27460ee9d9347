//! Shared fixtures for store integration tests
#![allow(dead_code)]

use std::sync::Arc;

use pods::prelude::*;

pub const CLUSTER_URL: &str = "http://cluster.example";
pub const POD_URL: &str = "http://pod1.example";

/// Route store logs to the test writer; `RUST_LOG=pods=debug` to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A cluster with one empty pod
pub fn setup_pod() -> (Arc<Cluster>, Arc<Pod>) {
    init_tracing();
    let cluster = Cluster::new(CLUSTER_URL);
    let (pod, existed) = cluster.new_pod(POD_URL);
    assert!(!existed);
    (cluster, pod)
}

/// A cluster, its pod, and one page holding `content` as text/plain
pub fn setup_page(content: &str) -> (Arc<Cluster>, Arc<Pod>, Arc<Page>) {
    let (cluster, pod) = setup_pod();
    let page = pod.new_page();
    page.set_content("text/plain", content, None)
        .into_result()
        .unwrap();
    (cluster, pod, page)
}
