//! Integration tests for address resolution and child lifecycle

mod common;

use std::sync::Arc;

use pods::prelude::*;

#[test]
fn test_auto_paths_are_never_reused() {
    let (_cluster, pod) = common::setup_pod();

    let g1 = pod.new_page();
    assert_eq!(g1.url().unwrap(), "http://pod1.example/auto/0");
    let g2 = pod.new_page();
    assert_eq!(g2.url().unwrap(), "http://pod1.example/auto/1");
    let g3 = pod.new_page();
    assert_eq!(g3.url().unwrap(), "http://pod1.example/auto/2");

    g2.delete();

    let g4 = pod.new_page();
    assert_eq!(g4.url().unwrap(), "http://pod1.example/auto/3");
    assert_eq!(pod.pages().len(), 4);
}

#[test]
fn test_new_page_skips_manually_created_paths() {
    let (_cluster, pod) = common::setup_pod();
    pod.page_by_path("/auto/0", true).unwrap();

    let page = pod.new_page();
    assert_eq!(page.path(), "/auto/1");
}

#[test]
fn test_page_by_url_creates_then_finds() {
    let (cluster, pod) = common::setup_pod();

    let lookup = cluster
        .page_by_url("http://pod1.example/notes/today", true)
        .unwrap();
    assert!(lookup.created());
    let page = lookup.into_child();
    assert_eq!(page.path(), "/notes/today");
    assert_eq!(page.url().unwrap(), "http://pod1.example/notes/today");
    assert!(Arc::ptr_eq(&page.pod().unwrap(), &pod));

    let again = cluster
        .page_by_url("http://pod1.example/notes/today", false)
        .unwrap();
    assert!(matches!(&again, Lookup::Found(found) if Arc::ptr_eq(found, &page)));
}

#[test]
fn test_page_by_url_without_create_on_missing_page() {
    let (cluster, _pod) = common::setup_pod();
    let result = cluster.page_by_url("http://pod1.example/nothing", false);
    assert_eq!(result.err(), Some(StoreError::NotFound("/nothing".into())));
}

#[test]
fn test_unknown_pod_is_malformed_not_a_panic() {
    let (cluster, _pod) = common::setup_pod();
    let result = cluster.page_by_url("http://elsewhere.example/a", true);
    assert!(matches!(result, Err(StoreError::MalformedAddress { .. })));
}

#[test]
fn test_deleted_page_is_distinguishable_from_missing() {
    let (cluster, pod, page) = common::setup_page("hello");
    let url = page.url().unwrap();
    page.delete();

    let lookup = cluster.page_by_url(&url, false).unwrap();
    assert!(lookup.is_deleted());
    assert_eq!(lookup.into_live().err(), Some(StoreError::Deleted(url.clone())));

    // recreating revives the same node without resetting its version
    let version = page.version();
    let lookup = pod.page_by_url(&url, true).unwrap();
    assert!(lookup.created());
    assert!(Arc::ptr_eq(lookup.child(), &page));
    assert!(!page.is_deleted());
    assert_eq!(page.version(), version);

    let etag = page
        .set_content("text/plain", "again", None)
        .into_result()
        .unwrap();
    assert_eq!(page.content().etag, etag);
    assert!(page.version() > version);
}

#[test]
fn test_resolve_reaches_every_level() {
    let (cluster, _pod, page) = common::setup_page("body");

    let target = cluster.resolve(common::CLUSTER_URL, false).unwrap();
    assert!(matches!(target, Target::Cluster(_)));
    assert_eq!(target.path(), "");

    let target = cluster.resolve("http://pod1.example/", false).unwrap();
    assert!(matches!(&target, Target::Pod(pod) if pod.url() == common::POD_URL));

    let target = cluster.resolve(&page.url().unwrap(), false).unwrap();
    assert!(!target.created());
    assert_eq!(target.content().content, "body");

    let target = cluster
        .resolve("http://pod1.example/fresh", true)
        .unwrap();
    assert!(target.created());
    assert_eq!(target.url().as_deref(), Some("http://pod1.example/fresh"));
    assert!(target.into_page().is_some());
}

#[test]
fn test_pods_and_cluster_answer_the_leaf_contract() {
    let (cluster, pod) = common::setup_pod();

    let etag = pod
        .set_content("text/plain", "pod index", None)
        .into_result()
        .unwrap();
    assert_eq!(pod.content().etag, etag);

    cluster
        .set_content("application/json", "{}", None)
        .into_result()
        .unwrap();
    assert_eq!(cluster.content().content_type, "application/json");

    // container nodes are separate from their children
    assert_eq!(pod.page_count(), 0);
    assert_eq!(cluster.pods().len(), 1);
}

#[test]
fn test_pod_lookup_is_exact() {
    let (cluster, pod) = common::setup_pod();
    assert!(Arc::ptr_eq(&cluster.pod_by_url(common::POD_URL).unwrap(), &pod));
    assert!(cluster.pod_by_url("http://pod1.example/auto/0").is_none());
    assert!(cluster.pod_by_url("http://pod2.example").is_none());
}
