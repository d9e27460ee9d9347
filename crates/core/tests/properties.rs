//! Integration tests for the property view

mod common;

use std::collections::BTreeSet;

use pods::prelude::*;
use serde_json::{json, Value};

fn key_set(keys: Vec<String>) -> BTreeSet<String> {
    keys.into_iter().collect()
}

#[test]
fn test_content_round_trips_through_properties() {
    let (_cluster, _pod, page) = common::setup_page("draft");
    let props = page.properties();
    let before = page.version();

    props.set("_content", "replaced").unwrap();
    props.set("_contentType", "text/markdown").unwrap();

    assert_eq!(props.get("_content"), Some(json!("replaced")));
    assert_eq!(props.get("_contentType"), Some(json!("text/markdown")));
    assert_eq!(page.content().content, "replaced");
    // each content property write is a content mutation
    assert_eq!(page.version(), before + 2);
}

#[test]
fn test_application_properties_round_trip() {
    let (_cluster, _pod, page) = common::setup_page("");
    let props = page.properties();
    let version = page.version();

    props.set("title", "Groceries").unwrap();
    props.set("tags", json!(["food", "weekly"])).unwrap();
    props.set("title", "Shopping").unwrap();

    assert_eq!(props.get("title"), Some(json!("Shopping")));
    assert_eq!(props.get("tags"), Some(json!(["food", "weekly"])));
    assert_eq!(props.get("missing"), None);
    // the property bag is not versioned content
    assert_eq!(page.version(), version);

    assert_eq!(props.remove("tags").unwrap(), Some(json!(["food", "weekly"])));
    assert_eq!(props.get("tags"), None);
}

#[test]
fn test_keys_are_reserved_plus_distinct_application_keys() {
    let (_cluster, _pod, page) = common::setup_page("");
    let props = page.properties();
    props.set("a", 1).unwrap();
    props.set("b", 2).unwrap();
    props.set("a", 3).unwrap();

    let keys = props.keys();
    assert_eq!(keys.len(), key_set(keys.clone()).len());
    assert_eq!(
        key_set(keys),
        key_set(
            ["_id", "_etag", "_owner", "_contentType", "_content", "a", "b"]
                .map(String::from)
                .to_vec()
        )
    );
}

#[test]
fn test_reserved_keys_are_rejected_explicitly() {
    let (_cluster, _pod, page) = common::setup_page("");
    let props = page.properties();

    for key in ["_id", "_etag", "_secret", "@context", ""] {
        assert_eq!(
            props.set(key, "x"),
            Err(StoreError::RejectedProperty(key.to_string()))
        );
    }
    assert_eq!(
        props.set("_content", 42),
        Err(StoreError::InvalidPropertyValue {
            key: "_content".to_string(),
            expected: "string"
        })
    );
    assert!(matches!(
        props.remove("_owner"),
        Err(StoreError::RejectedProperty(_))
    ));
    assert_eq!(props.get("_content"), Some(json!("")));
}

#[test]
fn test_system_properties_describe_the_page() {
    let (_cluster, _pod, page) = common::setup_page("hello");
    let map = page.properties().to_map();

    assert_eq!(map["_id"], json!(page.url().unwrap()));
    assert_eq!(map["_owner"], json!(common::POD_URL));
    assert_eq!(map["_etag"], json!(page.etag().to_string()));
    assert_eq!(map["_contentType"], json!("text/plain"));
    assert_eq!(map["_content"], json!("hello"));
}

#[test]
fn test_data_only_pages_hide_content_keys() {
    let (_cluster, pod) = common::setup_pod();
    let page = pod.new_data_page();
    let props = page.properties();
    props.set("name", "alice").unwrap();

    let map = props.to_map();
    assert!(!map.contains_key("_content"));
    assert!(!map.contains_key("_contentType"));
    assert_eq!(map["name"], json!("alice"));
    assert_eq!(props.get("_content"), None);
}

#[test]
fn test_pod_lists_its_pages() {
    let (_cluster, pod) = common::setup_pod();
    pod.new_page();
    pod.page_by_path("/about", true).unwrap();

    let props = pod.properties();
    assert_eq!(
        props.get("_pages"),
        Some(json!(["http://pod1.example/about", "http://pod1.example/auto/0"]))
    );
    assert_eq!(props.get("_pageCount"), Some(json!(2)));
    assert_eq!(props.get("_id"), Some(json!(common::POD_URL)));
    assert_eq!(props.get("_owner"), Some(json!(common::CLUSTER_URL)));
    assert_eq!(
        props.set("_pageCount", 10),
        Err(StoreError::RejectedProperty("_pageCount".into()))
    );
}

#[test]
fn test_cluster_lists_its_pods_and_has_no_owner() {
    let (cluster, _pod) = common::setup_pod();
    cluster.new_pod("http://pod2.example");

    let map = cluster.properties().to_map();
    assert_eq!(
        map["_pods"],
        json!(["http://pod1.example", "http://pod2.example"])
    );
    assert_eq!(map["_podCount"], json!(2));
    assert_eq!(map["_id"], json!(common::CLUSTER_URL));
    assert!(!map.contains_key("_owner"));
}

#[test]
fn test_view_serializes_to_json() {
    let (cluster, _pod, page) = common::setup_page("body");
    page.properties().set("rating", 5).unwrap();

    let encoded = serde_json::to_string(&page.properties()).unwrap();
    let decoded: Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded["rating"], json!(5));
    assert_eq!(decoded["_content"], json!("body"));

    // resolved targets expose the same view
    let target = cluster.resolve(&page.url().unwrap(), false).unwrap();
    assert_eq!(target.to_map(), page.properties().to_map());
}

#[tokio::test]
async fn test_content_property_wakes_waiters() {
    let (_cluster, _pod, page) = common::setup_page("v1");
    let etag = page.etag();

    let waiter = {
        let page = page.clone();
        let etag = etag.clone();
        tokio::spawn(async move { page.wait_for_change(&etag).await })
    };
    while page.pending_waiters() == 0 {
        tokio::task::yield_now().await;
    }

    page.properties().set("_content", "v2").unwrap();
    let woke_with = waiter.await.unwrap().unwrap();
    assert_eq!(woke_with, page.etag());
    assert_ne!(woke_with, etag);
}
