//! Integration tests for loading store config from disk

mod common;

use std::io::Write;

use pods::config::ConfigError;
use pods::prelude::*;
use tempfile::NamedTempFile;

fn write_config(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file
}

#[test]
fn test_loaded_prefix_reaches_new_pages() {
    common::init_tracing();
    let file = write_config(
        r#"
        auto_path_prefix = "/generated/"
        log_level = "debug"
        "#,
    );
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.log_level, "debug");

    let cluster = Cluster::with_config(common::CLUSTER_URL, config).unwrap();
    let (pod, _) = cluster.new_pod(common::POD_URL);
    let page = pod.new_page();
    assert_eq!(page.path(), "/generated/0");
    assert_eq!(cluster.config().auto_path_prefix, "/generated/");
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_bad_values_are_reported() {
    let file = write_config("max_waiters_per_node = \"many\"");
    assert!(matches!(
        Config::load(file.path()),
        Err(ConfigError::TomlDe(_))
    ));

    let file = write_config("auto_path_prefix = \"gen\"");
    assert!(matches!(
        Config::load(file.path()),
        Err(ConfigError::InvalidAutoPathPrefix(_))
    ));
}

#[test]
fn test_cluster_refuses_unrooted_prefix_built_in_code() {
    let config = Config {
        auto_path_prefix: "auto/".to_string(),
        ..Config::default()
    };
    let result = Cluster::with_config(common::CLUSTER_URL, config);
    assert!(matches!(
        result,
        Err(ConfigError::InvalidAutoPathPrefix(prefix)) if prefix == "auto/"
    ));

    // a rooted prefix keeps minted pages reachable by their own URL
    let config = Config {
        auto_path_prefix: "/gen/".to_string(),
        ..Config::default()
    };
    let cluster = Cluster::with_config(common::CLUSTER_URL, config).unwrap();
    let (pod, _) = cluster.new_pod(common::POD_URL);
    let page = pod.new_page();
    let lookup = cluster.page_by_url(&page.url().unwrap(), false).unwrap();
    assert!(std::sync::Arc::ptr_eq(lookup.child(), &page));
}
