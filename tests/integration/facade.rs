//! Read facade behavior: typed gets, scoping, null cursors.

use crate::integration::build;
use cascade::ConfigError;

#[test]
fn test_scope_equals_prefixed_root_reads() {
    let config = build(&[
        r#"{"svc": {"host": "localhost", "limits": {"rps": "100"}}}"#,
    ]);
    let scope = config.scope("svc");
    assert_eq!(
        scope.get::<String>("host").unwrap(),
        config.get::<String>("svc.host").unwrap()
    );
    assert_eq!(
        scope.get::<u32>("limits.rps").unwrap(),
        config.get::<u32>("svc.limits.rps").unwrap()
    );
}

#[test]
fn test_nested_scopes() {
    let config = build(&[r#"{"a": {"b": {"c": "deep"}}}"#]);
    let leaf = config.scope("a").scope("b");
    assert_eq!(leaf.get::<String>("c").unwrap().unwrap(), "deep");
    assert_eq!(config.scope("a.b").get::<String>("c").unwrap().unwrap(), "deep");
}

#[test]
fn test_scopes_per_element() {
    let config = build(&[
        r#"{"upstream": [{"host": "a", "weight": "1"}, {"host": "b", "weight": "2"}]}"#,
    ]);
    let upstreams = config.scopes("upstream");
    assert_eq!(upstreams.len(), 2);
    let hosts: Vec<String> = upstreams
        .iter()
        .map(|u| u.get::<String>("host").unwrap().unwrap())
        .collect();
    assert_eq!(hosts, vec!["a", "b"]);
}

#[test]
fn test_scope_on_multivalued_path_takes_first() {
    let config = build(&[r#"{"item": [{"n": "1"}, {"n": "2"}]}"#]);
    assert_eq!(config.scope("item").get::<u32>("n").unwrap(), Some(1));
}

#[test]
fn test_null_cursor_answers_empty_to_everything() {
    let config = build(&[r#"{"a": "1"}"#]);
    let null = config.scope("missing");
    assert!(!null.is_valid());
    assert!(null.get::<String>("a").unwrap().is_none());
    assert!(null.get_all::<String>("a").unwrap().is_empty());
    assert!(null.get_raw("a").is_empty());
    assert!(null.scopes("a").is_empty());
    assert!(!null.scope("a").is_valid());
}

#[test]
fn test_scope_outlives_parent_facade() {
    let scope = {
        let config = build(&[r#"{"svc": {"port": "80"}}"#]);
        config.scope("svc")
    };
    assert_eq!(scope.get::<u16>("port").unwrap(), Some(80));
}

#[test]
fn test_conversion_error_reports_location() {
    let config = build(&[r#"{"svc": {"port": "eighty"}}"#]);
    match config.get::<u16>("svc.port").unwrap_err() {
        ConfigError::Conversion { path, value, .. } => {
            assert_eq!(path, "svc.port");
            assert_eq!(value, "eighty");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_get_all_multivalued() {
    let config = build(&[r#"{"ports": ["8080", "8081", "8082"]}"#]);
    assert_eq!(
        config.get_all::<u16>("ports").unwrap(),
        vec![8080, 8081, 8082]
    );
}

#[test]
fn test_empty_and_separator_paths_read_as_missing() {
    let config = build(&[r#"{"a": "1"}"#]);
    assert!(config.get::<String>("").unwrap().is_none());
    assert!(config.get::<String>(".").unwrap().is_none());
    assert!(config.get_raw(".").is_empty());
}

#[test]
fn test_concurrent_reads_share_root() {
    let config = build(&[r#"{"svc": {"port": "80"}}"#]);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let view = config.clone();
            std::thread::spawn(move || view.get::<u16>("svc.port").unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(80));
    }
}
