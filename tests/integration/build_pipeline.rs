//! End-to-end build pipeline: parsing, overlay merge, failure modes.

use crate::integration::{build, try_build};
use cascade::{ConfigError, Separator, TreeBuilder};

#[test]
fn test_single_scalar_document() {
    let config = build(&[r#"{"greeting": "hello"}"#]);
    assert_eq!(config.get::<String>("greeting").unwrap().unwrap(), "hello");
    assert!(config.get::<String>("missing").unwrap().is_none());
}

#[test]
fn test_multi_document_overlay() {
    let config = build(&[
        r#"{"a": {"x": "1", "y": "2"}}"#,
        r#"{"a": {"x": "9"}}"#,
    ]);
    assert_eq!(config.get::<String>("a.x").unwrap().unwrap(), "9");
    assert_eq!(config.get::<String>("a.y").unwrap().unwrap(), "2");
}

#[test]
fn test_overlay_adds_new_sections() {
    let config = build(&[
        r#"{"svc": {"port": "80"}}"#,
        r#"{"logging": {"level": "debug"}}"#,
    ]);
    assert_eq!(config.get::<u16>("svc.port").unwrap(), Some(80));
    assert_eq!(
        config.get::<String>("logging.level").unwrap().unwrap(),
        "debug"
    );
}

#[test]
fn test_overlay_kind_change_later_document_wins() {
    let config = build(&[
        r#"{"target": {"nested": "1"}}"#,
        r#"{"target": "flat"}"#,
    ]);
    assert_eq!(config.get::<String>("target").unwrap().unwrap(), "flat");
    assert!(!config.scope("target").is_valid());
}

#[test]
fn test_overlay_array_elements_merge_by_index() {
    let config = build(&[
        r#"{"item": [{"n": "1", "keep": "yes"}, {"n": "2"}]}"#,
        r#"{"item": [{"n": "10"}]}"#,
    ]);
    let items = config.scopes("item");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].get::<String>("n").unwrap().unwrap(), "10");
    assert_eq!(items[0].get::<String>("keep").unwrap().unwrap(), "yes");
    assert_eq!(items[1].get::<String>("n").unwrap().unwrap(), "2");
}

#[test]
fn test_malformed_document_aborts_build() {
    let err = try_build(&[r#"{"a": "1"}"#, "{broken"]).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_custom_separator() {
    let documents = vec![r#"{"svc": {"port": "8080"}}"#.to_string()];
    let config = TreeBuilder::new(Separator::from('/'))
        .build(&documents)
        .unwrap();
    assert_eq!(config.get::<u16>("svc/port").unwrap(), Some(8080));
    assert!(config.get::<u16>("svc.port").unwrap().is_none());
}

#[test]
fn test_document_order_is_caller_order() {
    let forward = build(&[r#"{"k": "first"}"#, r#"{"k": "second"}"#]);
    let reverse = build(&[r#"{"k": "second"}"#, r#"{"k": "first"}"#]);
    assert_eq!(forward.get::<String>("k").unwrap().unwrap(), "second");
    assert_eq!(reverse.get::<String>("k").unwrap().unwrap(), "first");
}
