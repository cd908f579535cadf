//! File loading boundary: byte-exact reads, silent skips, full pipeline.

use cascade::{Config, FileLoader, Separator};
use tempfile::TempDir;

#[test]
fn test_missing_files_are_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let present = temp_dir.path().join("present.json");
    std::fs::write(&present, r#"{"greeting": "hello"}"#).unwrap();
    let missing = temp_dir.path().join("missing.json");

    let config = FileLoader::new(vec![missing, present]).create().unwrap();
    assert_eq!(config.get::<String>("greeting").unwrap().unwrap(), "hello");
}

#[test]
fn test_overlay_order_follows_file_list() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("base.json");
    std::fs::write(&base, r#"{"svc": {"port": "80", "host": "localhost"}}"#).unwrap();
    let overlay = temp_dir.path().join("overlay.json");
    std::fs::write(&overlay, r#"{"svc": {"port": "8080"}}"#).unwrap();

    let config = Config::from_files([&base, &overlay], Separator::default()).unwrap();
    assert_eq!(config.get::<u16>("svc.port").unwrap(), Some(8080));
    assert_eq!(
        config.get::<String>("svc.host").unwrap().unwrap(),
        "localhost"
    );
}

#[test]
fn test_expansion_runs_over_loaded_files() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("config.json");
    std::fs::write(
        &file,
        r#"{"name": "svc", "template": {"id": "%config.name%"}, "app": {"use": "%node.template%"}}"#,
    )
    .unwrap();

    let config = Config::from_files([file], Separator::default()).unwrap();
    assert_eq!(config.get::<String>("app.use.id").unwrap().unwrap(), "svc");
}

#[test]
fn test_all_files_missing_yields_empty_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::from_files(
        [temp_dir.path().join("nope.json")],
        Separator::default(),
    )
    .unwrap();
    assert!(config.is_valid());
    assert!(config.get_raw("anything").is_empty());
}
