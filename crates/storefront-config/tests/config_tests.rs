use std::fs;

use storefront_config::{Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_matches_wizard_limits() {
    let cfg = Config::default();

    assert_eq!(cfg.default_mode, "register");
    assert_eq!(cfg.password_min_length, 6);
    assert_eq!(cfg.max_video_seconds, 60);
    assert!(cfg.required_fields.is_none());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let mut cfg = Config::default();
    cfg.set("default_mode", "upgrade").expect("set mode");
    cfg.set("required_fields", "storeName,email").expect("set fields");

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert_eq!(
        manager.config_path(),
        dir.path().join("config").join("config.json")
    );
    assert!(!dir.path().join("config").join("config.json.partial").exists());
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("absent.json"));
    assert_eq!(manager.load().expect("load"), Config::default());
}

#[test]
fn partial_file_fills_remaining_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "password_min_length": 10 }"#).expect("write");

    let loaded = ConfigManager::new(path).load().expect("load");
    assert_eq!(loaded.password_min_length, 10);
    assert_eq!(loaded.default_mode, "register");
    assert!(loaded.ui_color_enabled);
}

#[test]
fn corrupt_file_reports_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").expect("write");

    let err = ConfigManager::new(path).load().unwrap_err();
    assert!(matches!(err, ConfigError::Serde(_)));
}
