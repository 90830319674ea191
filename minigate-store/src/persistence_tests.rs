//! Persistence edge case tests.
//!
//! Tests file I/O, settings store reload and the user store on disk.

use std::path::PathBuf;
use tempfile::TempDir;

use crate::persistence::{ensure_dir, load_json, load_json_or_default, save_json};
use crate::settings_store::{DeviceSettings, LogLevel, Settings, SettingsStore, TokenBackend};
use crate::user_store::UserStore;

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir.path().join("deeply").join("nested").join("test.json");

    save_json(&nested_path, &serde_json::json!({"key": "value"}))
        .await
        .unwrap();
    assert!(nested_path.exists());
    assert!(!nested_path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/settings.json");

    let result: Result<Settings, _> = load_json(&file_path).await;
    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_load_or_default_on_corrupt_file() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    tokio::fs::write(&file_path, "{ not json").await.unwrap();

    let settings: Settings = load_json_or_default(&file_path).await;
    assert_eq!(settings, Settings::default());
}

#[tokio::test]
async fn test_ensure_dir_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let dir_path = temp_dir.path().join("test_dir");

    ensure_dir(&dir_path).await.unwrap();
    ensure_dir(&dir_path).await.unwrap();

    assert!(dir_path.is_dir());
}

// ============================================================================
// Settings Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_settings_store_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    let store = SettingsStore::load(file_path.clone()).await.unwrap();
    store.set_api_host("https://api.example.com").await;
    store.set_api_prefix("/v2").await;
    store.set_token_backend(TokenBackend::Keychain).await;
    store
        .update(|s| {
            s.allowed_hosts = vec!["example.com".to_string()];
            s.log_level = LogLevel::Debug;
            s.device = DeviceSettings {
                pixel_ratio: Some(2.0),
                ..DeviceSettings::default()
            };
        })
        .await;
    store.save().await.unwrap();

    let reloaded = SettingsStore::load(file_path).await.unwrap().get().await;
    assert_eq!(reloaded.base_url(), "https://api.example.com/v2");
    assert_eq!(reloaded.token_backend, TokenBackend::Keychain);
    assert_eq!(reloaded.allowed_hosts, vec!["example.com".to_string()]);
    assert_eq!(reloaded.log_level, LogLevel::Debug);
    assert_eq!(reloaded.device.pixel_ratio, Some(2.0));
}

#[tokio::test]
async fn test_settings_load_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let store = SettingsStore::load(temp_dir.path().join("missing.json"))
        .await
        .unwrap();
    assert_eq!(store.get().await, Settings::default());
}

// ============================================================================
// User Store Tests
// ============================================================================

#[tokio::test]
async fn test_user_store_keys_are_separate_files() {
    let temp_dir = TempDir::new().unwrap();
    let store = UserStore::new(temp_dir.path().join("data"));

    store.set_token("a", Some("1".to_string())).await.unwrap();
    store.set_token("b", Some("2".to_string())).await.unwrap();

    assert_eq!(store.load("a").await.unwrap().token.as_deref(), Some("1"));
    assert_eq!(store.load("b").await.unwrap().token.as_deref(), Some("2"));
    assert!(store.path_for("a").exists());
}
