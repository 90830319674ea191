//! Client settings store.
//!
//! Settings persisted as JSON, with `MINIGATE_*` environment overrides.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use minigate_core::{DeviceEnvironment, LaunchParams};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json_or_default, save_json};

/// Environment variable overriding [`Settings::api_host`].
pub const API_HOST_ENV: &str = "MINIGATE_API_HOST";
/// Environment variable overriding [`Settings::api_prefix`].
pub const API_PREFIX_ENV: &str = "MINIGATE_API_PREFIX";
/// Environment variable overriding [`Settings::mock_launch_params`].
pub const MOCK_LAUNCH_PARAMS_ENV: &str = "MINIGATE_MOCK_LAUNCH_PARAMS";

// ============================================================================
// Settings Types
// ============================================================================

/// Client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Scheme and host of the backend, e.g. `https://api.example.com`.
    pub api_host: String,

    /// Path prefix appended to the host, e.g. `/api`.
    pub api_prefix: String,

    /// Hosts requests may go to. Empty allows any host.
    pub allowed_hosts: Vec<String>,

    /// Launch parameters as JSON, used when not running inside the chat
    /// client.
    pub mock_launch_params: Option<String>,

    /// Device facts reported in the `x-device` header.
    pub device: DeviceSettings,

    /// Where the auth token is kept.
    pub token_backend: TokenBackend,

    /// Log level used when neither `--verbose` nor `--quiet` is given.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_host: "http://localhost:8080".to_string(),
            api_prefix: "/api".to_string(),
            allowed_hosts: Vec::new(),
            mock_launch_params: None,
            device: DeviceSettings::default(),
            token_backend: TokenBackend::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Returns the base URL relative request paths are appended to.
    pub fn base_url(&self) -> String {
        format!("{}{}", self.api_host, self.api_prefix)
    }

    /// Parses the mock launch parameters, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the mock is malformed.
    pub fn launch_params(&self) -> Result<Option<LaunchParams>, StoreError> {
        self.mock_launch_params
            .as_deref()
            .map(|raw| {
                LaunchParams::from_mock_json(raw)
                    .map_err(|e| StoreError::Config(format!("mock_launch_params: {e}")))
            })
            .transpose()
    }

    /// Applies `MINIGATE_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(API_HOST_ENV) {
            debug!(host = %host, "API host overridden from environment");
            self.api_host = host;
        }
        if let Some(prefix) = lookup(API_PREFIX_ENV) {
            self.api_prefix = prefix;
        }
        if let Some(mock) = lookup(MOCK_LAUNCH_PARAMS_ENV) {
            self.mock_launch_params = Some(mock);
        }
    }
}

/// Device facts. Unset fields fall back to [`DeviceEnvironment`] defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// User agent of the embedding web view.
    pub user_agent: Option<String>,
    /// Screen width in CSS pixels.
    pub screen_width: Option<u32>,
    /// Screen height in CSS pixels.
    pub screen_height: Option<u32>,
    /// Device pixel ratio.
    pub pixel_ratio: Option<f64>,
    /// IANA time zone name.
    pub time_zone: Option<String>,
}

impl DeviceSettings {
    /// Builds the device environment.
    pub fn environment(&self) -> DeviceEnvironment {
        let defaults = DeviceEnvironment::default();
        DeviceEnvironment {
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            screen_width: self.screen_width.unwrap_or(defaults.screen_width),
            screen_height: self.screen_height.unwrap_or(defaults.screen_height),
            pixel_ratio: self.pixel_ratio.unwrap_or(defaults.pixel_ratio),
            time_zone: self.time_zone.clone().unwrap_or(defaults.time_zone),
        }
    }
}

/// Auth token storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenBackend {
    /// JSON user store in the data directory.
    #[default]
    File,
    /// System keychain.
    Keychain,
}

impl std::fmt::Display for TokenBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenBackend::File => write!(f, "file"),
            TokenBackend::Keychain => write!(f, "keychain"),
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Persistent settings store.
#[derive(Debug)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store holding default settings.
    pub fn new(path: PathBuf) -> Self {
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path,
        }
    }

    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be loaded from disk.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path. A missing or unreadable file yields
    /// defaults.
    ///
    /// # Errors
    ///
    /// Never fails today: unreadable files fall back to defaults.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        info!(path = %path.display(), "Loading settings");
        let settings: Settings = load_json_or_default(&path).await;

        let store = Self::new(path);
        *store.settings.write().await = settings;
        Ok(store)
    }

    /// Returns the settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings in memory; call [`SettingsStore::save`] to persist.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.write().await;
        f(&mut settings);
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    // ========================================================================
    // Convenience Methods
    // ========================================================================

    /// Gets the base URL.
    pub async fn base_url(&self) -> String {
        self.settings.read().await.base_url()
    }

    /// Sets the API host.
    pub async fn set_api_host(&self, host: impl Into<String>) {
        let host = host.into();
        self.update(|s| s.api_host = host).await;
    }

    /// Sets the API prefix.
    pub async fn set_api_prefix(&self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        self.update(|s| s.api_prefix = prefix).await;
    }

    /// Sets the token backend.
    pub async fn set_token_backend(&self, backend: TokenBackend) {
        self.update(|s| s.token_backend = backend).await;
    }

    /// Sets the default log level.
    pub async fn set_log_level(&self, level: LogLevel) {
        self.update(|s| s.log_level = level).await;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.base_url(), "http://localhost:8080/api");
        assert_eq!(settings.token_backend, TokenBackend::File);
        assert!(settings.allowed_hosts.is_empty());
        assert_eq!(settings.launch_params().unwrap(), None);
    }

    #[test]
    fn test_partial_settings_file() {
        let settings: Settings =
            serde_json::from_str(r#"{"api_host":"https://api.example.com","token_backend":"keychain"}"#)
                .unwrap();
        assert_eq!(settings.base_url(), "https://api.example.com/api");
        assert_eq!(settings.token_backend, TokenBackend::Keychain);
        assert_eq!(settings.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (API_HOST_ENV, "https://staging.example.com"),
            (MOCK_LAUNCH_PARAMS_ENV, r#"{"platform":"ios","appVersion":"8.0"}"#),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(settings.base_url(), "https://staging.example.com/api");
        let params = settings.launch_params().unwrap().unwrap();
        assert_eq!(params.platform, "ios");
    }

    #[test]
    fn test_bad_mock_is_config_error() {
        let settings = Settings {
            mock_launch_params: Some("{".to_string()),
            ..Settings::default()
        };
        assert!(matches!(settings.launch_params(), Err(StoreError::Config(_))));
    }

    #[test]
    fn test_device_environment_fallbacks() {
        let device = DeviceSettings {
            user_agent: Some("UA".to_string()),
            screen_width: Some(390),
            ..DeviceSettings::default()
        };
        let env = device.environment();
        assert_eq!(env.user_agent, "UA");
        assert_eq!(env.screen_width, 390);
        assert_eq!(env.time_zone, DeviceEnvironment::default().time_zone);
    }

    #[tokio::test]
    async fn test_setters_update_in_memory() {
        let store = SettingsStore::new(PathBuf::from("/tmp/minigate_test_settings.json"));

        store.set_api_host("https://api.example.com").await;
        store.set_token_backend(TokenBackend::Keychain).await;

        assert_eq!(store.base_url().await, "https://api.example.com/api");
        assert_eq!(store.get().await.token_backend, TokenBackend::Keychain);
    }
}
