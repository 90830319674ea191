//! Identity-related types.
//!
//! - [`LaunchParams`] - what the chat platform hands the mini-app on launch
//! - [`DeviceEnvironment`] - user agent, screen and locale facts of the host
//! - [`DeviceInfo`] - the payload serialized into the `x-device` header

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// Launch Parameters
// ============================================================================

/// Launch parameters supplied by the chat platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LaunchParams {
    /// Platform name (e.g. `ios`, `android`, `tdesktop`).
    pub platform: String,
    /// Chat-platform app version.
    pub app_version: String,
    /// User language code, when the platform shares it.
    pub language_code: Option<String>,
    /// Raw signed init data used for login.
    pub init_data_raw: Option<String>,
}

impl LaunchParams {
    /// Creates launch parameters for a platform and app version.
    pub fn new(platform: impl Into<String>, app_version: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            app_version: app_version.into(),
            language_code: None,
            init_data_raw: None,
        }
    }

    /// Sets the language code.
    #[must_use]
    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.language_code = Some(code.into());
        self
    }

    /// Parses launch parameters from a JSON mock, as used during development
    /// outside of the chat client.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or names no platform.
    pub fn from_mock_json(raw: &str) -> Result<Self, CoreError> {
        let params: Self = serde_json::from_str(raw)?;
        if params.platform.is_empty() {
            return Err(CoreError::InvalidData(
                "mock launch params have no platform".to_string(),
            ));
        }
        Ok(params)
    }
}

// ============================================================================
// Device Environment
// ============================================================================

/// Host facts read once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceEnvironment {
    /// User agent string of the embedding web view.
    pub user_agent: String,
    /// Screen width in CSS pixels.
    pub screen_width: u32,
    /// Screen height in CSS pixels.
    pub screen_height: u32,
    /// Device pixel ratio.
    pub pixel_ratio: f64,
    /// IANA time zone name.
    pub time_zone: String,
}

impl Default for DeviceEnvironment {
    fn default() -> Self {
        Self {
            user_agent: String::new(),
            screen_width: 0,
            screen_height: 0,
            pixel_ratio: 1.0,
            time_zone: "UTC".to_string(),
        }
    }
}

impl DeviceEnvironment {
    /// Formats the screen resolution as `WIDTHxHEIGHT`.
    pub fn screen_resolution(&self) -> String {
        format!("{}x{}", self.screen_width, self.screen_height)
    }
}

// ============================================================================
// Device Info (x-device)
// ============================================================================

/// Device payload sent JSON-encoded in the `x-device` header.
///
/// Fields the client cannot know are sent as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Platform reported by the launch parameters.
    pub device_type: String,
    /// Device identifier.
    pub device_id: String,
    /// Device name.
    pub device_name: String,
    /// Operating system version parsed from the user agent.
    pub sys_version: String,
    /// User language code, omitted when unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sys_lang: Option<String>,
    /// Brand and model parsed from the user agent.
    pub brand_model: String,
    /// IANA time zone name.
    pub time_zone: String,
    /// Screen resolution `WIDTHxHEIGHT`.
    pub screen_resolution: String,
    /// City, when known.
    pub location_city: String,
    /// Push token, when known.
    pub firebase_token: String,
    /// JSON-encoded extra facts (`{"pixelRatio": 3}`).
    pub extra_info: String,
}

// ============================================================================
// Tests
// ============================================================================
