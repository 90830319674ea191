//! Device identity attached to every request.
//!
//! [`IdentityContext`] is built once per process from the platform launch
//! parameters and the host's device facts. It renders the identity headers;
//! the auth token is not part of it and is read per request by the executor.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use minigate_core::{DeviceEnvironment, DeviceInfo, LaunchParams};
use regex::Regex;
use serde_json::json;
use tracing::debug;

use crate::constants::{defaults, headers};

// ============================================================================
// User Agent Parsing
// ============================================================================

static IPHONE_OS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"CPU iPhone OS (\d+)_(\d+)(?:_(\d+))?").expect("valid iPhone OS regex")
});

static IPAD_OS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"CPU OS (\d+)_(\d+)(?:_(\d+))?").expect("valid iPad OS regex")
});

static ANDROID_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Android ([\d.]+)").expect("valid Android version regex"));

static ANDROID_MODEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Android [\d.]+;\s*([^)]+)").expect("valid Android model regex")
});

/// OS version and device model extracted from a user agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAgentInfo {
    /// Dotted OS version, e.g. `16.6` or `11.0`.
    pub sys_version: Option<String>,
    /// Device family (iOS) or free-text model (Android).
    pub brand_model: Option<String>,
}

fn apple_version(re: &Regex, ua: &str) -> Option<String> {
    let caps = re.captures(ua)?;
    let mut version = format!("{}.{}", &caps[1], &caps[2]);
    if let Some(patch) = caps.get(3) {
        version.push('.');
        version.push_str(patch.as_str());
    }
    Some(version)
}

/// Parses a user agent into OS version and device model.
///
/// Only iPhone, iPad and Android agents are recognized. Anything else yields
/// empty fields.
pub fn parse_user_agent(ua: &str) -> UserAgentInfo {
    if ua.contains("iPhone") {
        return UserAgentInfo {
            sys_version: apple_version(&IPHONE_OS_RE, ua),
            brand_model: Some("iPhone".to_string()),
        };
    }

    if ua.contains("iPad") {
        return UserAgentInfo {
            sys_version: apple_version(&IPAD_OS_RE, ua),
            brand_model: Some("iPad".to_string()),
        };
    }

    if ua.contains("Android") {
        let sys_version = ANDROID_VERSION_RE
            .captures(ua)
            .map(|caps| caps[1].to_string());
        let brand_model = ANDROID_MODEL_RE
            .captures(ua)
            .map(|caps| caps[1].trim().to_string())
            .filter(|model| !model.is_empty());
        return UserAgentInfo {
            sys_version,
            brand_model,
        };
    }

    UserAgentInfo::default()
}

// ============================================================================
// Identity Context
// ============================================================================

/// Process-wide identity, computed once.
#[derive(Debug, Clone)]
pub struct IdentityContext {
    device: DeviceInfo,
    device_json: String,
    language: Option<String>,
    app_version: String,
}

impl IdentityContext {
    /// Builds the identity from launch parameters and device facts.
    pub fn new(launch: &LaunchParams, env: &DeviceEnvironment) -> Self {
        let ua = parse_user_agent(&env.user_agent);
        debug!(
            platform = %launch.platform,
            sys_version = ?ua.sys_version,
            brand_model = ?ua.brand_model,
            "Building identity context"
        );

        let device = DeviceInfo {
            device_type: launch.platform.clone(),
            device_id: String::new(),
            device_name: String::new(),
            sys_version: ua.sys_version.unwrap_or_default(),
            sys_lang: launch.language_code.clone(),
            brand_model: ua.brand_model.unwrap_or_default(),
            time_zone: env.time_zone.clone(),
            screen_resolution: env.screen_resolution(),
            location_city: String::new(),
            firebase_token: String::new(),
            extra_info: json!({ "pixelRatio": env.pixel_ratio }).to_string(),
        };
        // A struct of strings always serializes.
        let device_json = serde_json::to_string(&device).unwrap_or_default();

        Self {
            device,
            device_json,
            language: launch.language_code.clone(),
            app_version: launch.app_version.clone(),
        }
    }

    /// Returns the device payload.
    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    /// Returns the JSON-encoded device payload (`x-device`).
    pub fn device_json(&self) -> &str {
        &self.device_json
    }

    /// Returns the user language code.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Returns the platform app version.
    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    /// Renders the default headers for one request.
    ///
    /// `auth-token` is only set when a token is available.
    pub fn headers(&self, token: Option<&str>) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(headers::CONTENT_TYPE.to_string(), defaults::CONTENT_TYPE.to_string());
        map.insert(headers::CLIENT_TYPE.to_string(), defaults::CLIENT_TYPE.to_string());
        if let Some(token) = token {
            map.insert(headers::AUTH_TOKEN.to_string(), token.to_string());
        }
        map.insert(headers::X_BID.to_string(), defaults::X_BID_VALUE.to_string());
        map.insert(headers::X_DEVICE.to_string(), self.device_json.clone());
        map.insert(
            headers::LANG.to_string(),
            self.language.clone().unwrap_or_default(),
        );
        map.insert(headers::VERSION_CODE.to_string(), self.app_version.clone());
        map
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_6 like Mac OS X) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148";
    const IPHONE_PATCH_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1_2 like Mac OS X)";
    const IPAD_UA: &str = "Mozilla/5.0 (iPad; CPU OS 15_4 like Mac OS X) AppleWebKit/605.1.15";
    const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 11.0; Pixel 5) AppleWebKit/537.36";

    #[test]
    fn test_parse_iphone() {
        let info = parse_user_agent(IPHONE_UA);
        assert_eq!(info.sys_version.as_deref(), Some("16.6"));
        assert_eq!(info.brand_model.as_deref(), Some("iPhone"));
    }

    #[test]
    fn test_parse_iphone_with_patch() {
        let info = parse_user_agent(IPHONE_PATCH_UA);
        assert_eq!(info.sys_version.as_deref(), Some("17.1.2"));
    }

    #[test]
    fn test_parse_iphone_without_version_keeps_family() {
        let info = parse_user_agent("SomeApp/1.0 (iPhone)");
        assert_eq!(info.sys_version, None);
        assert_eq!(info.brand_model.as_deref(), Some("iPhone"));
    }

    #[test]
    fn test_parse_ipad() {
        let info = parse_user_agent(IPAD_UA);
        assert_eq!(info.sys_version.as_deref(), Some("15.4"));
        assert_eq!(info.brand_model.as_deref(), Some("iPad"));
    }

    #[test]
    fn test_parse_android() {
        let info = parse_user_agent(ANDROID_UA);
        assert_eq!(info.sys_version.as_deref(), Some("11.0"));
        assert_eq!(info.brand_model.as_deref(), Some("Pixel 5"));
    }

    #[test]
    fn test_parse_android_fragment() {
        let info = parse_user_agent("Android 11.0; Pixel 5)");
        assert_eq!(info.sys_version.as_deref(), Some("11.0"));
        assert_eq!(info.brand_model.as_deref(), Some("Pixel 5"));
    }

    #[test]
    fn test_parse_unknown() {
        let info = parse_user_agent("Mozilla/5.0 (X11; Linux x86_64) Firefox/120.0");
        assert_eq!(info, UserAgentInfo::default());
        assert_eq!(parse_user_agent(""), UserAgentInfo::default());
    }

    fn identity() -> IdentityContext {
        let launch = LaunchParams::new("ios", "8.0").with_language("en");
        let env = DeviceEnvironment {
            user_agent: IPHONE_UA.to_string(),
            screen_width: 390,
            screen_height: 844,
            pixel_ratio: 3.0,
            time_zone: "Europe/Berlin".to_string(),
        };
        IdentityContext::new(&launch, &env)
    }

    #[test]
    fn test_device_payload() {
        let identity = identity();
        let device = identity.device();
        assert_eq!(device.device_type, "ios");
        assert_eq!(device.sys_version, "16.6");
        assert_eq!(device.brand_model, "iPhone");
        assert_eq!(device.screen_resolution, "390x844");
        assert_eq!(device.time_zone, "Europe/Berlin");
        assert_eq!(device.extra_info, r#"{"pixelRatio":3.0}"#);

        let parsed: DeviceInfo = serde_json::from_str(identity.device_json()).unwrap();
        assert_eq!(&parsed, device);
    }

    #[test]
    fn test_headers_with_token() {
        let headers = identity().headers(Some("tok"));
        assert_eq!(headers["Content-Type"], "application/json");
        assert_eq!(headers["client-type"], "TELEGRAM_WEBAPP");
        assert_eq!(headers["auth-token"], "tok");
        assert_eq!(headers["x-bid"], "1");
        assert_eq!(headers["lang"], "en");
        assert_eq!(headers["version-code"], "8.0");
        assert!(headers["x-device"].contains(r#""deviceType":"ios""#));
    }

    #[test]
    fn test_headers_without_token_or_language() {
        let identity = IdentityContext::new(
            &LaunchParams::new("android", "7.2"),
            &DeviceEnvironment::default(),
        );
        let headers = identity.headers(None);
        assert!(!headers.contains_key("auth-token"));
        assert_eq!(headers["lang"], "");
        assert_eq!(identity.device().sys_version, "");
    }
}
