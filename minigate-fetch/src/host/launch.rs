//! Launch parameters handed over by the chat platform.

use minigate_core::{CoreError, LaunchParams};

/// Supplies the platform launch parameters.
pub trait LaunchParamsProvider: Send + Sync {
    /// Returns the launch parameters for this session.
    fn launch_params(&self) -> LaunchParams;
}

/// Fixed launch parameters, e.g. parsed from a dev-mode mock.
#[derive(Debug, Clone, Default)]
pub struct StaticLaunchParams {
    params: LaunchParams,
}

impl StaticLaunchParams {
    /// Wraps `params`.
    pub fn new(params: LaunchParams) -> Self {
        Self { params }
    }

    /// Parses a JSON mock of the launch parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the mock is not valid JSON or lacks a platform.
    pub fn from_mock_json(raw: &str) -> Result<Self, CoreError> {
        LaunchParams::from_mock_json(raw).map(Self::new)
    }
}

impl LaunchParamsProvider for StaticLaunchParams {
    fn launch_params(&self) -> LaunchParams {
        self.params.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider() {
        let provider = StaticLaunchParams::from_mock_json(
            r#"{"platform":"ios","appVersion":"8.0","languageCode":"de"}"#,
        )
        .unwrap();
        let params = provider.launch_params();
        assert_eq!(params.platform, "ios");
        assert_eq!(params.language_code.as_deref(), Some("de"));
    }

    #[test]
    fn test_mock_provider_rejects_garbage() {
        assert!(StaticLaunchParams::from_mock_json("not json").is_err());
    }
}
