//! Pipeline wiring shared by the network commands.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use minigate_core::{DeviceEnvironment, LaunchParams};
use minigate_fetch::{
    Dispatcher, ErrorReporter, IdentityContext, KeychainTokenStore, ReqwestTransport,
    SessionEvent, TokenStore,
};
use minigate_store::{Settings, SettingsStore, TokenBackend, UserStore};
use tokio::sync::broadcast;
use tracing::debug;

use crate::Cli;

// ============================================================================
// Reporter
// ============================================================================

/// Prints user-facing error reports to stderr.
#[derive(Debug, Clone, Copy)]
pub struct StderrReporter {
    quiet: bool,
}

impl StderrReporter {
    /// Creates a reporter; a quiet reporter prints nothing.
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ErrorReporter for StderrReporter {
    fn report_error(&self, message: &str) {
        if !self.quiet {
            eprintln!("! {message}");
        }
    }
}

// ============================================================================
// Context
// ============================================================================

/// Settings, token store and dispatcher for one CLI invocation.
pub struct Context {
    /// Effective settings, environment overrides applied.
    pub settings: Settings,
    /// Launch parameters the identity was built from.
    pub launch: LaunchParams,
    /// Where the session token lives.
    pub tokens: Arc<dyn TokenStore>,
    /// The request pipeline.
    pub dispatcher: Arc<Dispatcher>,
    session_events: broadcast::Receiver<SessionEvent>,
}

impl Context {
    /// Loads settings and builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the mock launch parameters are malformed or the
    /// HTTP client cannot be created.
    pub async fn load(cli: &Cli) -> Result<Self> {
        let settings = load_settings().await?;
        let launch = launch_params(&settings)?;
        let env = settings.device.environment();
        Self::build(settings, launch, &env, cli.quiet)
    }

    fn build(
        settings: Settings,
        launch: LaunchParams,
        env: &DeviceEnvironment,
        quiet: bool,
    ) -> Result<Self> {
        let tokens = token_store(settings.token_backend);
        let transport = ReqwestTransport::new()
            .context("Failed to create HTTP client")?
            .with_allowed_hosts(settings.allowed_hosts.clone());

        let dispatcher = Dispatcher::builder()
            .base_url(settings.base_url())
            .transport(Arc::new(transport))
            .identity(Arc::new(IdentityContext::new(&launch, env)))
            .tokens(Arc::clone(&tokens))
            .reporter(Arc::new(StderrReporter::new(quiet)))
            .build()?;
        let session_events = dispatcher.session().subscribe();

        debug!(base_url = %dispatcher.base_url(), backend = %settings.token_backend, "Pipeline ready");

        Ok(Self {
            settings,
            launch,
            tokens,
            dispatcher: Arc::new(dispatcher),
            session_events,
        })
    }

    /// Returns the session invalidation observed during this run, if any.
    pub fn session_invalidated(&mut self) -> Option<u16> {
        let mut status = None;
        while let Ok(SessionEvent::Invalidated { status: s }) = self.session_events.try_recv() {
            status = Some(s);
        }
        status
    }

    /// Prints a sign-in hint if the server rejected the session.
    pub fn notify_session(&mut self, quiet: bool) {
        let Some(status) = self.session_invalidated() else {
            return;
        };
        if !quiet {
            eprintln!("Session rejected (HTTP {status}). Run `minigate login` to sign in again.");
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("settings", &self.settings)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// Loads settings from the default path with environment overrides.
///
/// # Errors
///
/// Returns an error if the settings store cannot be opened.
pub async fn load_settings() -> Result<Settings> {
    let store = SettingsStore::load_default().await?;
    let mut settings = store.get().await;
    settings.apply_env_overrides();
    Ok(settings)
}

/// Launch parameters from the configured mock, or empty ones.
///
/// # Errors
///
/// Returns an error if the configured mock is malformed.
pub fn launch_params(settings: &Settings) -> Result<LaunchParams> {
    Ok(settings.launch_params()?.unwrap_or_default())
}

/// Token store for the configured backend.
pub fn token_store(backend: TokenBackend) -> Arc<dyn TokenStore> {
    match backend {
        TokenBackend::File => Arc::new(UserStore::default_location()),
        TokenBackend::Keychain => Arc::new(KeychainTokenStore::new()),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_context_uses_settings_base_url() {
        let settings = Settings {
            api_host: "https://api.example.com".to_string(),
            api_prefix: "/v2".to_string(),
            ..Settings::default()
        };
        let ctx = Context::build(
            settings,
            LaunchParams::new("ios", "8.0"),
            &DeviceEnvironment::default(),
            true,
        )
        .unwrap();

        assert_eq!(ctx.dispatcher.base_url(), "https://api.example.com/v2");
        assert_eq!(ctx.dispatcher.identity().app_version(), "8.0");
    }

    #[tokio::test]
    async fn test_session_invalidation_is_observed() {
        let mut ctx = Context::build(
            Settings::default(),
            LaunchParams::default(),
            &DeviceEnvironment::default(),
            true,
        )
        .unwrap();

        assert_eq!(ctx.session_invalidated(), None);
        ctx.dispatcher
            .session()
            .emit(SessionEvent::Invalidated { status: 401 });
        assert_eq!(ctx.session_invalidated(), Some(401));
        assert_eq!(ctx.session_invalidated(), None);
    }
}
