//! Public request entry point.
//!
//! The dispatcher resolves the per-call switches, builds the final URL,
//! routes eligible GET requests through the [`DedupCache`] and reports
//! failures before handing them back to the caller unchanged.
//!
//! # Reporting
//!
//! - Network errors are always reported, with a generic message.
//! - Every other error is reported only when the call kept `error_toast`.
//! - A deduplicated call reports once, under the switches of the caller that
//!   started the shared request.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use minigate_core::{DeviceEnvironment, LaunchParams};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::cache_key::generate_cache_key;
use crate::clock::{Clock, SystemClock};
use crate::constants::{DEDUPLICATION_WINDOW, REQUEST_TIMEOUT, USER_STORE_KEY, messages};
use crate::dedup::DedupCache;
use crate::error::{RequestError, TransportError};
use crate::executor::{PreparedRequest, RequestExecutor};
use crate::host::http::{ReqwestTransport, Transport};
use crate::host::reporter::{ErrorReporter, TracingReporter};
use crate::host::session::SessionSignal;
use crate::host::token::{MemoryTokenStore, TokenStore};
use crate::identity::IdentityContext;
use crate::options::{RequestConfig, RequestOptions};
use crate::url::{build_url_with_params, resolve_url};

/// Handle stored in the deduplication cache.
pub type SharedResponse = Shared<BoxFuture<'static, Result<Value, RequestError>>>;

// ============================================================================
// Dispatcher
// ============================================================================

/// Routes requests to the executor, coalescing identical GETs.
pub struct Dispatcher {
    base_url: String,
    executor: Arc<RequestExecutor>,
    cache: Arc<DedupCache<SharedResponse>>,
    reporter: Arc<dyn ErrorReporter>,
    session: SessionSignal,
}

impl Dispatcher {
    /// Creates a builder.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Returns the base URL relative paths are appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the session signal 401/403 responses are announced on.
    pub fn session(&self) -> &SessionSignal {
        &self.session
    }

    /// Returns the identity attached to every request.
    pub fn identity(&self) -> &IdentityContext {
        self.executor.identity()
    }

    /// Returns the deduplication cache.
    pub fn cache(&self) -> &DedupCache<SharedResponse> {
        &self.cache
    }

    /// Sends a request and decodes the envelope payload into `T`.
    ///
    /// Returns `Ok(None)` when the payload is null or absent.
    ///
    /// # Errors
    ///
    /// Returns the classified [`RequestError`]; a payload that does not match
    /// `T` is [`RequestError::Decode`].
    pub async fn request<T>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<T>, RequestError>
    where
        T: DeserializeOwned,
    {
        let config = options.config();
        let data = self.request_value(path, options).await?;
        if data.is_null() {
            return Ok(None);
        }

        serde_json::from_value(data).map(Some).map_err(|e| {
            let err = RequestError::Decode(e.to_string());
            report(self.reporter.as_ref(), &err, config);
            err
        })
    }

    /// Sends a request and returns the raw envelope payload.
    ///
    /// # Errors
    ///
    /// Returns the classified [`RequestError`] after reporting it.
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn request_value(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, RequestError> {
        let config = options.config();

        let prepared = match self.prepare(path, options) {
            Ok(prepared) => prepared,
            Err(e) => {
                report(self.reporter.as_ref(), &e, config);
                return Err(e);
            }
        };

        if config.dedup_enabled {
            return self.dispatch_shared(prepared, config).await;
        }

        let result = self.executor.execute(prepared).await;
        if let Err(e) = &result {
            report(self.reporter.as_ref(), e, config);
        }
        result
    }

    fn prepare(&self, path: &str, options: RequestOptions) -> Result<PreparedRequest, RequestError> {
        let mut url = resolve_url(&self.base_url, path)?;
        if let Some(params) = options.params.as_ref().filter(|_| options.is_get()) {
            url = build_url_with_params(&url, params)?;
        }

        Ok(PreparedRequest {
            method: normalize_method(options.method),
            url,
            headers: options.headers,
            body: options.body,
        })
    }

    async fn dispatch_shared(
        &self,
        prepared: PreparedRequest,
        config: RequestConfig,
    ) -> Result<Value, RequestError> {
        self.cache.sweep();

        let key = match generate_cache_key(
            &prepared.method,
            &prepared.url,
            &prepared.headers,
            prepared.body.as_ref(),
        ) {
            Ok(key) => key,
            Err(e) => {
                report(self.reporter.as_ref(), &e, config);
                return Err(e);
            }
        };

        let (handle, joined) = self.cache.join_or_insert(&key, || {
            let executor = Arc::clone(&self.executor);
            let reporter = Arc::clone(&self.reporter);
            async move {
                let result = executor.execute(prepared).await;
                if let Err(e) = &result {
                    report(reporter.as_ref(), e, config);
                }
                result
            }
            .boxed()
            .shared()
        });

        if joined {
            debug!(key = %key, "Sharing in-flight request");
        }
        handle.await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.base_url)
            .field("executor", &self.executor)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

/// Upper-cases the method so `get` goes out as `GET`.
fn normalize_method(method: Method) -> Method {
    let upper = method.as_str().to_ascii_uppercase();
    if upper == method.as_str() {
        return method;
    }
    Method::from_bytes(upper.as_bytes()).unwrap_or(method)
}

/// Applies the reporting rules to one failure.
fn report(reporter: &dyn ErrorReporter, error: &RequestError, config: RequestConfig) {
    if error.is_network() {
        reporter.report_error(messages::NETWORK_ERROR);
    } else if config.toast_enabled {
        reporter.report_error(&error.user_message());
    }
}

// ============================================================================
// Dispatcher Builder
// ============================================================================

/// Builder for constructing a [`Dispatcher`].
pub struct DispatcherBuilder {
    base_url: String,
    transport: Option<Arc<dyn Transport>>,
    identity: Option<Arc<IdentityContext>>,
    tokens: Option<Arc<dyn TokenStore>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
    session: Option<SessionSignal>,
    clock: Option<Arc<dyn Clock>>,
    window: Duration,
    timeout: Duration,
    token_key: String,
}

impl DispatcherBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            base_url: String::new(),
            transport: None,
            identity: None,
            tokens: None,
            reporter: None,
            session: None,
            clock: None,
            window: DEDUPLICATION_WINDOW,
            timeout: REQUEST_TIMEOUT,
            token_key: USER_STORE_KEY.to_string(),
        }
    }

    /// Sets the base URL (API host plus prefix).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the identity context.
    pub fn identity(mut self, identity: Arc<IdentityContext>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Sets the token store.
    pub fn tokens(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Sets the error reporter.
    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Sets the session signal.
    pub fn session(mut self, session: SessionSignal) -> Self {
        self.session = Some(session);
        self
    }

    /// Sets the clock used by the deduplication cache.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the deduplication window.
    pub fn dedup_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the key the token is stored under.
    pub fn token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    /// Builds the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns an error if no transport was set and the default one cannot
    /// be created.
    pub fn build(self) -> Result<Dispatcher, TransportError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };
        let identity = self.identity.unwrap_or_else(|| {
            Arc::new(IdentityContext::new(
                &LaunchParams::default(),
                &DeviceEnvironment::default(),
            ))
        });
        let tokens = self
            .tokens
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));
        let session = self.session.unwrap_or_default();
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let executor = RequestExecutor::new(transport, identity, tokens, session.clone())
            .with_timeout(self.timeout)
            .with_token_key(self.token_key);

        Ok(Dispatcher {
            base_url: self.base_url,
            executor: Arc::new(executor),
            cache: Arc::new(DedupCache::with_clock(self.window, clock)),
            reporter: self.reporter.unwrap_or_else(|| Arc::new(TracingReporter)),
            session,
        })
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let dispatcher = Dispatcher::builder()
            .base_url("https://api.test/api")
            .build()
            .unwrap();

        assert_eq!(dispatcher.base_url(), "https://api.test/api");
        assert_eq!(dispatcher.cache().window(), DEDUPLICATION_WINDOW);
        assert_eq!(dispatcher.executor.timeout(), REQUEST_TIMEOUT);
        assert!(dispatcher.cache().is_empty());
    }

    #[test]
    fn test_method_is_upper_cased() {
        let lower = Method::from_bytes(b"get").unwrap();
        assert_eq!(normalize_method(lower), Method::GET);
        assert_eq!(normalize_method(Method::POST), Method::POST);
        let custom = Method::from_bytes(b"purge").unwrap();
        assert_eq!(normalize_method(custom).as_str(), "PURGE");
    }

    #[test]
    fn test_builder_overrides() {
        let dispatcher = Dispatcher::builder()
            .dedup_window(Duration::from_millis(50))
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        assert_eq!(dispatcher.cache().window(), Duration::from_millis(50));
        assert_eq!(dispatcher.executor.timeout(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_invalid_url_is_reported_under_toast_switch() {
        use std::sync::Mutex;

        #[derive(Default)]
        struct Recorder(Mutex<Vec<String>>);
        impl ErrorReporter for Recorder {
            fn report_error(&self, message: &str) {
                self.0.lock().unwrap().push(message.to_string());
            }
        }

        let recorder = Arc::new(Recorder::default());
        let dispatcher = Dispatcher::builder()
            .base_url("not a url")
            .reporter(recorder.clone())
            .build()
            .unwrap();

        let err = dispatcher
            .request_value("/x", RequestOptions::get())
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidUrl(_)));
        assert_eq!(recorder.0.lock().unwrap().len(), 1);

        dispatcher
            .request_value("/x", RequestOptions::get().error_toast(false))
            .await
            .unwrap_err();
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }
}
