//! Single network call with timeout and outcome classification.
//!
//! The executor performs exactly one attempt. It never retries and never
//! recovers locally: every failure comes back as a classified
//! [`RequestError`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use minigate_core::ResponseEnvelope;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::constants::{REQUEST_TIMEOUT, USER_STORE_KEY, defaults, http_status, messages};
use crate::error::RequestError;
use crate::host::http::{HttpRequest, HttpResponse, Transport};
use crate::host::session::{SessionEvent, SessionSignal};
use crate::host::token::TokenStore;
use crate::identity::IdentityContext;

// ============================================================================
// Prepared Request
// ============================================================================

/// A request with its final URL, ready for the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL including query string.
    pub url: String,
    /// Caller headers; they override the identity headers.
    pub headers: BTreeMap<String, String>,
    /// JSON body.
    pub body: Option<Value>,
}

// ============================================================================
// Executor
// ============================================================================

/// Performs one request against the backend and classifies the outcome.
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    identity: Arc<IdentityContext>,
    tokens: Arc<dyn TokenStore>,
    session: SessionSignal,
    timeout: Duration,
    token_key: String,
}

impl RequestExecutor {
    /// Creates an executor with the default timeout and token key.
    pub fn new(
        transport: Arc<dyn Transport>,
        identity: Arc<IdentityContext>,
        tokens: Arc<dyn TokenStore>,
        session: SessionSignal,
    ) -> Self {
        Self {
            transport,
            identity,
            tokens,
            session,
            timeout: REQUEST_TIMEOUT,
            token_key: USER_STORE_KEY.to_string(),
        }
    }

    /// Overrides the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the key the token is stored under.
    #[must_use]
    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the identity attached to every request.
    pub fn identity(&self) -> &IdentityContext {
        &self.identity
    }

    /// Executes `request` and returns the envelope's `data` on success.
    ///
    /// # Errors
    ///
    /// - [`RequestError::Network`] on timeout or transport failure
    /// - [`RequestError::NoPermission`] on 401/403, after clearing the token
    ///   and emitting [`SessionEvent::Invalidated`]
    /// - [`RequestError::Http`] on any other non-2xx status
    /// - [`RequestError::Parse`] if the body is not an envelope
    /// - [`RequestError::Business`] if the envelope code is not success
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn execute(&self, request: PreparedRequest) -> Result<Value, RequestError> {
        let token = self.read_token().await;
        let headers = merge_headers(self.identity.headers(token.as_deref()), request.headers);

        let body = request
            .body
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| RequestError::InvalidInput(e.to_string()))?;

        let http_request = HttpRequest {
            method: request.method,
            url: request.url,
            headers,
            body,
        };

        let response =
            match tokio::time::timeout(self.timeout, self.transport.send(http_request)).await {
                Err(_) => {
                    warn!(timeout = ?self.timeout, "Request timed out");
                    return Err(RequestError::timeout());
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "Transport failure");
                    return Err(e.into());
                }
                Ok(Ok(response)) => response,
            };

        debug!(status = response.status, "Response received");
        self.classify(response).await
    }

    async fn read_token(&self) -> Option<String> {
        match self.tokens.get(&self.token_key).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read auth token");
                None
            }
        }
    }

    async fn classify(&self, response: HttpResponse) -> Result<Value, RequestError> {
        let status = response.status;

        if status == http_status::UNAUTHORIZED || status == http_status::FORBIDDEN {
            self.invalidate_session(status).await;
            return Err(RequestError::NoPermission { status });
        }

        if !response.is_success() {
            return Err(RequestError::Http {
                status,
                status_text: response.status_text,
            });
        }

        let envelope = parse_envelope(&response)?;
        if envelope.is_success() {
            return Ok(envelope.data);
        }

        let message = envelope
            .error_message()
            .unwrap_or(messages::UNKNOWN_ERROR)
            .to_string();
        debug!(code = ?envelope.code, message = %message, "Business failure");

        Err(RequestError::Business {
            code: envelope.code,
            message,
            params: envelope.error_params,
        })
    }

    async fn invalidate_session(&self, status: u16) {
        warn!(status, "Session rejected by server, clearing token");
        if let Err(e) = self.tokens.remove(&self.token_key).await {
            warn!(error = %e, "Failed to remove auth token");
        }
        self.session.emit(SessionEvent::Invalidated { status });
    }
}

/// Overlays caller headers on the identity headers. Names compare
/// case-insensitively, so `content-type` replaces `Content-Type`.
fn merge_headers(
    mut base: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    for (name, value) in overrides {
        base.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        base.insert(name, value);
    }
    base
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("timeout", &self.timeout)
            .field("token_key", &self.token_key)
            .finish_non_exhaustive()
    }
}

/// Parses the body as a response envelope.
///
/// Only JSON is supported. Other content types are parsed as JSON too, so
/// binary payloads fail with [`RequestError::Parse`].
fn parse_envelope(response: &HttpResponse) -> Result<ResponseEnvelope, RequestError> {
    let is_json = response
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.contains(defaults::CONTENT_TYPE));
    if !is_json {
        debug!(content_type = ?response.content_type, "Non-JSON content type, parsing as JSON");
    }

    ResponseEnvelope::from_slice(&response.body).map_err(|e| RequestError::Parse(e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use minigate_core::{DeviceEnvironment, LaunchParams};
    use serde_json::json;

    use super::*;
    use crate::error::TransportError;
    use crate::host::token::MemoryTokenStore;

    /// Replies with a fixed response and records the last request.
    struct FixedTransport {
        response: HttpResponse,
        last: Mutex<Option<HttpRequest>>,
    }

    impl FixedTransport {
        fn new(response: HttpResponse) -> Arc<Self> {
            Arc::new(Self {
                response,
                last: Mutex::new(None),
            })
        }

        fn last(&self) -> HttpRequest {
            self.last.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            *self.last.lock().unwrap() = Some(request);
            Ok(self.response.clone())
        }
    }

    fn identity() -> Arc<IdentityContext> {
        Arc::new(IdentityContext::new(
            &LaunchParams::new("android", "7.2").with_language("en"),
            &DeviceEnvironment::default(),
        ))
    }

    fn executor(transport: Arc<FixedTransport>, tokens: Arc<MemoryTokenStore>) -> RequestExecutor {
        RequestExecutor::new(transport, identity(), tokens, SessionSignal::new())
    }

    fn get(url: &str) -> PreparedRequest {
        PreparedRequest {
            method: Method::GET,
            url: url.to_string(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_success_returns_data() {
        let transport = FixedTransport::new(HttpResponse::json(
            200,
            &json!({"code": 0, "data": {"a": 1}}),
        ));
        let exec = executor(transport, Arc::new(MemoryTokenStore::new()));
        let data = exec.execute(get("https://api.test/x")).await.unwrap();
        assert_eq!(data, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_caller_headers_override_identity() {
        let transport = FixedTransport::new(HttpResponse::json(200, &json!({"code": 0})));
        let tokens = Arc::new(MemoryTokenStore::with_token(USER_STORE_KEY, "tok"));
        let exec = executor(transport.clone(), tokens);

        let mut request = get("https://api.test/x");
        request.headers.insert("lang".to_string(), "fr".to_string());
        exec.execute(request).await.unwrap();

        let sent = transport.last();
        assert_eq!(sent.headers["lang"], "fr");
        assert_eq!(sent.headers["auth-token"], "tok");
        assert_eq!(sent.headers["client-type"], "TELEGRAM_WEBAPP");
    }

    #[tokio::test]
    async fn test_header_override_ignores_case() {
        let transport = FixedTransport::new(HttpResponse::json(200, &json!({"code": 0})));
        let exec = executor(transport.clone(), Arc::new(MemoryTokenStore::new()));

        let mut request = get("https://api.test/x");
        request
            .headers
            .insert("content-type".to_string(), "text/plain".to_string());
        exec.execute(request).await.unwrap();

        let sent = transport.last();
        assert_eq!(sent.headers["content-type"], "text/plain");
        assert!(!sent.headers.contains_key("Content-Type"));
        assert_eq!(
            sent.headers
                .keys()
                .filter(|k| k.eq_ignore_ascii_case("content-type"))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_body_is_json_encoded() {
        let transport = FixedTransport::new(HttpResponse::json(200, &json!({"code": 0})));
        let exec = executor(transport.clone(), Arc::new(MemoryTokenStore::new()));

        let request = PreparedRequest {
            method: Method::POST,
            body: Some(json!({"chain": "sol"})),
            ..get("https://api.test/x")
        };
        exec.execute(request).await.unwrap();

        assert_eq!(transport.last().body.unwrap(), br#"{"chain":"sol"}"#.to_vec());
    }

    #[tokio::test]
    async fn test_business_failure_with_fallback_message() {
        let transport = FixedTransport::new(HttpResponse::json(200, &json!({"code": 1001})));
        let exec = executor(transport, Arc::new(MemoryTokenStore::new()));

        let err = exec.execute(get("https://api.test/x")).await.unwrap_err();
        assert_eq!(
            err,
            RequestError::Business {
                code: Some(1001),
                message: "Unknown Error".to_string(),
                params: None,
            }
        );
    }

    #[tokio::test]
    async fn test_http_failure() {
        let transport = FixedTransport::new(HttpResponse::new(502, Some("text/html"), "oops"));
        let exec = executor(transport, Arc::new(MemoryTokenStore::new()));

        let err = exec.execute(get("https://api.test/x")).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
    }

    #[tokio::test]
    async fn test_forbidden_clears_token_and_signals() {
        let transport = FixedTransport::new(HttpResponse::new(403, None, ""));
        let tokens = Arc::new(MemoryTokenStore::with_token(USER_STORE_KEY, "tok"));
        let session = SessionSignal::new();
        let mut events = session.subscribe();
        let exec = RequestExecutor::new(transport, identity(), tokens.clone(), session);

        let err = exec.execute(get("https://api.test/x")).await.unwrap_err();
        assert_eq!(err, RequestError::NoPermission { status: 403 });
        assert_eq!(tokens.get(USER_STORE_KEY).await.unwrap(), None);
        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent::Invalidated { status: 403 }
        );
    }

    #[tokio::test]
    async fn test_unparseable_body() {
        let transport = FixedTransport::new(HttpResponse::new(200, Some("text/plain"), "hello"));
        let exec = executor(transport, Arc::new(MemoryTokenStore::new()));

        let err = exec.execute(get("https://api.test/x")).await.unwrap_err();
        assert!(matches!(err, RequestError::Parse(_)));
    }

    #[tokio::test]
    async fn test_non_json_content_type_still_parsed() {
        let body = json!({"code": 0, "data": 5}).to_string();
        let transport = FixedTransport::new(HttpResponse::new(200, Some("text/plain"), body));
        let exec = executor(transport, Arc::new(MemoryTokenStore::new()));

        assert_eq!(exec.execute(get("https://api.test/x")).await.unwrap(), json!(5));
    }
}
