//! HTTP transport with tracing and host allowlist.
//!
//! The executor talks to the network through the [`Transport`] trait so the
//! pipeline can be driven by a fake in tests. [`ReqwestTransport`] is the
//! real implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, header};
use tracing::{debug, instrument};
use url::Url;

use crate::error::TransportError;

/// User agent string for Minigate.
const USER_AGENT: &str = concat!("Minigate/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Request / Response
// ============================================================================

/// A fully prepared outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Final header set.
    pub headers: BTreeMap<String, String>,
    /// Encoded body.
    pub body: Option<Vec<u8>>,
}

/// A received response with its body fully read.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase.
    pub status_text: String,
    /// `Content-Type` header value.
    pub content_type: Option<String>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response; the reason phrase is derived from the status.
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        let status_text = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            status_text,
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }

    /// Creates a JSON response.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, Some("application/json"), body.to_string())
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// Sends one request and reads the whole response.
///
/// Dropping the returned future must abort the request; the executor relies
/// on that to enforce its timeout.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request`.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

// ============================================================================
// Reqwest Transport
// ============================================================================

/// [`Transport`] backed by `reqwest`, with an optional host allowlist.
///
/// No client-level timeout is configured; the executor owns the timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: Client,
    allowed_hosts: Option<Vec<String>>,
}

impl ReqwestTransport {
    /// Creates a transport with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            inner: client,
            allowed_hosts: None,
        })
    }

    /// Wraps an existing client.
    pub fn with_client(client: Client) -> Self {
        Self {
            inner: client,
            allowed_hosts: None,
        }
    }

    /// Restricts requests to the given hosts and their subdomains.
    #[must_use]
    pub fn with_allowed_hosts(mut self, hosts: Vec<String>) -> Self {
        self.allowed_hosts = if hosts.is_empty() { None } else { Some(hosts) };
        self
    }

    /// Checks if a URL's host is allowed.
    fn is_host_allowed(&self, url: &str) -> Result<(), TransportError> {
        let Some(ref allowed) = self.allowed_hosts else {
            return Ok(());
        };

        let parsed = Url::parse(url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| TransportError::InvalidUrl("No host in URL".to_string()))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(TransportError::HostNotAllowed(host.to_string()))
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.is_host_allowed(&request.url)?;
        debug!("Sending request");

        let mut builder = self.inner.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(status = %status, "Response received");

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            content_type,
            body: body.to_vec(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
