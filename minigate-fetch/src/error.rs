//! Request pipeline error types.

use serde_json::Value;
use thiserror::Error;

use crate::constants::messages;

// ============================================================================
// Request Error
// ============================================================================

/// Why a request failed at the transport level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFailure {
    /// The request did not complete within the timeout and was aborted.
    Timeout,
    /// DNS, connection, TLS or body transfer failure.
    Transport,
}

/// Classified outcome of a failed request.
///
/// `Clone` because deduplicated requests hand the same failure to every
/// caller that joined the shared call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// Transport failure or timeout.
    #[error("{}", messages::NETWORK_ERROR)]
    Network {
        /// Timeout or transport failure.
        kind: NetworkFailure,
        /// Underlying cause, for logs.
        detail: String,
    },

    /// The server rejected the session (401/403). The token has been
    /// cleared and a session invalidation event emitted.
    #[error("{}", messages::NO_PERMISSION)]
    NoPermission {
        /// HTTP status that triggered the invalidation.
        status: u16,
    },

    /// Non-2xx status other than 401/403.
    #[error("HTTP {status}: {status_text}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase.
        status_text: String,
    },

    /// Transport succeeded but the envelope carries a non-zero code.
    #[error("{message}")]
    Business {
        /// Envelope code, `None` if the server omitted it.
        code: Option<i64>,
        /// Message key from the envelope, or a generic fallback.
        message: String,
        /// Interpolation parameters for the message key.
        params: Option<Value>,
    },

    /// The response body could not be parsed as an envelope.
    #[error("Invalid response body: {0}")]
    Parse(String),

    /// The envelope payload did not match the expected response type.
    #[error("Unexpected response data: {0}")]
    Decode(String),

    /// The target URL is not a valid absolute URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Caller input (params, body) could not be encoded.
    #[error("Invalid request input: {0}")]
    InvalidInput(String),
}

impl RequestError {
    /// Creates a network error for a timed-out request.
    pub fn timeout() -> Self {
        Self::Network {
            kind: NetworkFailure::Timeout,
            detail: "request timed out".to_string(),
        }
    }

    /// Creates a network error for a transport failure.
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Network {
            kind: NetworkFailure::Transport,
            detail: detail.into(),
        }
    }

    /// Returns true for transport failures and timeouts.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Returns true if the request was aborted by the timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Network {
                kind: NetworkFailure::Timeout,
                ..
            }
        )
    }

    /// Returns true if the session was invalidated.
    pub fn is_no_permission(&self) -> bool {
        matches!(self, Self::NoPermission { .. })
    }

    /// Message shown to the user when this error is reported.
    pub fn user_message(&self) -> String {
        if self.is_network() {
            messages::NETWORK_ERROR.to_string()
        } else {
            self.to_string()
        }
    }
}

// ============================================================================
// Transport Error
// ============================================================================

/// Failure raised by a [`Transport`](crate::host::http::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request could not be sent or the response could not be received.
    #[error("Request error: {0}")]
    Request(String),

    /// Response body could not be read.
    #[error("Body error: {0}")]
    Body(String),

    /// Host not in the allowlist.
    #[error("Host not allowed: {0}")]
    HostNotAllowed(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid method or header.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

impl From<TransportError> for RequestError {
    fn from(err: TransportError) -> Self {
        RequestError::transport(err.to_string())
    }
}

// ============================================================================
// Keychain Error
// ============================================================================

/// Error type for keychain-backed token storage.
#[derive(Debug, Error)]
pub enum KeychainError {
    /// Access denied.
    #[error("Access denied to keychain")]
    AccessDenied,

    /// Platform error.
    #[error("Platform error: {0}")]
    Platform(String),

    /// Generic error.
    #[error("Keychain error: {0}")]
    Other(String),
}

impl From<keyring::Error> for KeychainError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(e) => KeychainError::Platform(e.to_string()),
            keyring::Error::NoStorageAccess(_) => KeychainError::AccessDenied,
            _ => KeychainError::Other(err.to_string()),
        }
    }
}

// ============================================================================
// Token Store Error
// ============================================================================

/// Error raised by a [`TokenStore`](crate::host::token::TokenStore).
#[derive(Debug, Error)]
pub enum TokenStoreError {
    /// Keychain failure.
    #[error("Keychain error: {0}")]
    Keychain(#[from] KeychainError),

    /// Backing storage failure (file store, etc.).
    #[error("Storage error: {0}")]
    Storage(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_errors_share_one_message() {
        assert_eq!(RequestError::timeout().to_string(), "Network Error");
        assert_eq!(
            RequestError::transport("dns failure").to_string(),
            "Network Error"
        );
    }

    #[test]
    fn test_timeout_is_distinguishable() {
        assert!(RequestError::timeout().is_timeout());
        assert!(RequestError::timeout().is_network());
        assert!(!RequestError::transport("reset").is_timeout());
    }

    #[test]
    fn test_http_error_message() {
        let err = RequestError::Http {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
        assert_eq!(err.user_message(), "HTTP 500: Internal Server Error");
    }

    #[test]
    fn test_business_error_message() {
        let err = RequestError::Business {
            code: Some(7),
            message: "bad".to_string(),
            params: None,
        };
        assert_eq!(err.to_string(), "bad");
        assert!(!err.is_network());
    }

    #[test]
    fn test_transport_error_converts_to_network() {
        let err: RequestError = TransportError::HostNotAllowed("evil.com".to_string()).into();
        assert!(err.is_network());
        assert!(!err.is_timeout());
    }
}
