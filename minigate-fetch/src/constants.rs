//! Fixed pipeline constants.

use std::time::Duration;

/// Window during which identical GET requests share one in-flight call.
pub const DEDUPLICATION_WINDOW: Duration = Duration::from_millis(300);

/// Time after which an in-flight request is aborted.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Business code signalling success.
pub const SUCCESS_CODE: i64 = minigate_core::SUCCESS_CODE;

/// HTTP status codes that invalidate the session.
pub mod http_status {
    /// Unauthorized.
    pub const UNAUTHORIZED: u16 = 401;
    /// Forbidden.
    pub const FORBIDDEN: u16 = 403;
}

/// Default header values.
pub mod defaults {
    /// Content type sent with every request and the only one parsed explicitly.
    pub const CONTENT_TYPE: &str = "application/json";
    /// Value of the `client-type` header.
    pub const CLIENT_TYPE: &str = "TELEGRAM_WEBAPP";
    /// Value of the `x-bid` header.
    pub const X_BID_VALUE: &str = "1";
}

/// Header names attached by the executor.
pub mod headers {
    /// Content type.
    pub const CONTENT_TYPE: &str = "Content-Type";
    /// Client type.
    pub const CLIENT_TYPE: &str = "client-type";
    /// Auth token read from the token store.
    pub const AUTH_TOKEN: &str = "auth-token";
    /// Business id.
    pub const X_BID: &str = "x-bid";
    /// JSON-encoded device payload.
    pub const X_DEVICE: &str = "x-device";
    /// User language.
    pub const LANG: &str = "lang";
    /// Platform app version.
    pub const VERSION_CODE: &str = "version-code";
}

/// User-facing error messages.
pub mod messages {
    /// Shown for 401/403 responses.
    pub const NO_PERMISSION: &str = "No Permission";
    /// Shown for business failures without a message.
    pub const UNKNOWN_ERROR: &str = "Unknown Error";
    /// Shown for any transport failure or timeout.
    pub const NETWORK_ERROR: &str = "Network Error";
}

/// Key under which the user state (and its token) is persisted.
pub const USER_STORE_KEY: &str = "user-store";
