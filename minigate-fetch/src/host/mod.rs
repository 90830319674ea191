//! Host collaborators of the request pipeline.
//!
//! - [`http`] - HTTP transport with tracing and host allowlist
//! - [`token`] - Auth token storage
//! - [`keychain`] - Token storage in the system keychain
//! - [`reporter`] - User-facing error reporting
//! - [`session`] - Session invalidation events
//! - [`launch`] - Platform launch parameters

pub mod http;
pub mod keychain;
pub mod launch;
pub mod reporter;
pub mod session;
pub mod token;

// Re-export key types
pub use http::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use keychain::KeychainTokenStore;
pub use launch::{LaunchParamsProvider, StaticLaunchParams};
pub use reporter::{ErrorReporter, SilentReporter, TracingReporter};
pub use session::{SessionEvent, SessionSignal};
pub use token::{MemoryTokenStore, TokenStore};
