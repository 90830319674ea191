// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Minigate Fetch
//!
//! The client-side request pipeline for the Minigate backend.
//!
//! ## Pipeline
//!
//! Leaf first:
//!
//! - [`identity`] - device and locale metadata, rendered as request headers
//! - [`url`] - base URL resolution and query parameter merging
//! - [`cache_key`] - deterministic keys for identical requests
//! - [`dedup`] - short-window coalescing of identical GET requests
//! - [`executor`] - one network call with timeout and outcome classification
//! - [`dispatcher`] - the public `request` entry point with error reporting
//!
//! ## Host APIs
//!
//! The [`host`] module holds the collaborators the pipeline talks to:
//!
//! - [`host::http`] - HTTP transport with tracing and host allowlist
//! - [`host::token`] / [`host::keychain`] - auth token storage
//! - [`host::reporter`] - user-facing error reports
//! - [`host::session`] - session invalidation events
//! - [`host::launch`] - platform launch parameters
//!
//! ## Example
//!
//! ```ignore
//! use minigate_fetch::{Dispatcher, RequestOptions, Params};
//!
//! let dispatcher = Dispatcher::builder()
//!     .base_url("https://api.example.com/api")
//!     .build()?;
//!
//! let wallets: Option<WalletList> = dispatcher
//!     .request(
//!         "/private/user/wallet/list",
//!         RequestOptions::get().params(Params::new().with("chain", "sol")),
//!     )
//!     .await?;
//! ```

// Core modules
pub mod cache_key;
pub mod clock;
pub mod constants;
pub mod dedup;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod host;
pub mod identity;
pub mod options;
pub mod url;

// Re-export key types at crate root

// Errors
pub use error::{KeychainError, NetworkFailure, RequestError, TokenStoreError, TransportError};

// Host APIs
pub use host::{
    http::{HttpRequest, HttpResponse, ReqwestTransport, Transport},
    keychain::KeychainTokenStore,
    launch::{LaunchParamsProvider, StaticLaunchParams},
    reporter::{ErrorReporter, SilentReporter, TracingReporter},
    session::{SessionEvent, SessionSignal},
    token::{MemoryTokenStore, TokenStore},
};

// Pipeline
pub use cache_key::generate_cache_key;
pub use clock::{Clock, ManualClock, SystemClock};
pub use dedup::DedupCache;
pub use dispatcher::{Dispatcher, DispatcherBuilder, SharedResponse};
pub use executor::{PreparedRequest, RequestExecutor};
pub use identity::{IdentityContext, UserAgentInfo, parse_user_agent};
pub use options::{ParamValue, Params, RequestConfig, RequestOptions};
pub use url::{build_url_with_params, resolve_url};

// HTTP method type used by `RequestOptions`
pub use reqwest::Method;
