// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Minigate Core
//!
//! Wire types and models shared by the Minigate crates.
//!
//! This crate has no I/O. It defines:
//!
//! - The response envelope every backend endpoint wraps its payload in
//! - Pagination request/response shapes
//! - Launch parameters handed over by the chat platform
//! - The device payload sent in the `x-device` header
//! - Error types
//!
//! ## Key Types
//!
//! ### Wire
//! - [`ResponseEnvelope`] - `{code, data, error, errorParams}` wrapper
//! - [`PaginationRequest`] / [`PaginationResponse`] - paged list shapes
//!
//! ### Identity
//! - [`LaunchParams`] - platform, app version, language, raw init data
//! - [`DeviceEnvironment`] - user agent, screen and locale facts
//! - [`DeviceInfo`] - the serialized device payload

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Identity
    DeviceEnvironment,
    DeviceInfo,
    LaunchParams,
    // Wire
    PaginationRequest,
    PaginationResponse,
    ResponseEnvelope,
    SUCCESS_CODE,
};
