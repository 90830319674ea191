// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Minigate API
//!
//! Typed endpoints of the storefront backend, built on the
//! [`minigate_fetch::Dispatcher`].
//!
//! Responses are partial by nature: every field is optional and every call
//! returns `Option<T>`, `None` when the server sent no payload.
//!
//! ## Modules
//!
//! - [`user`] - login and custodial wallets

pub mod user;

pub use user::UserApi;
