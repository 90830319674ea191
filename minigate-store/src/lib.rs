// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Minigate Store
//!
//! Local state for the Minigate client.
//!
//! This crate provides:
//!
//! - **SettingsStore**: API location, device facts, backends and log level,
//!   persisted as JSON
//! - **UserStore**: the signed-in user's token and profile, which also
//!   serves as the pipeline's token store
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use minigate_store::{SettingsStore, UserStore};
//!
//! let settings = SettingsStore::load_default().await?;
//! let users = UserStore::default_location();
//!
//! settings.set_api_host("https://api.example.com").await;
//! settings.save().await?;
//! ```

pub mod error;
pub mod persistence;
pub mod settings_store;
pub mod user_store;

pub use error::StoreError;
pub use persistence::{
    default_config_dir, default_data_dir, default_settings_path, ensure_dir, load_json,
    load_json_or_default, save_json,
};
pub use settings_store::{DeviceSettings, LogLevel, Settings, SettingsStore, TokenBackend};
pub use user_store::{UserState, UserStore};

#[cfg(test)]
mod persistence_tests;
