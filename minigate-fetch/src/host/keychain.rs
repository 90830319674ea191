//! Token storage in the system keychain.
//!
//! - macOS: Keychain Services
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KDE Wallet)
//!
//! Tokens are stored with service `minigate:<key>` and account `token`.

use async_trait::async_trait;
use keyring::Entry;
use tracing::{debug, warn};

use crate::error::{KeychainError, TokenStoreError};
use crate::host::token::TokenStore;

/// Service name prefix for Minigate credentials.
const SERVICE_PREFIX: &str = "minigate";

/// Account name used for every token entry.
const TOKEN_ACCOUNT: &str = "token";

/// [`TokenStore`] backed by the `keyring` crate.
#[derive(Debug, Clone, Default)]
pub struct KeychainTokenStore;

impl KeychainTokenStore {
    /// Creates a new keychain store.
    pub fn new() -> Self {
        Self
    }

    /// Builds the full service name with prefix.
    fn full_service(key: &str) -> String {
        format!("{SERVICE_PREFIX}:{key}")
    }

    /// Creates a keyring entry.
    fn entry(key: &str) -> Result<Entry, KeychainError> {
        Entry::new(&Self::full_service(key), TOKEN_ACCOUNT)
            .map_err(|e| KeychainError::Platform(e.to_string()))
    }
}

#[async_trait]
impl TokenStore for KeychainTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, TokenStoreError> {
        let entry = Self::entry(key)?;

        match entry.get_password() {
            Ok(token) if !token.is_empty() => {
                debug!(key = %key, "Token found in keychain");
                Ok(Some(token))
            }
            Ok(_) | Err(keyring::Error::NoEntry) => {
                debug!(key = %key, "No token in keychain");
                Ok(None)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read token");
                Err(KeychainError::from(e).into())
            }
        }
    }

    async fn set(&self, key: &str, token: &str) -> Result<(), TokenStoreError> {
        let entry = Self::entry(key)?;
        entry.set_password(token).map_err(|e| {
            warn!(key = %key, error = %e, "Failed to store token");
            KeychainError::from(e)
        })?;
        debug!(key = %key, "Token stored");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), TokenStoreError> {
        let entry = Self::entry(key)?;

        match entry.delete_credential() {
            Ok(()) => {
                debug!(key = %key, "Token deleted");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => {
                debug!(key = %key, "Token not found (already deleted)");
                Ok(())
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to delete token");
                Err(KeychainError::from(e).into())
            }
        }
    }
}
