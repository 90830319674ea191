//! Persistent auth token storage.
//!
//! The executor reads the token through [`TokenStore`] on every request and
//! removes it when the server rejects the session. Implementations:
//!
//! - [`MemoryTokenStore`] - process-local, for tests and ephemeral sessions
//! - [`KeychainTokenStore`](super::keychain::KeychainTokenStore) - system keychain
//! - `UserStore` in `minigate-store` - JSON file, mirrors the web client's
//!   persisted user state

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::TokenStoreError;

/// Key-value store holding the auth token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Returns the token stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, TokenStoreError>;

    /// Stores `token` under `key`.
    async fn set(&self, key: &str, token: &str) -> Result<(), TokenStoreError>;

    /// Removes the token under `key`. Removing a missing token succeeds.
    async fn remove(&self, key: &str) -> Result<(), TokenStoreError>;
}

/// In-memory [`TokenStore`].
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one token.
    pub fn with_token(key: &str, token: &str) -> Self {
        let store = Self::new();
        if let Ok(mut tokens) = store.tokens.write() {
            tokens.insert(key.to_string(), token.to_string());
        }
        store
    }
}

fn poisoned<E>(_: E) -> TokenStoreError {
    TokenStoreError::Storage("token map lock poisoned".to_string())
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, TokenStoreError> {
        Ok(self.tokens.read().map_err(poisoned)?.get(key).cloned())
    }

    async fn set(&self, key: &str, token: &str) -> Result<(), TokenStoreError> {
        self.tokens
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), token.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), TokenStoreError> {
        self.tokens.write().map_err(poisoned)?.remove(key);
        Ok(())
    }
}
