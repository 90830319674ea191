//! Persisted user state.
//!
//! The user state (token, avatar, name) is stored as `<key>.json` in the
//! data directory, in the same `{"state": ..., "version": 0}` shape the web
//! client keeps in local storage:
//!
//! ```json
//! { "state": { "token": "abc", "avatar": "", "name": "" }, "version": 0 }
//! ```
//!
//! [`UserStore`] also implements [`TokenStore`], so the request pipeline can
//! read and clear the token directly.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use minigate_fetch::{TokenStore, TokenStoreError};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_data_dir, load_json, save_json};

// ============================================================================
// User State
// ============================================================================

/// Persisted fields of the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserState {
    /// Session token, `None` when signed out.
    pub token: Option<String>,
    /// Avatar URL.
    pub avatar: String,
    /// Display name.
    pub name: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Persisted {
    state: UserState,
    version: u32,
}

// ============================================================================
// User Store
// ============================================================================

/// File-backed user state, one file per key.
#[derive(Debug)]
pub struct UserStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl UserStore {
    /// Creates a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a store in the default data directory.
    pub fn default_location() -> Self {
        Self::new(default_data_dir())
    }

    /// Returns the directory state files live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Loads the state under `key`. A missing file is the signed-out state.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self, key: &str) -> Result<UserState, StoreError> {
        match load_json::<Persisted>(&self.path_for(key)).await {
            Ok(persisted) => Ok(persisted.state),
            Err(e) if e.is_not_found() => Ok(UserState::default()),
            Err(e) => Err(e),
        }
    }

    /// Replaces the state under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, key: &str, state: &UserState) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.write(key, state.clone()).await
    }

    async fn write(&self, key: &str, state: UserState) -> Result<(), StoreError> {
        let persisted = Persisted { state, version: 0 };
        save_json(&self.path_for(key), &persisted).await
    }

    async fn modify<F>(&self, key: &str, f: F) -> Result<UserState, StoreError>
    where
        F: FnOnce(&mut UserState),
    {
        let _guard = self.write_lock.lock().await;
        let mut state = self.load(key).await?;
        f(&mut state);
        self.write(key, state.clone()).await?;
        Ok(state)
    }

    /// Stores a new session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be read or written.
    pub async fn set_token(&self, key: &str, token: Option<String>) -> Result<(), StoreError> {
        self.modify(key, |state| state.token = token).await?;
        info!(key = %key, "Token updated");
        Ok(())
    }

    /// Clears the session token, keeping the profile fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be read or written.
    pub async fn clear_token(&self, key: &str) -> Result<(), StoreError> {
        if !self.path_for(key).exists() {
            debug!(key = %key, "No user state to clear");
            return Ok(());
        }
        self.modify(key, |state| state.token = None).await?;
        info!(key = %key, "Token cleared");
        Ok(())
    }

    /// Stores the profile fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be read or written.
    pub async fn set_user_info(
        &self,
        key: &str,
        avatar: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<(), StoreError> {
        let (avatar, name) = (avatar.into(), name.into());
        self.modify(key, |state| {
            state.avatar = avatar;
            state.name = name;
        })
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for UserStore {
    async fn get(&self, key: &str) -> Result<Option<String>, TokenStoreError> {
        let state = self.load(key).await?;
        Ok(state.token.filter(|t| !t.is_empty()))
    }

    async fn set(&self, key: &str, token: &str) -> Result<(), TokenStoreError> {
        Ok(self.set_token(key, Some(token.to_string())).await?)
    }

    async fn remove(&self, key: &str) -> Result<(), TokenStoreError> {
        Ok(self.clear_token(key).await?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "user-store";

    #[tokio::test]
    async fn test_missing_file_is_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::new(dir.path());

        assert_eq!(store.load(KEY).await.unwrap(), UserState::default());
        assert_eq!(TokenStore::get(&store, KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_persisted_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::new(dir.path());

        store.set_token(KEY, Some("abc".to_string())).await.unwrap();
        store.set_user_info(KEY, "https://img/a.png", "Ann").await.unwrap();

        let raw = tokio::fs::read_to_string(store.path_for(KEY)).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "state": {"token": "abc", "avatar": "https://img/a.png", "name": "Ann"},
                "version": 0
            })
        );
    }

    #[tokio::test]
    async fn test_remove_keeps_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::new(dir.path());

        store
            .save(
                KEY,
                &UserState {
                    token: Some("abc".to_string()),
                    avatar: String::new(),
                    name: "Ann".to_string(),
                },
            )
            .await
            .unwrap();

        TokenStore::remove(&store, KEY).await.unwrap();

        let state = store.load(KEY).await.unwrap();
        assert_eq!(state.token, None);
        assert_eq!(state.name, "Ann");
    }

    #[tokio::test]
    async fn test_remove_without_file_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::new(dir.path());

        TokenStore::remove(&store, KEY).await.unwrap();
        assert!(!store.path_for(KEY).exists());
    }

    #[tokio::test]
    async fn test_reads_web_client_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::new(dir.path());
        tokio::fs::write(
            store.path_for(KEY),
            r#"{"state":{"token":"tok","avatar":"","name":""},"version":0}"#,
        )
        .await
        .unwrap();

        assert_eq!(
            TokenStore::get(&store, KEY).await.unwrap().as_deref(),
            Some("tok")
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::new(dir.path());
        tokio::fs::write(store.path_for(KEY), "not json").await.unwrap();

        assert!(TokenStore::get(&store, KEY).await.is_err());
    }
}
