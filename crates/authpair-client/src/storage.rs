//! Token storage
//!
//! The access token lives only in process memory. The refresh token goes to
//! a `RefreshTokenStore`, which is durable for `FileRefreshTokenStore`.

use crate::error::Result;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Volatile holder for the current access token
#[derive(Debug, Default)]
pub struct AccessTokenCell {
    token: RwLock<Option<String>>,
}

impl AccessTokenCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn set(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn clear(&self) {
        *self.token.write().await = None;
    }
}

/// Persistence for the refresh token
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>>;
    async fn save(&self, token: &str) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// Refresh token kept in memory (tests, short-lived processes)
#[derive(Debug, Default)]
pub struct MemoryRefreshTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.token.read().await.clone())
    }

    async fn save(&self, token: &str) -> Result<()> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.token.write().await = None;
        Ok(())
    }
}

/// Refresh token kept in a file, surviving process restarts
#[derive(Debug, Clone)]
pub struct FileRefreshTokenStore {
    path: PathBuf,
}

impl FileRefreshTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.authpair/refresh_token`, if a home directory is known
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".authpair").join("refresh_token"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RefreshTokenStore for FileRefreshTokenStore {
    async fn load(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, token).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        tracing::debug!(path = %self.path.display(), "Saved refresh token");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_access_token_cell() {
        let cell = AccessTokenCell::new();
        assert!(cell.get().await.is_none());

        cell.set("abc").await;
        assert_eq!(cell.get().await.as_deref(), Some("abc"));

        cell.clear().await;
        assert!(cell.get().await.is_none());
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryRefreshTokenStore::new();
        assert!(store.load().await.unwrap().is_none());

        store.save("r1").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("r1"));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("refresh_token");

        FileRefreshTokenStore::new(&path).save("r1").await.unwrap();

        let reopened = FileRefreshTokenStore::new(&path);
        assert_eq!(reopened.load().await.unwrap().as_deref(), Some("r1"));

        reopened.clear().await.unwrap();
        assert!(reopened.load().await.unwrap().is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRefreshTokenStore::new(dir.path().join("absent"));

        assert!(store.load().await.unwrap().is_none());
        // Clearing twice is fine
        store.clear().await.unwrap();
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_ignores_blank_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refresh_token");
        std::fs::write(&path, "  \n").unwrap();

        assert!(FileRefreshTokenStore::new(&path).load().await.unwrap().is_none());
    }
}
