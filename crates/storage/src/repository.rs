use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use study_core::model::AppState;
use thiserror::Error;

use crate::mapping::{decode_state, encode_state};

/// Storage slot the app state blob lives under.
pub const STATE_KEY: &str = "eamStudyState";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// The stored blob exists but cannot be read back as an `AppState`.
    #[error("stored state is corrupt or incompatible: {0}")]
    Deserialization(String),
}

/// Raw key-value slots holding serialized blobs.
#[async_trait]
pub trait BlobRepository: Send + Sync {
    /// Fetch the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be read.
    async fn get_blob(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous blob.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be written.
    async fn put_blob(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the blob under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be written.
    async fn delete_blob(&self, key: &str) -> Result<(), StorageError>;
}

/// Load/save contract for the whole app state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the stored state. `Ok(None)` means nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Deserialization` if a blob exists but is
    /// unreadable, or `StorageError::Connection` for backend failures.
    async fn load_state(&self) -> Result<Option<AppState>, StorageError>;

    /// Overwrite the stored state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be serialized or written.
    async fn save_state(&self, state: &AppState) -> Result<(), StorageError>;

    /// Drop the stored state, e.g. after it failed to deserialize.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` for backend failures.
    async fn clear_state(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobRepository for InMemoryRepository {
    async fn get_blob(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .blobs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put_blob(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .blobs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn delete_blob(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .blobs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// App state persistence over a blob backend, behind a trait object for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub blobs: Arc<dyn BlobRepository>,
    key: String,
}

impl Storage {
    #[must_use]
    pub fn new(blobs: Arc<dyn BlobRepository>) -> Self {
        Self {
            blobs,
            key: STATE_KEY.to_owned(),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRepository::new()))
    }

    /// Use a different storage slot, e.g. one per profile.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl StateStore for Storage {
    async fn load_state(&self) -> Result<Option<AppState>, StorageError> {
        let Some(raw) = self.blobs.get_blob(&self.key).await? else {
            tracing::debug!(key = %self.key, "no stored state");
            return Ok(None);
        };
        let state = decode_state(&raw)?;
        tracing::debug!(key = %self.key, bytes = raw.len(), "loaded state");
        Ok(Some(state))
    }

    async fn save_state(&self, state: &AppState) -> Result<(), StorageError> {
        let raw = encode_state(state)?;
        self.blobs.put_blob(&self.key, &raw).await?;
        tracing::debug!(key = %self.key, bytes = raw.len(), "saved state");
        Ok(())
    }

    async fn clear_state(&self) -> Result<(), StorageError> {
        self.blobs.delete_blob(&self.key).await?;
        tracing::debug!(key = %self.key, "cleared state");
        Ok(())
    }
}
