//! Blob storage for finished invoices.
//!
//! Keys are deterministic (`invoice_<orderRef>.pdf`) and writes are upserts:
//! storing under an existing key replaces the previous object.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Storage backend failure for '{key}': {message}")]
    Backend { key: String, message: String },
}

pub trait BlobStore: Send + Sync + Debug {
    /// Writes `bytes` under `key`, replacing any existing object.
    fn upsert(&self, key: &str, content_type: &str, bytes: &[u8]) -> Result<(), StoreError>;

    fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    fn exists(&self, key: &str) -> bool;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    objects: RwLock<HashMap<String, (String, Vec<u8>)>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .ok()?
            .get(key)
            .map(|(content_type, _)| content_type.clone())
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for InMemoryBlobStore {
    fn upsert(&self, key: &str, content_type: &str, bytes: &[u8]) -> Result<(), StoreError> {
        if key.trim().is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let mut objects = self.objects.write().map_err(|_| StoreError::Backend {
            key: key.to_string(),
            message: "store lock poisoned".to_string(),
        })?;
        objects.insert(key.to_string(), (content_type.to_string(), bytes.to_vec()));
        Ok(())
    }

    fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let objects = self.objects.read().map_err(|_| StoreError::Backend {
            key: key.to_string(),
            message: "store lock poisoned".to_string(),
        })?;
        objects
            .get(key)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn exists(&self, key: &str) -> bool {
        self.objects
            .read()
            .map(|o| o.contains_key(key))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "InMemoryBlobStore"
    }
}
