//! The "save this file for the user" side effect.
//!
//! In a browser this is an object URL and a synthetic anchor click. Here a
//! sink receives the finished bytes under a file name and reports where
//! they ended up.

use crate::store::StoreError;
use std::fmt::Debug;
use std::sync::Mutex;

pub trait DownloadSink: Send + Sync + Debug {
    /// Delivers `bytes` to the user as `filename`. Returns a location
    /// description (a path or URL) for logging.
    fn deliver(&self, filename: &str, mime: &str, bytes: &[u8]) -> Result<String, StoreError>;
}

/// A sink that keeps every delivered file, in order. Used by tests and by
/// embedders that forward the bytes themselves.
#[derive(Debug, Default)]
pub struct InMemoryDownloads {
    delivered: Mutex<Vec<(String, String, Vec<u8>)>>,
}

impl InMemoryDownloads {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(filename, mime, bytes)` for every delivery so far.
    pub fn delivered(&self) -> Vec<(String, String, Vec<u8>)> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

impl DownloadSink for InMemoryDownloads {
    fn deliver(&self, filename: &str, mime: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let mut delivered = self.delivered.lock().map_err(|_| StoreError::Backend {
            key: filename.to_string(),
            message: "download log lock poisoned".to_string(),
        })?;
        delivered.push((filename.to_string(), mime.to_string(), bytes.to_vec()));
        Ok(format!("memory://{filename}"))
    }
}
