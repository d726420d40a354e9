//! Newtype wrappers for identifiers that travel between the pipeline stages.
//!
//! Keeping order references and resource URIs as distinct types prevents
//! handing an image source to the storage layer or an order reference to
//! the resource loader.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The customer-facing order identifier (e.g. `ORD-1042`).
#[derive(Debug, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderRef(Arc<str>);

impl OrderRef {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// File name offered for a browser-style download: `<orderRef>.pdf`.
    pub fn pdf_filename(&self) -> String {
        format!("{}.pdf", self.file_stem())
    }

    /// Deterministic blob-storage key: `invoice_<orderRef>.pdf`.
    pub fn storage_key(&self) -> String {
        format!("invoice_{}.pdf", self.file_stem())
    }

    fn file_stem(&self) -> String {
        let stem: String = self
            .0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if stem.is_empty() {
            "invoice".to_string()
        } else {
            stem
        }
    }
}

impl From<String> for OrderRef {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for OrderRef {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for OrderRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A URI for a document resource (images embedded in a surface).
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceUri(Arc<str>);

impl ResourceUri {
    pub fn new(uri: impl Into<Arc<str>>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ResourceUri {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for ResourceUri {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for ResourceUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
