//! Image sources and the providers that fetch the bytes behind them.
//!
//! A surface names its images by source string. [`ImageSource::parse`] sorts
//! those strings into inline payloads, local paths and remote URLs once, so
//! every provider agrees on what a source means and only decides where local
//! and remote bytes come from.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    #[error("Image source not found: {0}")]
    NotFound(String),

    #[error("Image source '{source_ref}' could not be read: {reason}")]
    Unreadable { source_ref: String, reason: String },

    #[error("Image source '{source_ref}' is malformed: {reason}")]
    Malformed { source_ref: String, reason: String },

    #[error("Remote image source refused: {0}")]
    RemoteRefused(String),

    #[error("Image source escapes the asset root: {0}")]
    OutsideRoot(String),
}

pub type SharedResourceData = Arc<Vec<u8>>;

/// An inline `data:` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineData<'a> {
    pub media_type: &'a str,
    pub base64: bool,
    pub payload: &'a str,
}

impl InlineData<'_> {
    pub fn decode(&self) -> Result<Vec<u8>, String> {
        if self.base64 {
            STANDARD.decode(self.payload.trim()).map_err(|e| e.to_string())
        } else {
            Ok(self.payload.as_bytes().to_vec())
        }
    }
}

/// What an image source string refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource<'a> {
    Inline(InlineData<'a>),
    /// A path on the local disk, from a bare path or a `file:` URI.
    Local(PathBuf),
    Remote(&'a str),
}

impl<'a> ImageSource<'a> {
    pub fn parse(source: &'a str) -> Result<Self, ResourceError> {
        let malformed = |reason: &str| ResourceError::Malformed {
            source_ref: source.to_string(),
            reason: reason.to_string(),
        };
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(malformed("empty source"));
        }

        if let Some(rest) = strip_scheme(trimmed, "data:") {
            let (meta, payload) = rest.split_once(',').ok_or_else(|| malformed("no payload"))?;
            let (media_type, base64) = match meta.strip_suffix(";base64") {
                Some(media_type) => (media_type, true),
                None => (meta, false),
            };
            return Ok(ImageSource::Inline(InlineData {
                media_type,
                base64,
                payload,
            }));
        }

        if let Some(rest) = strip_scheme(trimmed, "file:") {
            let path = match rest.strip_prefix("//") {
                Some(authority_and_path) => {
                    let slash = authority_and_path.find('/').ok_or_else(|| malformed("no path"))?;
                    let (host, path) = authority_and_path.split_at(slash);
                    if !host.is_empty() && !host.eq_ignore_ascii_case("localhost") {
                        return Err(malformed("file URI names another host"));
                    }
                    path
                }
                None => rest,
            };
            return Ok(ImageSource::Local(PathBuf::from(percent_decode(path))));
        }

        if strip_scheme(trimmed, "http:").is_some() || strip_scheme(trimmed, "https:").is_some() {
            return Ok(ImageSource::Remote(trimmed));
        }

        Ok(ImageSource::Local(PathBuf::from(trimmed)))
    }
}

fn strip_scheme<'s>(source: &'s str, scheme: &str) -> Option<&'s str> {
    let head = source.get(..scheme.len())?;
    head.eq_ignore_ascii_case(scheme).then(|| &source[scheme.len()..])
}

fn percent_decode(path: &str) -> String {
    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = (bytes[i] == b'%')
            .then(|| path.get(i + 1..i + 3))
            .flatten()
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        match escaped {
            Some(byte) => {
                out.push(byte);
                i += 3;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Fetches the bytes behind an image source.
///
/// Inline payloads are decoded here for every provider. Implementations
/// supply local reads and, if they allow it, remote fetches.
pub trait ResourceProvider: Send + Sync + Debug {
    fn load(&self, source: &str) -> Result<SharedResourceData, ResourceError> {
        match ImageSource::parse(source)? {
            ImageSource::Inline(inline) => inline.decode().map(Arc::new).map_err(|reason| {
                ResourceError::Malformed {
                    source_ref: source.to_string(),
                    reason,
                }
            }),
            ImageSource::Local(path) => self.read_local(&path),
            ImageSource::Remote(url) => self.fetch_remote(url),
        }
    }

    fn read_local(&self, path: &Path) -> Result<SharedResourceData, ResourceError>;

    fn fetch_remote(&self, url: &str) -> Result<SharedResourceData, ResourceError> {
        Err(ResourceError::RemoteRefused(url.to_string()))
    }

    fn name(&self) -> &'static str;
}

/// Serves images from a fixed map, keyed by path or by remote URL.
#[derive(Debug, Default, Clone)]
pub struct InMemoryResourceProvider {
    entries: HashMap<String, SharedResourceData>,
}

impl InMemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, data: Vec<u8>) -> Self {
        self.entries.insert(key.into(), Arc::new(data));
        self
    }

    fn lookup(&self, key: &str) -> Result<SharedResourceData, ResourceError> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(key.to_string()))
    }
}

impl ResourceProvider for InMemoryResourceProvider {
    fn read_local(&self, path: &Path) -> Result<SharedResourceData, ResourceError> {
        self.lookup(&path.to_string_lossy())
    }

    fn fetch_remote(&self, url: &str) -> Result<SharedResourceData, ResourceError> {
        self.lookup(url)
    }

    fn name(&self) -> &'static str {
        "InMemoryResourceProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_sources_by_kind() {
        assert_eq!(
            ImageSource::parse("images/logo.png").unwrap(),
            ImageSource::Local(PathBuf::from("images/logo.png"))
        );
        assert_eq!(
            ImageSource::parse("file:///srv/shop/my%20logo.png").unwrap(),
            ImageSource::Local(PathBuf::from("/srv/shop/my logo.png"))
        );
        assert_eq!(
            ImageSource::parse("FILE://localhost/srv/logo.png").unwrap(),
            ImageSource::Local(PathBuf::from("/srv/logo.png"))
        );
        assert_eq!(
            ImageSource::parse("https://cdn.example.com/a.png").unwrap(),
            ImageSource::Remote("https://cdn.example.com/a.png")
        );
        assert!(matches!(
            ImageSource::parse("data:image/png;base64,AAAA").unwrap(),
            ImageSource::Inline(InlineData { media_type: "image/png", base64: true, .. })
        ));
    }

    #[test]
    fn rejects_malformed_sources() {
        for bad in ["", "   ", "data:image/png;base64", "file://fileserver/share/logo.png"] {
            assert!(
                matches!(ImageSource::parse(bad), Err(ResourceError::Malformed { .. })),
                "{bad:?} should be malformed"
            );
        }
    }

    #[test]
    fn inline_payloads_load_without_a_lookup() {
        let provider = InMemoryResourceProvider::new();
        let source = format!("data:image/png;base64,{}", STANDARD.encode(b"\x89PNG"));
        assert_eq!(&*provider.load(&source).unwrap(), b"\x89PNG");
        assert_eq!(&*provider.load("data:text/plain,hi").unwrap(), b"hi");
        assert!(matches!(
            provider.load("data:image/png;base64,***"),
            Err(ResourceError::Malformed { .. })
        ));
    }

    #[test]
    fn in_memory_provider_serves_paths_and_urls() {
        let provider = InMemoryResourceProvider::new()
            .with("logo.png", b"local".to_vec())
            .with("https://cdn.example.com/hero.jpg", b"remote".to_vec());

        assert_eq!(&*provider.load("logo.png").unwrap(), b"local");
        assert_eq!(&*provider.load("https://cdn.example.com/hero.jpg").unwrap(), b"remote");
        assert_eq!(
            provider.load("missing.png"),
            Err(ResourceError::NotFound("missing.png".into()))
        );
    }

    #[derive(Debug)]
    struct LocalOnly;

    impl ResourceProvider for LocalOnly {
        fn read_local(&self, _path: &Path) -> Result<SharedResourceData, ResourceError> {
            Ok(Arc::new(Vec::new()))
        }

        fn name(&self) -> &'static str {
            "LocalOnly"
        }
    }

    #[test]
    fn remote_sources_are_refused_by_default() {
        assert_eq!(
            LocalOnly.load("http://cdn.example.com/a.png"),
            Err(ResourceError::RemoteRefused("http://cdn.example.com/a.png".into()))
        );
        assert!(LocalOnly.load("a.png").is_ok());
    }
}
