//! Image sources read from disk, confined to an asset root.

use folio_traits::{ResourceError, ResourceProvider, SharedResourceData};
use log::debug;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Reads local image sources below one asset root.
///
/// Relative sources resolve against the root. `file:` URIs must point
/// inside it. `..` segments are folded lexically and may not climb above
/// the root, and a symlink that leads outside it is refused too. Remote
/// sources are refused.
#[derive(Debug, Clone)]
pub struct FilesystemResourceProvider {
    root: PathBuf,
}

impl FilesystemResourceProvider {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
        Self { root }
    }

    /// A provider rooted at the directory holding `document`, so a surface
    /// description can name its images relative to itself.
    pub fn for_document(document: impl AsRef<Path>) -> Self {
        match document.as_ref().parent() {
            Some(dir) if !dir.as_os_str().is_empty() => Self::new(dir),
            _ => Self::new("."),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn confine(&self, path: &Path) -> Result<PathBuf, ResourceError> {
        let outside = || ResourceError::OutsideRoot(path.display().to_string());
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.root).map_err(|_| outside())?
        } else {
            path
        };

        let mut resolved = self.root.clone();
        let mut depth = 0usize;
        for component in relative.components() {
            match component {
                Component::Normal(segment) => {
                    resolved.push(segment);
                    depth += 1;
                }
                Component::CurDir => {}
                Component::ParentDir if depth > 0 => {
                    resolved.pop();
                    depth -= 1;
                }
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(outside());
                }
            }
        }

        // Symlinks are only visible once the file exists.
        if let (Ok(real), Ok(real_root)) = (resolved.canonicalize(), self.root.canonicalize())
            && !real.starts_with(&real_root)
        {
            return Err(outside());
        }
        Ok(resolved)
    }
}

impl ResourceProvider for FilesystemResourceProvider {
    fn read_local(&self, path: &Path) -> Result<SharedResourceData, ResourceError> {
        let resolved = self.confine(path)?;
        debug!("Reading image source {}", resolved.display());
        std::fs::read(&resolved).map(Arc::new).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ResourceError::NotFound(path.display().to_string()),
            _ => ResourceError::Unreadable {
                source_ref: path.display().to_string(),
                reason: e.to_string(),
            },
        })
    }

    fn name(&self) -> &'static str {
        "FilesystemResourceProvider"
    }
}
