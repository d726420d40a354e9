use folio_traits::{BlobStore, StoreError};
use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Stores invoices as plain files below a root directory.
///
/// Writes go to a temporary file in the same directory and are renamed over
/// the target, so readers never observe a half-written PDF and an existing
/// object is replaced atomically.
#[derive(Debug)]
pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| StoreError::Backend {
            key: root.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if valid {
            Ok(self.root.join(key))
        } else {
            Err(StoreError::InvalidKey(key.to_string()))
        }
    }
}

impl BlobStore for FilesystemBlobStore {
    fn upsert(&self, key: &str, content_type: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let target = self.object_path(key)?;
        let backend = |e: std::io::Error| StoreError::Backend {
            key: key.to_string(),
            message: e.to_string(),
        };

        let mut staged = NamedTempFile::new_in(&self.root).map_err(backend)?;
        staged.write_all(bytes).map_err(backend)?;
        staged.flush().map_err(backend)?;
        staged
            .persist(&target)
            .map_err(|e| backend(e.error))?;

        debug!(
            "[STORE] Upserted '{}' ({} bytes, {}).",
            key,
            bytes.len(),
            content_type
        );
        Ok(())
    }

    fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(key)?;
        fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(key.to_string())
            } else {
                StoreError::Backend {
                    key: key.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn exists(&self, key: &str) -> bool {
        self.object_path(key).map(|p| p.is_file()).unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "FilesystemBlobStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn upsert_overwrites_and_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path().join("invoices")).unwrap();

        store
            .upsert("invoice_ORD-1.pdf", "application/pdf", b"%PDF-old")
            .unwrap();
        store
            .upsert("invoice_ORD-1.pdf", "application/pdf", b"%PDF-new")
            .unwrap();

        assert_eq!(store.fetch("invoice_ORD-1.pdf").unwrap(), b"%PDF-new");
        let entries: Vec<_> = fs::read_dir(store.root()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn rejects_keys_that_escape_the_root() {
        let dir = tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path()).unwrap();

        for key in ["../evil.pdf", "a/b.pdf", "", ".hidden"] {
            assert!(matches!(
                store.upsert(key, "application/pdf", b"x"),
                Err(StoreError::InvalidKey(_))
            ));
        }
        assert!(!store.exists("../evil.pdf"));
    }

    #[test]
    fn missing_object_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.fetch("invoice_none.pdf"),
            Err(StoreError::NotFound(_))
        ));
    }
}
