use folio_traits::{DownloadSink, StoreError};
use log::info;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Delivers downloads into a directory, the native stand-in for a browser's
/// download folder.
///
/// The bytes are staged in a temporary file and handed over with a rename.
/// If anything fails before the hand-over, the staged file is removed when
/// it goes out of scope, so no partial download is ever left behind.
#[derive(Debug)]
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectoryDownloads {
    fn deliver(&self, filename: &str, mime: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| StoreError::InvalidKey(filename.to_string()))?;
        let backend = |e: std::io::Error| StoreError::Backend {
            key: filename.to_string(),
            message: e.to_string(),
        };

        fs::create_dir_all(&self.dir).map_err(backend)?;
        let mut staged = NamedTempFile::new_in(&self.dir).map_err(backend)?;
        staged.write_all(bytes).map_err(backend)?;

        let target = self.dir.join(name);
        staged.persist(&target).map_err(|e| backend(e.error))?;

        info!(
            "[TRANSPORT] Delivered {} ({}, {} bytes) to {}.",
            filename,
            mime,
            bytes.len(),
            target.display()
        );
        Ok(target.display().to_string())
    }
}
