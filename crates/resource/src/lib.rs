//! Filesystem-backed implementations of the folio platform traits.
//!
//! ## Available Implementations
//!
//! - [`FilesystemResourceProvider`]: image sources below a base directory
//! - [`FilesystemBlobStore`]: invoice storage with upsert semantics
//! - [`DirectoryDownloads`]: the download side effect, delivered into a directory
//!
//! The in-memory variants from folio-traits are re-exported for convenience.

mod downloads;
mod filesystem;
mod store;

pub use downloads::DirectoryDownloads;
pub use filesystem::FilesystemResourceProvider;
pub use store::FilesystemBlobStore;

pub use folio_traits::{InMemoryBlobStore, InMemoryDownloads, InMemoryResourceProvider};
