//! Platform seams for the invoice PDF pipeline.
//!
//! The core never touches the filesystem, a browser or a storage service
//! directly. It talks to these traits, and platform crates provide the
//! implementations.

pub mod download;
pub mod resource;
pub mod store;

pub use download::{DownloadSink, InMemoryDownloads};
pub use resource::{
    ImageSource, InMemoryResourceProvider, InlineData, ResourceError, ResourceProvider,
    SharedResourceData,
};
pub use store::{BlobStore, InMemoryBlobStore, StoreError};
