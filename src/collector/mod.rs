use crate::document::Document;
use crate::errors::CollectError;
use crate::filter::FileFilter;
use async_trait::async_trait;

pub mod directory;
pub mod git;
pub mod remote;

pub use directory::DirectoryCollector;
pub use git::GitCollector;
pub use remote::{RemoteAddress, RemoteCollector};

/// Produces a document from one kind of source. Per-file failures end up
/// inside the document; only fatal failures are returned as errors.
#[async_trait]
pub trait Collector {
    async fn collect(&self, filter: &FileFilter) -> Result<Document, CollectError>;
}
