//! Blob storage for uploaded video files.
//!
//! A blob store maps an opaque stored-file identifier to a seekable byte
//! sequence. The streaming path only ever opens blobs read-only; writes
//! happen exclusively through ingestion.

mod filesystem;
mod memory;

pub use filesystem::FilesystemBlobStore;
pub use memory::MemoryBlobStore;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncSeek};
use vidstream_common::Result;

/// A readable, seekable handle to a stored blob.
pub trait BlobRead: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> BlobRead for T {}

/// Owned reader returned by [`BlobStore::open`].
pub type BlobReader = Box<dyn BlobRead>;

/// Storage backend for video blobs.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Open a blob for random-access reading.
    ///
    /// Fails with `NotFound` when the blob is missing or the identifier does
    /// not resolve inside the store.
    async fn open(&self, stored_id: &str) -> Result<BlobReader>;

    /// Current length of a blob in bytes.
    async fn size(&self, stored_id: &str) -> Result<u64>;

    /// Write a blob from `source`, replacing any existing blob with the same
    /// identifier. Returns the number of bytes written.
    async fn put(&self, stored_id: &str, source: &mut (dyn AsyncRead + Send + Unpin))
        -> Result<u64>;

    /// Remove a blob. Removing a missing blob is not an error.
    async fn delete(&self, stored_id: &str) -> Result<()>;
}
