//! In-process blob store, used by tests and ephemeral deployments.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};
use vidstream_common::{Error, Result};

use super::{BlobReader, BlobStore};

/// Keeps every blob in memory as shared [`Bytes`].
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Bytes>>,
}

impl MemoryBlobStore {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Bytes>>> {
        self.blobs
            .lock()
            .map_err(|_| Error::internal("blob store lock poisoned"))
    }

    fn get(&self, stored_id: &str) -> Result<Bytes> {
        self.lock()?
            .get(stored_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("blob {stored_id}")))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn open(&self, stored_id: &str) -> Result<BlobReader> {
        Ok(Box::new(Cursor::new(self.get(stored_id)?)))
    }

    async fn size(&self, stored_id: &str) -> Result<u64> {
        Ok(self.get(stored_id)?.len() as u64)
    }

    async fn put(
        &self,
        stored_id: &str,
        source: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<u64> {
        let mut buf = Vec::new();
        source.read_to_end(&mut buf).await?;
        let written = buf.len() as u64;
        self.lock()?.insert(stored_id.to_string(), Bytes::from(buf));
        Ok(written)
    }

    async fn delete(&self, stored_id: &str) -> Result<()> {
        self.lock()?.remove(stored_id);
        Ok(())
    }
}
