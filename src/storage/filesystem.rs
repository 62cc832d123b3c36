//! Blob store backed by a directory on the local filesystem.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncWriteExt};
use vidstream_common::{Error, Result};

use super::{BlobReader, BlobStore};

/// Stores each blob as a file under a fixed root directory.
///
/// The root is canonicalised once at construction and owned by the instance.
/// Every identifier must resolve to a path inside that root; anything that
/// would escape it (absolute paths, `..` segments, symlinks pointing outside)
/// is reported as `NotFound` so callers learn nothing about the filesystem.
#[derive(Debug, Clone)]
pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    /// Create the store, creating `root` if it does not exist yet.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        let root = fs::canonicalize(&root).await?;
        tracing::debug!(root = %root.display(), "Blob store ready");
        Ok(Self { root })
    }

    /// The canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lexically join an identifier onto the root.
    fn resolve(&self, stored_id: &str) -> Result<PathBuf> {
        let relative = Path::new(stored_id);
        let only_normal = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));

        if stored_id.is_empty() || !only_normal {
            tracing::warn!(stored_id, "Rejected blob identifier outside storage root");
            return Err(not_found(stored_id));
        }

        Ok(self.root.join(relative))
    }

    /// Resolve an identifier to an existing regular file inside the root,
    /// following symlinks.
    async fn resolve_existing(&self, stored_id: &str) -> Result<PathBuf> {
        let path = self.resolve(stored_id)?;
        let canonical = fs::canonicalize(&path)
            .await
            .map_err(|e| io_error(stored_id, e))?;

        if !canonical.starts_with(&self.root) {
            tracing::warn!(stored_id, "Blob resolves outside storage root");
            return Err(not_found(stored_id));
        }

        let metadata = fs::metadata(&canonical)
            .await
            .map_err(|e| io_error(stored_id, e))?;
        if !metadata.is_file() {
            return Err(not_found(stored_id));
        }

        Ok(canonical)
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn open(&self, stored_id: &str) -> Result<BlobReader> {
        let path = self.resolve_existing(stored_id).await?;
        let file = File::open(&path)
            .await
            .map_err(|e| io_error(stored_id, e))?;
        Ok(Box::new(file))
    }

    async fn size(&self, stored_id: &str) -> Result<u64> {
        let path = self.resolve_existing(stored_id).await?;
        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| io_error(stored_id, e))?;
        Ok(metadata.len())
    }

    async fn put(
        &self,
        stored_id: &str,
        source: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<u64> {
        let path = self.resolve(stored_id)?;
        let parent = path.parent().unwrap_or(&self.root).to_path_buf();
        fs::create_dir_all(&parent).await?;
        if !fs::canonicalize(&parent).await?.starts_with(&self.root) {
            return Err(not_found(stored_id));
        }

        // Write beside the target and rename, so readers never observe a
        // half-written blob.
        let partial = parent.join(format!(".{}.partial", uuid::Uuid::new_v4()));
        let written = match write_file(&partial, source).await {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&partial).await;
                return Err(e.into());
            }
        };

        if let Err(e) = fs::rename(&partial, &path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(e.into());
        }

        tracing::debug!(stored_id, bytes = written, "Stored blob");
        Ok(written)
    }

    async fn delete(&self, stored_id: &str) -> Result<()> {
        let path = self.resolve(stored_id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_file(
    path: &Path,
    source: &mut (dyn AsyncRead + Send + Unpin),
) -> std::io::Result<u64> {
    let mut file = File::create(path).await?;
    let written = tokio::io::copy(source, &mut file).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

fn not_found(stored_id: &str) -> Error {
    Error::not_found(format!("blob {stored_id}"))
}

fn io_error(stored_id: &str, err: std::io::Error) -> Error {
    if err.kind() == ErrorKind::NotFound {
        not_found(stored_id)
    } else {
        Error::Io(err)
    }
}
