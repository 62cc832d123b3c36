//! Catalog lookups used by the streaming path.
//!
//! The streaming engine needs only two facts about a video: which blob holds
//! its bytes and what media type to serve them as.

use async_trait::async_trait;
use vidstream_common::{Result, VideoId};
use vidstream_db::pool::{get_conn, DbPool};
use vidstream_db::queries::videos;

/// The part of a catalog record the streaming engine depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub stored_file_id: String,
    pub media_type: String,
}

/// Resolves a video ID to its stored blob.
#[async_trait]
pub trait Catalog: Send + Sync + 'static {
    /// Fails with `NotFound` when no record exists.
    async fn lookup(&self, id: VideoId) -> Result<CatalogEntry>;
}

/// Catalog backed by the SQLite `videos` table.
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: DbPool,
}

impl SqliteCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn lookup(&self, id: VideoId) -> Result<CatalogEntry> {
        let conn = get_conn(&self.pool)?;
        let video = videos::get_video(&conn, id)?;
        Ok(CatalogEntry {
            stored_file_id: video.stored_file_name,
            media_type: video.content_type,
        })
    }
}
