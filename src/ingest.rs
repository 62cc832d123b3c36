//! Upload ingestion.
//!
//! An upload is stored in two steps: the body is validated against the
//! format allow-list and written to the blob store under a generated name,
//! then the catalog record is created. A failed record insert removes the
//! blob again so no orphaned files accumulate.

use tokio::io::AsyncRead;
use vidstream_common::paths::stored_file_name;
use vidstream_common::{Error, Result, VideoFormat, VideoId};
use vidstream_db::models::{NewVideo, Video};
use vidstream_db::pool::{get_conn, DbPool};
use vidstream_db::queries::videos;

use crate::storage::BlobStore;

/// File name used when the client does not send one.
const DEFAULT_FILE_NAME: &str = "upload";

/// A blob that has been written but not yet catalogued.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub id: VideoId,
    pub file_name: String,
    pub stored_file_name: String,
    pub format: VideoFormat,
    pub file_size: u64,
}

/// Validate the declared content type and write the body to the blob store.
///
/// Rejects anything outside the allow-list before a single byte is stored.
pub async fn store_upload(
    blobs: &dyn BlobStore,
    file_name: Option<&str>,
    content_type: &str,
    reader: &mut (dyn AsyncRead + Send + Unpin),
) -> Result<StoredUpload> {
    let format = VideoFormat::from_mime(content_type).ok_or_else(|| {
        Error::unsupported_media_type(format!(
            "{content_type:?} is not an accepted video type (expected one of {})",
            VideoFormat::allowed_list()
        ))
    })?;

    let file_name = file_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_FILE_NAME)
        .to_string();

    let id = VideoId::new();
    let stored = stored_file_name(id, &file_name);
    let file_size = blobs.put(&stored, reader).await?;

    tracing::debug!(%id, stored = %stored, bytes = file_size, "Stored upload");

    Ok(StoredUpload {
        id,
        file_name,
        stored_file_name: stored,
        format,
        file_size,
    })
}

/// Create the catalog record for a stored upload.
///
/// On any failure the blob is deleted before the error is returned.
pub async fn record_upload(
    db: &DbPool,
    blobs: &dyn BlobStore,
    upload: StoredUpload,
    title: Option<&str>,
    description: Option<&str>,
) -> Result<Video> {
    let result = insert_record(db, &upload, title, description);

    if result.is_err() {
        discard_upload(blobs, &upload).await;
    }

    let video = result?;
    tracing::info!(id = %video.id, title = %video.title, bytes = video.file_size, "Ingested video");
    Ok(video)
}

/// Remove the blob of an upload that will not be catalogued.
pub async fn discard_upload(blobs: &dyn BlobStore, upload: &StoredUpload) {
    if let Err(e) = blobs.delete(&upload.stored_file_name).await {
        tracing::warn!(
            stored = %upload.stored_file_name,
            error = %e,
            "Failed to remove blob after rejected upload"
        );
    }
}

fn insert_record(
    db: &DbPool,
    upload: &StoredUpload,
    title: Option<&str>,
    description: Option<&str>,
) -> Result<Video> {
    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::invalid_input("title is required"))?;
    let description = description.map(str::trim).filter(|d| !d.is_empty());
    let file_size = i64::try_from(upload.file_size)
        .map_err(|_| Error::invalid_input("uploaded file is too large"))?;

    let conn = get_conn(db)?;
    videos::create_video(
        &conn,
        &NewVideo {
            id: upload.id,
            title,
            description,
            file_name: &upload.file_name,
            stored_file_name: &upload.stored_file_name,
            content_type: upload.format.mime(),
            file_size,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;
    use vidstream_db::pool::init_memory_pool;

    async fn ingest(
        db: &DbPool,
        blobs: &MemoryBlobStore,
        title: &str,
        content_type: &str,
        mut body: &[u8],
    ) -> Result<Video> {
        let upload = store_upload(blobs, Some("Holiday.MP4"), content_type, &mut body).await?;
        record_upload(db, blobs, upload, Some(title), Some("  ")).await
    }

    #[tokio::test]
    async fn test_ingest_stores_blob_and_record() {
        let db = init_memory_pool().unwrap();
        let blobs = MemoryBlobStore::default();

        let video = ingest(&db, &blobs, " Holiday ", "video/mp4", b"fake mp4 bytes")
            .await
            .unwrap();

        assert_eq!(video.title, "Holiday");
        assert_eq!(video.description, None);
        assert_eq!(video.file_name, "Holiday.MP4");
        assert_eq!(video.stored_file_name, format!("{}.mp4", video.id));
        assert_eq!(video.content_type, "video/mp4");
        assert_eq!(video.file_size, 14);
        assert_eq!(blobs.size(&video.stored_file_name).await.unwrap(), 14);
    }

    #[tokio::test]
    async fn test_ingest_normalises_content_type() {
        let db = init_memory_pool().unwrap();
        let blobs = MemoryBlobStore::default();

        let video = ingest(&db, &blobs, "Clip", "Video/WebM; codecs=vp9", b"webm")
            .await
            .unwrap();
        assert_eq!(video.content_type, "video/webm");
    }

    #[tokio::test]
    async fn test_unsupported_type_stores_nothing() {
        let blobs = MemoryBlobStore::default();
        let mut body: &[u8] = b"not a video";

        let err = store_upload(&blobs, Some("doc.pdf"), "application/pdf", &mut body)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedMediaType(_)));
        assert_eq!(body, b"not a video");
    }

    #[tokio::test]
    async fn test_blank_title_removes_blob() {
        let db = init_memory_pool().unwrap();
        let blobs = MemoryBlobStore::default();
        let mut body: &[u8] = b"bytes";

        let upload = store_upload(&blobs, Some("clip.mp4"), "video/mp4", &mut body)
            .await
            .unwrap();
        let stored = upload.stored_file_name.clone();

        let err = record_upload(&db, &blobs, upload, Some("   "), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(matches!(blobs.size(&stored).await, Err(Error::NotFound(_))));

        let conn = db.get().unwrap();
        assert!(videos::list_videos(&conn).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_failure_removes_blob() {
        let db = init_memory_pool().unwrap();
        let blobs = MemoryBlobStore::default();
        let mut body: &[u8] = b"orphan";

        let upload = store_upload(&blobs, Some("clip.mov"), "video/quicktime", &mut body)
            .await
            .unwrap();
        let stored = upload.stored_file_name.clone();
        assert!(blobs.size(&stored).await.is_ok());

        let err = record_upload(&db, &blobs, upload, None, None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(matches!(blobs.size(&stored).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_missing_file_name_uses_default() {
        let blobs = MemoryBlobStore::default();
        let mut body: &[u8] = b"x";

        let upload = store_upload(&blobs, None, "video/mp4", &mut body).await.unwrap();
        assert_eq!(upload.file_name, "upload");
        assert_eq!(upload.stored_file_name, upload.id.to_string());
    }
}
