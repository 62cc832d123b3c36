//! Catalog API routes.
//!
//! - `POST /videos` - Multipart upload (`file`, `title`, `description`)
//! - `GET /videos` - List videos, newest first
//! - `GET /videos/:video_id` - Get one video
//! - `DELETE /videos/:video_id` - Remove a video and its blob

use std::io;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use serde::Serialize;
use tokio_util::io::StreamReader;
use vidstream_common::{Error, VideoId};
use vidstream_db::models::Video;
use vidstream_db::pool::get_conn;
use vidstream_db::queries::videos;

use super::{parse_video_id, AppContext, AppError};
use crate::ingest::{self, StoredUpload};
use crate::storage::BlobStore;

pub fn video_routes(max_upload_bytes: usize) -> Router<AppContext> {
    Router::new()
        .route("/videos", get(list_videos).post(upload_video))
        .route("/videos/:video_id", get(get_video).delete(delete_video))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// Public view of a catalog record. The stored blob name stays internal.
#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub id: VideoId,
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    pub file_size: i64,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<Video> for VideoResponse {
    fn from(video: Video) -> Self {
        Self {
            id: video.id,
            title: video.title,
            description: video.description,
            file_name: video.file_name,
            file_size: video.file_size,
            content_type: video.content_type,
            created_at: video.created_at,
        }
    }
}

#[derive(Default)]
struct UploadForm {
    title: Option<String>,
    description: Option<String>,
    upload: Option<StoredUpload>,
}

async fn upload_video(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<VideoResponse>), AppError> {
    let mut form = UploadForm::default();

    if let Err(e) = read_form(ctx.blobs.as_ref(), &mut multipart, &mut form).await {
        if let Some(upload) = &form.upload {
            ingest::discard_upload(ctx.blobs.as_ref(), upload).await;
        }
        return Err(e);
    }

    let upload = form
        .upload
        .ok_or_else(|| Error::invalid_input("missing file field"))?;

    let video = ingest::record_upload(
        &ctx.db_pool,
        ctx.blobs.as_ref(),
        upload,
        form.title.as_deref(),
        form.description.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(video.into())))
}

/// Read every form field, streaming the `file` part straight into storage.
async fn read_form(
    blobs: &dyn BlobStore,
    multipart: &mut Multipart,
    form: &mut UploadForm,
) -> Result<(), AppError> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => form.title = Some(field.text().await?),
            Some("description") => form.description = Some(field.text().await?),
            Some("file") => {
                if form.upload.is_some() {
                    return Err(Error::invalid_input("only one file may be uploaded").into());
                }

                let file_name = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();

                let body = StreamReader::new(
                    field.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
                );
                tokio::pin!(body);

                let upload =
                    ingest::store_upload(blobs, file_name.as_deref(), &content_type, &mut body)
                        .await
                        .map_err(|e| match e {
                            Error::Io(err) if err.kind() == io::ErrorKind::InvalidData => {
                                Error::invalid_input(format!("malformed upload: {err}"))
                            }
                            e => e,
                        })?;
                form.upload = Some(upload);
            }
            _ => {}
        }
    }

    Ok(())
}

async fn list_videos(State(ctx): State<AppContext>) -> Result<Json<Vec<VideoResponse>>, AppError> {
    let conn = get_conn(&ctx.db_pool)?;
    let videos = videos::list_videos(&conn)?;
    Ok(Json(videos.into_iter().map(VideoResponse::from).collect()))
}

async fn get_video(
    State(ctx): State<AppContext>,
    Path(video_id): Path<String>,
) -> Result<Json<VideoResponse>, AppError> {
    let id = parse_video_id(&video_id)?;
    let conn = get_conn(&ctx.db_pool)?;
    let video = videos::get_video(&conn, id)?;
    Ok(Json(video.into()))
}

/// Remove the blob before the record, so a failed blob delete leaves the
/// video listed and the request can be retried.
async fn delete_video(
    State(ctx): State<AppContext>,
    Path(video_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_video_id(&video_id)?;

    let video = videos::get_video(&*get_conn(&ctx.db_pool)?, id)?;
    ctx.blobs.delete(&video.stored_file_name).await?;
    videos::delete_video(&*get_conn(&ctx.db_pool)?, id)?;

    tracing::info!(%id, "Deleted video");
    Ok(StatusCode::NO_CONTENT)
}
