//! Direct streaming of stored videos with HTTP range requests.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
};
use vidstream_common::Error;

use super::range::{parse_range_header, resolve};
use super::responder::{respond, ContentDescriptor, StreamResponse};
use crate::server::{parse_video_id, AppContext, AppError};

/// Serve a video's bytes, honouring a single `Range` request.
pub async fn stream_video(
    State(ctx): State<AppContext>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
) -> Result<StreamResponse, AppError> {
    let id = parse_video_id(&video_id)?;

    let entry = ctx.catalog.lookup(id).await?;
    let total_length = ctx.blobs.size(&entry.stored_file_id).await?;

    let range_header = headers
        .get(header::RANGE)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| Error::invalid_range("Range header is not valid ASCII"))
        })
        .transpose()?;

    let request = parse_range_header(range_header)?;
    let resolution = resolve(request, total_length)?;

    // Only open the blob once the request is known to be satisfiable.
    let reader = ctx.blobs.open(&entry.stored_file_id).await?;
    let response = respond(
        ContentDescriptor {
            total_length,
            media_type: entry.media_type,
        },
        resolution,
        reader,
    )
    .await?;

    tracing::debug!(
        %id,
        range = ?response.content_range,
        bytes = response.content_length,
        "Streaming video"
    );

    Ok(response)
}
