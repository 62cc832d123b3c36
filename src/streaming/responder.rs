//! Content responder: turns a resolved range into status, framing headers
//! and payload.

use std::fmt;
use std::io::{self, SeekFrom};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use vidstream_common::{Error, Result};

use super::range::{Resolution, WINDOW_SIZE};
use crate::storage::BlobReader;

/// Chunk size for streamed bodies.
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// What is being served, fixed for the lifetime of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDescriptor {
    pub total_length: u64,
    pub media_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Full,
    Partial,
}

impl StreamStatus {
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::Full => StatusCode::OK,
            Self::Partial => StatusCode::PARTIAL_CONTENT,
        }
    }
}

/// Response payload.
///
/// At most one window of partial content is read up front, so a short read
/// there still fails the request before any header is sent.
pub enum Payload {
    /// A range no wider than one window.
    Buffered(Bytes),
    /// A range wider than one window. `head` is the first window; the rest
    /// is read from `tail` as the body is polled and must add up to
    /// `expected` bytes or the body is aborted.
    Windowed {
        head: Bytes,
        tail: BlobReader,
        expected: u64,
    },
    /// Full content, streamed straight from the blob.
    Streamed(BlobReader),
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            Self::Windowed { head, expected, .. } => f
                .debug_struct("Windowed")
                .field("head", &head.len())
                .field("expected", expected)
                .finish(),
            Self::Streamed(_) => f.write_str("Streamed"),
        }
    }
}

#[derive(Debug)]
pub struct StreamResponse {
    pub status: StreamStatus,
    /// `(start, end, total)` for partial content.
    pub content_range: Option<(u64, u64, u64)>,
    pub content_length: u64,
    pub media_type: String,
    pub payload: Payload,
}

/// Build the response for a resolved request.
///
/// A partial resolution seeks once and reads at most one window before
/// returning; a window shorter than requested fails with
/// [`Error::IncompleteRead`]. Anything past the first window is read while
/// the body streams.
pub async fn respond(
    descriptor: ContentDescriptor,
    resolution: Resolution,
    mut reader: BlobReader,
) -> Result<StreamResponse> {
    match resolution {
        Resolution::Full => Ok(StreamResponse {
            status: StreamStatus::Full,
            content_range: None,
            content_length: descriptor.total_length,
            media_type: descriptor.media_type,
            payload: Payload::Streamed(reader),
        }),
        Resolution::Partial(range) => {
            let expected = range.length();
            reader.seek(SeekFrom::Start(range.start)).await?;

            let want = expected.min(WINDOW_SIZE);
            let head = read_chunk(&mut reader, want).await?;
            let actual = head.len() as u64;
            if actual != want {
                return Err(Error::IncompleteRead { expected, actual });
            }

            let payload = if actual == expected {
                Payload::Buffered(head)
            } else {
                Payload::Windowed {
                    head,
                    tail: reader,
                    expected,
                }
            };

            Ok(StreamResponse {
                status: StreamStatus::Partial,
                content_range: Some((range.start, range.end, descriptor.total_length)),
                content_length: expected,
                media_type: descriptor.media_type,
                payload,
            })
        }
    }
}

/// Read up to `len` bytes; fewer only at end of blob.
async fn read_chunk(reader: &mut BlobReader, len: u64) -> io::Result<Bytes> {
    let mut buf = Vec::with_capacity(len as usize);
    (&mut *reader).take(len).read_to_end(&mut buf).await?;
    Ok(Bytes::from(buf))
}

/// Stream the bytes after the first window, failing the body on a short read.
fn tail_stream(
    reader: BlobReader,
    sent: u64,
    expected: u64,
) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
    stream::try_unfold((reader, sent), move |(mut reader, sent)| async move {
        if sent >= expected {
            return Ok(None);
        }

        let want = (expected - sent).min(STREAM_CHUNK_SIZE as u64);
        let chunk = read_chunk(&mut reader, want).await?;
        if (chunk.len() as u64) < want {
            let err = Error::IncompleteRead {
                expected,
                actual: sent + chunk.len() as u64,
            };
            tracing::error!(error = %err, "Aborting partial response");
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, err.to_string()));
        }

        Ok(Some((chunk, (reader, sent + want))))
    })
}

impl IntoResponse for StreamResponse {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        let media_type = HeaderValue::from_str(&self.media_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
        headers.insert(header::CONTENT_TYPE, media_type);
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(self.content_length));
        headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        if let Some((start, end, total)) = self.content_range {
            if let Ok(value) = HeaderValue::from_str(&format!("bytes {start}-{end}/{total}")) {
                headers.insert(header::CONTENT_RANGE, value);
            }
        }

        let body = match self.payload {
            Payload::Buffered(bytes) => Body::from(bytes),
            Payload::Windowed {
                head,
                tail,
                expected,
            } => {
                let sent = head.len() as u64;
                Body::from_stream(
                    stream::once(async move { Ok::<_, io::Error>(head) })
                        .chain(tail_stream(tail, sent, expected)),
                )
            }
            Payload::Streamed(reader) => Body::from_stream(ReaderStream::with_capacity(
                reader.take(self.content_length),
                STREAM_CHUNK_SIZE,
            )),
        };

        (self.status.status_code(), headers, body).into_response()
    }
}
