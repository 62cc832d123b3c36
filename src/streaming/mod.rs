//! Byte-range streaming engine.
//!
//! A stream request flows through four stages:
//!
//! 1. catalog lookup of the stored blob and its media type
//! 2. [`range::parse_range_header`] turns the raw `Range` header into a
//!    [`RangeRequest`]
//! 3. [`range::resolve`] validates it against the blob's real length and
//!    bounds open-ended requests to [`WINDOW_SIZE`]
//! 4. [`responder::respond`] performs the positioned read and frames the
//!    response
//!
//! # Routes
//!
//! - `GET /videos/{id}/stream` - Direct streaming with range support

mod direct;
pub mod range;
pub mod responder;

pub use direct::stream_video;
pub use range::{ByteRange, RangeRequest, Resolution, WINDOW_SIZE};
pub use responder::{ContentDescriptor, Payload, StreamResponse, StreamStatus};

use axum::{routing::get, Router};

use crate::server::AppContext;

/// Create the streaming router.
pub fn stream_routes() -> Router<AppContext> {
    Router::new().route("/videos/:video_id/stream", get(stream_video))
}
