//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`vidstream_common::Error`] so that route
//! handlers can return `Result<T, AppError>` and use `?` directly.

use axum::body::Body;
use axum::extract::multipart::MultipartError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use vidstream_common::Error;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: Error,
}

impl AppError {
    pub fn new(inner: Error) -> Self {
        Self { inner }
    }
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self::new(e)
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        Self::new(Error::invalid_input(format!("malformed upload: {}", e.body_text())))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // 416 carries the resource length so the client can retry, and no body.
        if let Error::RangeNotSatisfiable { total_length } = self.inner {
            return (
                status,
                [
                    (header::CONTENT_RANGE, format!("bytes */{total_length}")),
                    (header::ACCEPT_RANGES, "bytes".to_string()),
                ],
                Body::empty(),
            )
                .into_response();
        }

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        }

        let body = json!({
            "error": self.inner.to_string(),
            "code": self.inner.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}
