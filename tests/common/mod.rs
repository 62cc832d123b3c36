//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a catalog database and upload
//! directory inside a temporary directory and wires them into a full
//! [`AppContext`]. Requests are driven through the router with
//! `tower::ServiceExt::oneshot`, so no socket is bound.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use vidstream::config::Config;
use vidstream::server::{create_router, AppContext};
use vidstream::storage::{BlobStore, FilesystemBlobStore};
use vidstream_common::paths::stored_file_name;
use vidstream_common::VideoId;
use vidstream_db::models::NewVideo;
use vidstream_db::pool::{get_conn, init_pool, DbPool, PooledConnection};
use vidstream_db::queries::videos;

pub const BOUNDARY: &str = "vidstream-test-boundary";

/// Test harness wrapping a fully-constructed [`AppContext`].
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub blobs: Arc<FilesystemBlobStore>,
    /// Keeps the database and uploads alive for the test's duration.
    pub dir: TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    /// Create a new harness with a custom configuration. Storage paths are
    /// always redirected into a fresh temporary directory.
    pub async fn with_config(mut config: Config) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        config.storage.upload_dir = dir.path().join("uploads");
        config.storage.database_path = dir.path().join("catalog.db");

        let db = init_pool(config.storage.database_path.to_str().unwrap())
            .expect("failed to create pool");
        let blobs = Arc::new(
            FilesystemBlobStore::new(config.storage.upload_dir.clone())
                .await
                .expect("failed to create blob store"),
        );

        let ctx = AppContext::new(config, db.clone(), blobs.clone());

        Self {
            ctx,
            db,
            blobs,
            dir,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    pub fn conn(&self) -> PooledConnection {
        get_conn(&self.db).expect("failed to get connection")
    }

    /// Absolute path of a stored blob.
    pub fn blob_path(&self, stored: &str) -> PathBuf {
        self.blobs.root().join(stored)
    }

    /// Store `bytes` and catalogue them as a video.
    pub async fn insert_video(&self, bytes: &[u8], content_type: &str) -> VideoId {
        let id = VideoId::new();
        let stored = stored_file_name(id, "clip.mp4");
        let mut source = bytes;
        self.blobs.put(&stored, &mut source).await.unwrap();
        self.record(id, &stored, content_type, bytes.len() as u64);
        id
    }

    /// Catalogue a sparse file of `len` zero bytes without writing them.
    pub fn insert_sparse_video(&self, len: u64) -> VideoId {
        let id = VideoId::new();
        let stored = stored_file_name(id, "large.mp4");
        let file = std::fs::File::create(self.blob_path(&stored)).unwrap();
        file.set_len(len).unwrap();
        self.record(id, &stored, "video/mp4", len);
        id
    }

    fn record(&self, id: VideoId, stored: &str, content_type: &str, len: u64) {
        videos::create_video(
            &self.conn(),
            &NewVideo {
                id,
                title: "Test clip",
                description: None,
                file_name: "clip.mp4",
                stored_file_name: stored,
                content_type,
                file_size: len as i64,
            },
        )
        .unwrap();
    }

    /// Issue a GET, optionally with a `Range` header.
    pub async fn get(&self, uri: &str, range: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(range) = range {
            request = request.header(header::RANGE, range);
        }
        self.router()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    /// Issue a multipart upload built from `(name, filename, content_type, data)` parts.
    pub async fn upload(&self, parts: &[Part<'_>]) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri("/api/videos")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.router().oneshot(request).await.unwrap()
    }
}

/// One multipart form part.
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            file_name: None,
            content_type: None,
            data: value.as_bytes(),
        }
    }

    pub fn file(file_name: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            name: "file",
            file_name: Some(file_name),
            content_type: Some(content_type),
            data,
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{file_name}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Collect a response body.
pub async fn body_bytes(response: Response<Body>) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Deterministic, non-repeating-per-window test content.
pub fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
