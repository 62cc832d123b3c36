//! Internal Rust models matching the database schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vidstream_common::VideoId;

/// A catalogued video upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub id: VideoId,
    pub title: String,
    pub description: Option<String>,
    /// File name as supplied by the uploading client.
    pub file_name: String,
    /// Key of the blob in the blob store.
    pub stored_file_name: String,
    /// Declared MIME type, served back as `Content-Type`.
    pub content_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

/// Fields required to insert a new video record.
#[derive(Debug, Clone)]
pub struct NewVideo<'a> {
    pub id: VideoId,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub file_name: &'a str,
    pub stored_file_name: &'a str,
    pub content_type: &'a str,
    pub file_size: i64,
}
