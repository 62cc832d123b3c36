//! Video container formats accepted for upload.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Container format of an uploaded video, keyed by its MIME type.
///
/// Only these formats are accepted by ingestion; anything else is rejected
/// before a byte is written to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    /// MPEG-4 Part 14 (`video/mp4`).
    Mp4,
    /// WebM (`video/webm`).
    Webm,
    /// QuickTime (`video/quicktime`).
    QuickTime,
}

impl VideoFormat {
    /// All accepted formats.
    pub const ALL: [VideoFormat; 3] = [Self::Mp4, Self::Webm, Self::QuickTime];

    /// Resolve a MIME type against the allow-list.
    ///
    /// Parameters such as `; codecs=...` are ignored and matching is
    /// case-insensitive.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        Self::ALL
            .into_iter()
            .find(|format| format.mime().eq_ignore_ascii_case(essence))
    }

    /// The canonical MIME type.
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Webm => "video/webm",
            Self::QuickTime => "video/quicktime",
        }
    }

    /// Human-readable list of accepted MIME types, used in error messages.
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|f| f.mime())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}
