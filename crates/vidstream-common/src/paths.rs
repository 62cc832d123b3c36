//! Naming of stored blobs.
//!
//! Uploaded files are never stored under their client-supplied names. The
//! stored name is the record ID plus a sanitised copy of the original
//! extension, so it can never contain a path separator or a `..` segment.

use crate::VideoId;

/// Longest extension carried over from an uploaded file name.
const MAX_EXTENSION_LEN: usize = 8;

/// Extract a safe, lowercased extension from a client-supplied file name.
///
/// Returns `None` when the name has no extension, or when the extension is
/// empty, too long, or contains anything but ASCII alphanumerics.
///
/// # Examples
///
/// ```
/// use vidstream_common::paths::file_extension;
///
/// assert_eq!(file_extension("clip.MP4").as_deref(), Some("mp4"));
/// assert_eq!(file_extension("archive.tar.webm").as_deref(), Some("webm"));
/// assert_eq!(file_extension("noext"), None);
/// assert_eq!(file_extension("evil.m/../p4"), None);
/// ```
pub fn file_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Build the stored blob name for a record: `<id>` or `<id>.<ext>`.
///
/// # Examples
///
/// ```
/// use vidstream_common::{paths::stored_file_name, VideoId};
///
/// let id = VideoId::new();
/// assert_eq!(stored_file_name(id, "trip.mov"), format!("{id}.mov"));
/// assert_eq!(stored_file_name(id, "trip"), id.to_string());
/// ```
pub fn stored_file_name(id: VideoId, original_name: &str) -> String {
    match file_extension(original_name) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}
