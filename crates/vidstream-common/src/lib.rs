//! Vidstream-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across vidstream:
//!
//! - **Typed IDs**: A type-safe UUID wrapper for catalog records
//! - **Video Formats**: The upload allow-list of container MIME types
//! - **Path Utilities**: Naming of stored blobs from uploaded file names
//! - **Error Handling**: The unified error type and result alias
//!
//! # Examples
//!
//! ```
//! use vidstream_common::{Error, Result, VideoFormat, VideoId};
//! use vidstream_common::paths::stored_file_name;
//!
//! let id = VideoId::new();
//! let format = VideoFormat::from_mime("video/mp4").unwrap();
//! assert_eq!(format, VideoFormat::Mp4);
//!
//! let stored = stored_file_name(id, "holiday.MP4");
//! assert!(stored.ends_with(".mp4"));
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("video"))
//! }
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
