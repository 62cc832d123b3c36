//! Database query modules.
//!
//! - videos: Video record CRUD for the catalog

pub mod videos;
