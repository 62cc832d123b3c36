//! Vidstream-DB: Catalog schema, migrations, and query operations
//!
//! This crate provides the metadata catalog for vidstream using SQLite
//! with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use vidstream_db::pool::{init_pool, get_conn};
//! use vidstream_db::queries::videos;
//!
//! let pool = init_pool("/var/lib/vidstream/catalog.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! for video in videos::list_videos(&conn).unwrap() {
//!     println!("{} ({} bytes)", video.title, video.file_size);
//! }
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
