//! Video record query operations.
//!
//! Records are immutable once created; the streaming path only ever reads
//! them.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, types::Type, Connection, Row};
use uuid::Uuid;
use vidstream_common::{Error, Result, VideoId};

use crate::models::{NewVideo, Video};

const VIDEO_COLUMNS: &str = "id, title, description, file_name, stored_file_name, content_type,
                             file_size, created_at";

fn row_to_video(row: &Row<'_>) -> rusqlite::Result<Video> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    let created_at: String = row.get(7)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

    Ok(Video {
        id: VideoId::from(id),
        title: row.get(1)?,
        description: row.get(2)?,
        file_name: row.get(3)?,
        stored_file_name: row.get(4)?,
        content_type: row.get(5)?,
        file_size: row.get(6)?,
        created_at,
    })
}

/// Insert a new video record, stamping its creation time.
pub fn create_video(conn: &Connection, new: &NewVideo<'_>) -> Result<Video> {
    let now = Utc::now().trunc_subsecs(6);

    conn.execute(
        "INSERT INTO videos (id, title, description, file_name, stored_file_name, content_type,
                             file_size, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            new.id.to_string(),
            new.title,
            new.description,
            new.file_name,
            new.stored_file_name,
            new.content_type,
            new.file_size,
            now.to_rfc3339_opts(SecondsFormat::Micros, true),
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Video {
        id: new.id,
        title: new.title.to_string(),
        description: new.description.map(str::to_string),
        file_name: new.file_name.to_string(),
        stored_file_name: new.stored_file_name.to_string(),
        content_type: new.content_type.to_string(),
        file_size: new.file_size,
        created_at: now,
    })
}

/// Get a video record by ID.
pub fn get_video(conn: &Connection, id: VideoId) -> Result<Video> {
    conn.query_row(
        &format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = ?"),
        [id.to_string()],
        row_to_video,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => Error::not_found(format!("video {id}")),
        _ => Error::database(e.to_string()),
    })
}

/// List all video records, newest first.
pub fn list_videos(conn: &Connection) -> Result<Vec<Video>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos ORDER BY created_at DESC, rowid DESC"
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let videos = stmt
        .query_map([], row_to_video)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(videos)
}

/// Delete a video record. Returns whether a row was removed.
pub fn delete_video(conn: &Connection, id: VideoId) -> Result<bool> {
    let affected = conn
        .execute("DELETE FROM videos WHERE id = ?", [id.to_string()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(affected > 0)
}
