//! Event artwork.

use rusqlite::Connection;
use lanecast_core::{Error, Result};

use crate::models::ImageRecord;

const COLS: &str = "event_id, img_type, url";

/// Record an image. Returns `false` when the exact row already exists.
pub fn insert_image(conn: &Connection, event_id: &str, img_type: &str, url: &str) -> Result<bool> {
    let n = conn
        .execute(
            "INSERT OR IGNORE INTO event_images (event_id, img_type, url) VALUES (?1, ?2, ?3)",
            [event_id, img_type, url],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Images for one event, in insertion order.
pub fn images_by_event(conn: &Connection, event_id: &str) -> Result<Vec<ImageRecord>> {
    let q = format!("SELECT {COLS} FROM event_images WHERE event_id = ?1 ORDER BY rowid");
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([event_id], ImageRecord::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Every image, in insertion order.
pub fn list_images(conn: &Connection) -> Result<Vec<ImageRecord>> {
    let q = format!("SELECT {COLS} FROM event_images ORDER BY rowid");
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], ImageRecord::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}
