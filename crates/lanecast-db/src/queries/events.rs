//! Event upsert and lookup.

use rusqlite::{params, Connection, OptionalExtension};
use lanecast_core::time::to_iso;
use lanecast_core::{Error, Result};

use crate::models::EventRecord;

const COLS: &str = "id, pvid, slug, title, title_brief, synopsis, synopsis_brief, \
                    channel_name, channel_provider_id, airing_type, genres_json, is_free, \
                    is_premium, runtime_secs, start_utc, end_utc, last_seen_utc, raw_attributes_json";

/// Insert an event, or update every column of an existing one with the same id.
pub fn upsert_event(conn: &Connection, event: &EventRecord) -> Result<()> {
    let genres_json =
        serde_json::to_string(&event.genres).map_err(|e| Error::database(e.to_string()))?;
    let raw_json = serde_json::to_string(&event.raw_attributes)
        .map_err(|e| Error::database(e.to_string()))?;

    conn.execute(
        &format!(
            "INSERT INTO events ({COLS})
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18)
             ON CONFLICT(id) DO UPDATE SET
                pvid = excluded.pvid,
                slug = excluded.slug,
                title = excluded.title,
                title_brief = excluded.title_brief,
                synopsis = excluded.synopsis,
                synopsis_brief = excluded.synopsis_brief,
                channel_name = excluded.channel_name,
                channel_provider_id = excluded.channel_provider_id,
                airing_type = excluded.airing_type,
                genres_json = excluded.genres_json,
                is_free = excluded.is_free,
                is_premium = excluded.is_premium,
                runtime_secs = excluded.runtime_secs,
                start_utc = excluded.start_utc,
                end_utc = excluded.end_utc,
                last_seen_utc = excluded.last_seen_utc,
                raw_attributes_json = excluded.raw_attributes_json"
        ),
        params![
            event.id,
            event.pvid,
            event.slug,
            event.title,
            event.title_brief,
            event.synopsis,
            event.synopsis_brief,
            event.channel_name,
            event.channel_provider_id,
            event.airing_type,
            genres_json,
            event.is_free,
            event.is_premium,
            event.runtime_secs,
            event.start.map(to_iso),
            event.end.map(to_iso),
            to_iso(event.last_seen),
            raw_json,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Look up an event by id.
pub fn get_event(conn: &Connection, id: &str) -> Result<Option<EventRecord>> {
    let q = format!("SELECT {COLS} FROM events WHERE id = ?1");
    conn.query_row(&q, [id], EventRecord::from_row)
        .optional()
        .map_err(|e| Error::database(e.to_string()))
}

/// All events, in id order.
pub fn list_events(conn: &Connection) -> Result<Vec<EventRecord>> {
    let q = format!("SELECT {COLS} FROM events ORDER BY id");
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], EventRecord::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

pub fn count_events(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}
