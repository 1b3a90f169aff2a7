//! Lane schedule persistence.
//!
//! A build replaces the whole schedule inside one transaction, so readers
//! on other connections see either the previous schedule or the new one,
//! never a partial rebuild.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use lanecast_core::time::to_iso;
use lanecast_core::{Error, LaneId, Result};
use lanecast_schedule::{Lane, LaneEntry};

use crate::models::{LaneRecord, ScheduledEntry};

const LANE_COLS: &str = "lane_id, name, logical_number";

const SCHEDULE_QUERY: &str = "SELECT le.lane_id, le.entry_id, le.event_id, le.is_placeholder,
        le.start_utc, le.end_utc, le.title,
        e.pvid, e.title, e.channel_name, e.synopsis, e.synopsis_brief, e.genres_json
    FROM lane_entries le
    LEFT JOIN events e ON le.event_id = e.id
    ORDER BY le.lane_id, le.start_utc";

/// Delete the current schedule and write `lanes` and `entries` in its place.
pub fn replace_schedule(conn: &Connection, lanes: &[Lane], entries: &[LaneEntry]) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    tx.execute_batch("DELETE FROM lane_entries; DELETE FROM lanes;")
        .map_err(|e| Error::database(e.to_string()))?;

    {
        let mut insert_lane = tx
            .prepare("INSERT INTO lanes (lane_id, name, logical_number) VALUES (?1, ?2, ?3)")
            .map_err(|e| Error::database(e.to_string()))?;
        for lane in lanes {
            insert_lane
                .execute(params![lane.id.get(), lane.name, lane.logical_number])
                .map_err(|e| Error::database(e.to_string()))?;
        }

        let mut insert_entry = tx
            .prepare(
                "INSERT OR REPLACE INTO lane_entries
                    (lane_id, entry_id, event_id, is_placeholder, start_utc, end_utc, title)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .map_err(|e| Error::database(e.to_string()))?;
        for entry in entries {
            insert_entry
                .execute(params![
                    entry.lane_id.get(),
                    entry.entry_id,
                    entry.event_id(),
                    entry.is_placeholder(),
                    to_iso(entry.start),
                    to_iso(entry.end),
                    entry.title,
                ])
                .map_err(|e| Error::database(e.to_string()))?;
        }
    }

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    tracing::debug!(lanes = lanes.len(), entries = entries.len(), "Replaced lane schedule");
    Ok(())
}

/// All lanes, in id order.
pub fn list_lanes(conn: &Connection) -> Result<Vec<LaneRecord>> {
    let q = format!("SELECT {LANE_COLS} FROM lanes ORDER BY lane_id");
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], LaneRecord::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

pub fn get_lane(conn: &Connection, lane: LaneId) -> Result<Option<LaneRecord>> {
    let q = format!("SELECT {LANE_COLS} FROM lanes WHERE lane_id = ?1");
    conn.query_row(&q, [lane.get()], LaneRecord::from_row)
        .optional()
        .map_err(|e| Error::database(e.to_string()))
}

/// Every lane entry joined to its event, ordered by lane then start.
pub fn load_schedule(conn: &Connection) -> Result<Vec<ScheduledEntry>> {
    let mut stmt = conn
        .prepare(SCHEDULE_QUERY)
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], ScheduledEntry::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Provider variant id a lane should play at `now`: the event live at
/// `now`, else the next one to start. Events without an id are skipped.
pub fn current_lane_pvid(conn: &Connection, lane: LaneId, now: DateTime<Utc>) -> Result<Option<String>> {
    let now = to_iso(now);

    let current: Option<String> = conn
        .query_row(
            "SELECT e.pvid
             FROM lane_entries le
             JOIN events e ON le.event_id = e.id
             WHERE le.lane_id = ?1
               AND le.is_placeholder = 0
               AND le.start_utc <= ?2
               AND le.end_utc > ?2
               AND e.pvid IS NOT NULL AND e.pvid != ''
             ORDER BY le.start_utc DESC
             LIMIT 1",
            params![lane.get(), now],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| Error::database(e.to_string()))?;

    if current.is_some() {
        return Ok(current);
    }

    conn.query_row(
        "SELECT e.pvid
         FROM lane_entries le
         JOIN events e ON le.event_id = e.id
         WHERE le.lane_id = ?1
           AND le.is_placeholder = 0
           AND le.start_utc > ?2
           AND e.pvid IS NOT NULL AND e.pvid != ''
         ORDER BY le.start_utc ASC
         LIMIT 1",
        params![lane.get(), now],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}
