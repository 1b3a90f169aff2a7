//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order.  A
//! `schema_migrations` table tracks which versions have been applied.

use rusqlite::Connection;
use lanecast_core::{Error, Result};

/// V1: events, their images and the lane schedule.
const V1_INITIAL: &str = r#"
-- Events, upserted by catalog id
CREATE TABLE events (
    id                  TEXT PRIMARY KEY,
    pvid                TEXT,
    slug                TEXT,
    title               TEXT NOT NULL DEFAULT '',
    title_brief         TEXT,
    synopsis            TEXT,
    synopsis_brief      TEXT,
    channel_name        TEXT,
    channel_provider_id TEXT,
    airing_type         TEXT,
    genres_json         TEXT NOT NULL DEFAULT '[]',
    is_free             INTEGER NOT NULL DEFAULT 0,
    is_premium          INTEGER NOT NULL DEFAULT 0,
    runtime_secs        INTEGER,
    start_utc           TEXT,
    end_utc             TEXT,
    last_seen_utc       TEXT NOT NULL,
    raw_attributes_json TEXT NOT NULL DEFAULT '{}'
);

CREATE INDEX idx_events_start ON events(start_utc);

-- Event artwork, read back in insertion order
CREATE TABLE event_images (
    event_id TEXT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    img_type TEXT NOT NULL,
    url      TEXT NOT NULL,
    PRIMARY KEY (event_id, img_type, url)
);

-- Lanes, rebuilt on every schedule build
CREATE TABLE lanes (
    lane_id        INTEGER PRIMARY KEY,
    name           TEXT NOT NULL,
    logical_number INTEGER NOT NULL
);

CREATE TABLE lane_entries (
    lane_id        INTEGER NOT NULL REFERENCES lanes(lane_id) ON DELETE CASCADE,
    entry_id       TEXT NOT NULL,
    event_id       TEXT,
    is_placeholder INTEGER NOT NULL,
    start_utc      TEXT NOT NULL,
    end_utc        TEXT NOT NULL,
    title          TEXT NOT NULL,
    PRIMARY KEY (lane_id, entry_id, start_utc)
);

CREATE INDEX idx_lane_entries_lane_start ON lane_entries(lane_id, start_utc);
"#;

/// Ordered list of all migrations.
const MIGRATIONS: &[(i64, &str)] = &[(1, V1_INITIAL)];

/// Run all pending migrations against the given connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::database(format!("Failed to create schema_migrations: {e}")))?;

    for &(version, sql) in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;

        if already {
            continue;
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        tx.execute_batch(sql)
            .map_err(|e| Error::database(format!("Migration V{version} failed: {e}")))?;

        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        tx.commit().map_err(|e| Error::database(e.to_string()))?;

        tracing::debug!(version, "Applied migration");
    }

    Ok(())
}
