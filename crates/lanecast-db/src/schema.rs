//! Presence checks for the tables a stage depends on.

use rusqlite::Connection;
use lanecast_core::{Error, Result};

/// Tables export cannot run without.
pub const SCHEDULE_TABLES: [&str; 3] = ["lanes", "lane_entries", "events"];

/// The subset of `required` that does not exist, in the given order.
pub fn missing_tables(conn: &Connection, required: &[&str]) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1")
        .map_err(|e| Error::database(e.to_string()))?;

    let mut missing = Vec::new();
    for table in required {
        let exists: bool = stmt
            .query_row([table], |row| row.get(0))
            .map_err(|e| Error::database(e.to_string()))?;
        if !exists {
            missing.push(table.to_string());
        }
    }
    Ok(missing)
}

/// Fail with [`Error::MissingSchema`] if any of `required` is absent.
pub fn check_tables(conn: &Connection, required: &[&str]) -> Result<()> {
    let missing = missing_tables(conn, required)?;
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingSchema { tables: missing })
    }
}

/// [`check_tables`] on [`SCHEDULE_TABLES`], then fail with
/// [`Error::ScheduleNotBuilt`] if no build has written lanes yet.
pub fn check_schedule_built(conn: &Connection) -> Result<()> {
    check_tables(conn, &SCHEDULE_TABLES)?;
    let built: bool = conn
        .query_row("SELECT EXISTS (SELECT 1 FROM lanes)", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))?;
    if built {
        Ok(())
    } else {
        Err(Error::ScheduleNotBuilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;

    #[test]
    fn empty_database_is_missing_everything() {
        let conn = Connection::open_in_memory().unwrap();
        let err = check_tables(&conn, &SCHEDULE_TABLES).unwrap_err();
        match err {
            Error::MissingSchema { tables } => {
                assert_eq!(tables, vec!["lanes", "lane_entries", "events"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn partial_schema_reports_only_absent_tables() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE events (id TEXT PRIMARY KEY);").unwrap();
        let missing = missing_tables(&conn, &SCHEDULE_TABLES).unwrap();
        assert_eq!(missing, vec!["lanes", "lane_entries"]);
    }

    #[test]
    fn migrated_database_passes() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        check_tables(&conn, &SCHEDULE_TABLES).unwrap();
    }

    #[test]
    fn migrated_but_unbuilt_database_has_no_schedule() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let err = check_schedule_built(&conn).unwrap_err();
        assert!(matches!(err, Error::ScheduleNotBuilt), "{err}");

        conn.execute(
            "INSERT INTO lanes (lane_id, name, logical_number) VALUES (1, 'Lane 1', 9000)",
            [],
        )
        .unwrap();
        check_schedule_built(&conn).unwrap();
    }

    #[test]
    fn schedule_check_reports_missing_tables_first() {
        let conn = Connection::open_in_memory().unwrap();
        let err = check_schedule_built(&conn).unwrap_err();
        assert!(matches!(err, Error::MissingSchema { .. }));
    }
}
