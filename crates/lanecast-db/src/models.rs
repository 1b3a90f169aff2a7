//! Rust structs mapping to database tables.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row`. Instants are stored as RFC 3339 text.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use serde_json::{Map, Value};

use lanecast_core::time::parse_iso;
use lanecast_core::LaneId;
use lanecast_schedule::{EntryKind, Lane, LaneEntry};

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn conversion_error(idx: usize, ty: Type, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, message.into())
}

/// Parse an RFC 3339 text column.
fn parse_ts(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    parse_iso(&s).ok_or_else(|| conversion_error(idx, Type::Text, format!("invalid timestamp '{s}'")))
}

fn parse_opt_ts(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let s: Option<String> = row.get(idx)?;
    match s {
        Some(v) => parse_iso(&v)
            .map(Some)
            .ok_or_else(|| conversion_error(idx, Type::Text, format!("invalid timestamp '{v}'"))),
        None => Ok(None),
    }
}

/// A JSON array of strings; anything else reads as empty.
fn parse_string_list(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Vec<String>> {
    let s: Option<String> = row.get(idx)?;
    Ok(s.and_then(|v| serde_json::from_str(&v).ok()).unwrap_or_default())
}

fn parse_object(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Map<String, Value>> {
    let s: Option<String> = row.get(idx)?;
    Ok(s.and_then(|v| serde_json::from_str(&v).ok()).unwrap_or_default())
}

// ---------------------------------------------------------------------------
// EventRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: String,
    pub pvid: Option<String>,
    pub slug: Option<String>,
    pub title: String,
    pub title_brief: Option<String>,
    pub synopsis: Option<String>,
    pub synopsis_brief: Option<String>,
    pub channel_name: Option<String>,
    pub channel_provider_id: Option<String>,
    pub airing_type: Option<String>,
    pub genres: Vec<String>,
    pub is_free: bool,
    pub is_premium: bool,
    pub runtime_secs: Option<i64>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub last_seen: DateTime<Utc>,
    /// The catalog attributes exactly as received.
    pub raw_attributes: Map<String, Value>,
}

impl EventRecord {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            pvid: row.get(1)?,
            slug: row.get(2)?,
            title: row.get(3)?,
            title_brief: row.get(4)?,
            synopsis: row.get(5)?,
            synopsis_brief: row.get(6)?,
            channel_name: row.get(7)?,
            channel_provider_id: row.get(8)?,
            airing_type: row.get(9)?,
            genres: parse_string_list(row, 10)?,
            is_free: row.get(11)?,
            is_premium: row.get(12)?,
            runtime_secs: row.get(13)?,
            start: parse_opt_ts(row, 14)?,
            end: parse_opt_ts(row, 15)?,
            last_seen: parse_ts(row, 16)?,
            raw_attributes: parse_object(row, 17)?,
        })
    }
}

// ---------------------------------------------------------------------------
// ImageRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub event_id: String,
    pub img_type: String,
    pub url: String,
}

impl ImageRecord {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            event_id: row.get(0)?,
            img_type: row.get(1)?,
            url: row.get(2)?,
        })
    }
}

// ---------------------------------------------------------------------------
// LaneRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneRecord {
    pub lane_id: u32,
    pub name: String,
    pub logical_number: u32,
}

impl LaneRecord {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            lane_id: row.get(0)?,
            name: row.get(1)?,
            logical_number: row.get(2)?,
        })
    }

    pub fn to_lane(&self) -> Lane {
        Lane {
            id: LaneId::new(self.lane_id),
            logical_number: self.logical_number,
            name: self.name.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// ScheduledEntry (lane_entries LEFT JOIN events)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEntry {
    pub lane_id: u32,
    pub entry_id: String,
    pub event_id: Option<String>,
    pub is_placeholder: bool,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
    pub pvid: Option<String>,
    pub event_title: Option<String>,
    pub channel_name: Option<String>,
    pub synopsis: Option<String>,
    pub synopsis_brief: Option<String>,
    pub genres: Vec<String>,
}

impl ScheduledEntry {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            lane_id: row.get(0)?,
            entry_id: row.get(1)?,
            event_id: row.get(2)?,
            is_placeholder: row.get(3)?,
            start: parse_ts(row, 4)?,
            end: parse_ts(row, 5)?,
            title: row.get(6)?,
            pvid: row.get(7)?,
            event_title: row.get(8)?,
            channel_name: row.get(9)?,
            synopsis: row.get(10)?,
            synopsis_brief: row.get(11)?,
            genres: parse_string_list(row, 12)?,
        })
    }

    pub fn to_lane_entry(&self) -> LaneEntry {
        let kind = match (&self.event_id, self.is_placeholder) {
            (Some(event_id), false) => EntryKind::Event {
                event_id: event_id.clone(),
            },
            _ => EntryKind::Placeholder,
        };
        LaneEntry {
            lane_id: LaneId::new(self.lane_id),
            entry_id: self.entry_id.clone(),
            kind,
            start: self.start,
            end: self.end,
            title: self.title.clone(),
        }
    }
}
