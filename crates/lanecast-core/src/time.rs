//! UTC instant helpers shared by the scheduler and the exporters.
//!
//! Every instant in lanecast is a `DateTime<Utc>`. Persisted instants use
//! RFC 3339 with whole seconds and an explicit `+00:00` offset, so that
//! lexical order of the stored text equals chronological order.

use chrono::{DateTime, DurationRound, SecondsFormat, TimeDelta, Utc};

/// Truncate to the start of the hour.
pub fn floor_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(TimeDelta::hours(1)).unwrap_or(ts)
}

/// Snap to the nearest `:00` or `:30`.
///
/// Minutes below 15 round down to the hour, 15..45 go to the half hour and
/// anything later rounds up to the next hour.
pub fn snap_half_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    let hour = floor_hour(ts);
    let minute = (ts - hour).num_minutes();
    if minute < 15 {
        hour
    } else if minute < 45 {
        hour + TimeDelta::minutes(30)
    } else {
        hour + TimeDelta::hours(1)
    }
}

/// Round forward to the next `:00` or `:30` boundary. Instants already on a
/// boundary are returned unchanged.
pub fn ceil_half_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    let half = TimeDelta::minutes(30);
    match ts.duration_trunc(half) {
        Ok(floor) if floor == ts => ts,
        Ok(floor) => floor + half,
        Err(_) => ts,
    }
}

/// Build an instant from epoch milliseconds, truncated to whole seconds to
/// match the persisted form.
pub fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ms.div_euclid(1000), 0)
}

/// Persisted text form, e.g. `2026-10-19T09:00:00+00:00`.
pub fn to_iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Parse the persisted text form (any RFC 3339 offset, `Z` included).
pub fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// XMLTV timestamp, `YYYYMMDDHHMMSS +0000`.
pub fn xmltv_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%d%H%M%S +0000").to_string()
}
