//! Raw catalog attributes to canonical [`Event`]s.
//!
//! Upstream records are loosely typed: instants arrive as epoch
//! milliseconds, runtimes as either a seconds count or an `H:MM:SS` string,
//! and the real schedule is sometimes only visible through per-format offer
//! windows. Every field is read through an explicit accessor below; a
//! missing or mistyped field reads as absent.
//!
//! Derivation order for the interval:
//!
//! 1. `displayStartTime` / `displayEndTime`
//! 2. `end = start + runtime` when only the runtime is known
//! 3. the first non-null `offerStartTs` / `offerEndTs` across
//!    `formats.*.availability` (the offer end only when no runtime exists)
//! 4. `end = start + runtime`, else `start + default duration`; an
//!    interval with `end <= start` becomes one minute long
//!
//! Time arithmetic on upstream values is checked. A runtime too large to
//! represent reads as absent; an interval that leaves chrono's range is
//! rejected.

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Map, Value};
use std::collections::HashSet;

use lanecast_core::config::ScheduleConfig;
use lanecast_core::time::from_millis;

use crate::event::Event;

/// Shortest interval an event may have after normalization.
pub const MIN_EVENT_DURATION: TimeDelta = TimeDelta::seconds(60);

/// Why a record produced no event. Rejections are skipped, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("record has no id")]
    MissingId,
    #[error("no start time could be derived")]
    MissingStart,
    #[error("channel '{0}' is on the denylist")]
    DeniedChannel(String),
    #[error("event times are out of range")]
    OutOfRange,
}

/// Times read off a record before defaults are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivedTimes {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub runtime: Option<TimeDelta>,
}

/// Derive start, end and runtime (steps 1-3 above).
pub fn derive_times(attrs: &Map<String, Value>) -> DerivedTimes {
    let mut start = attrs.get("displayStartTime").and_then(instant);
    let mut end = attrs.get("displayEndTime").and_then(instant);
    let runtime = attrs.get("runtime").and_then(parse_runtime);

    if let (Some(s), None, Some(r)) = (start, end, runtime) {
        end = s.checked_add_signed(r);
    }

    if let Some(formats) = attrs.get("formats").and_then(Value::as_object) {
        for format in formats.values() {
            let Some(availability) = format.get("availability").and_then(Value::as_object) else {
                continue;
            };
            if start.is_none() {
                start = availability.get("offerStartTs").and_then(instant);
            }
            if end.is_none() && runtime.is_none() {
                end = availability.get("offerEndTs").and_then(instant);
            }
        }
    }

    DerivedTimes {
        start,
        end,
        runtime,
    }
}

/// Runtime as a seconds count or an `H:MM:SS` string. Zero reads as absent.
pub fn parse_runtime(value: &Value) -> Option<TimeDelta> {
    let secs = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
        Value::String(s) => {
            let parts: Vec<&str> = s.trim().split(':').collect();
            let [h, m, s] = parts.as_slice() else {
                return None;
            };
            let h: i64 = h.parse().ok()?;
            let m: i64 = m.parse().ok()?;
            let s: i64 = s.parse().ok()?;
            h.checked_mul(3600)?
                .checked_add(m.checked_mul(60)?)?
                .checked_add(s)?
        }
        _ => return None,
    };
    if secs <= 0 {
        return None;
    }
    TimeDelta::try_seconds(secs)
}

/// Epoch milliseconds as an integer or float. Zero reads as absent.
fn instant(value: &Value) -> Option<DateTime<Utc>> {
    let ms = value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))?;
    if ms == 0 {
        return None;
    }
    from_millis(ms)
}

/// A non-empty string field; numbers are rendered as text.
pub fn text(attrs: &Map<String, Value>, key: &str) -> Option<String> {
    match attrs.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Genres as plain strings; object entries contribute their `title` or `name`.
pub fn genres(attrs: &Map<String, Value>) -> Vec<String> {
    let Some(list) = attrs.get("genres").and_then(Value::as_array) else {
        return Vec::new();
    };
    list.iter()
        .filter_map(|g| match g {
            Value::String(s) => Some(s.clone()),
            Value::Object(o) => o
                .get("title")
                .or_else(|| o.get("name"))
                .and_then(Value::as_str)
                .map(String::from),
            _ => None,
        })
        .filter(|g| !g.is_empty())
        .collect()
}

/// Channel display name from the nested `channel` object.
pub fn channel_name(attrs: &Map<String, Value>) -> Option<String> {
    attrs
        .get("channel")
        .and_then(Value::as_object)
        .and_then(|c| text(c, "name"))
}

/// Converts raw records into events using the configured defaults.
#[derive(Debug, Clone)]
pub struct Normalizer {
    padding: TimeDelta,
    default_duration: TimeDelta,
    denied_channels: HashSet<String>,
}

impl Normalizer {
    pub fn new(
        padding: TimeDelta,
        default_duration: TimeDelta,
        denied_channels: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            padding,
            default_duration,
            denied_channels: denied_channels.into_iter().collect(),
        }
    }

    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self::new(
            config.padding(),
            config.default_duration(),
            config.denied_channels.iter().cloned(),
        )
    }

    /// Normalize one record. The attribute map is kept on the event as-is.
    pub fn normalize(&self, id: &str, attrs: &Map<String, Value>) -> Result<Event, Rejection> {
        if id.is_empty() {
            return Err(Rejection::MissingId);
        }

        let channel_name = channel_name(attrs);
        if let Some(name) = &channel_name {
            if self.denied_channels.contains(name) {
                return Err(Rejection::DeniedChannel(name.clone()));
            }
        }

        let times = derive_times(attrs);
        let start = times.start.ok_or(Rejection::MissingStart)?;
        let mut end = match times.end {
            Some(end) => end,
            None => start
                .checked_add_signed(times.runtime.unwrap_or(self.default_duration))
                .ok_or(Rejection::OutOfRange)?,
        };
        if end <= start {
            end = start
                .checked_add_signed(MIN_EVENT_DURATION)
                .ok_or(Rejection::OutOfRange)?;
        }
        let end_padded = end
            .checked_add_signed(self.padding.max(TimeDelta::zero()))
            .ok_or(Rejection::OutOfRange)?;

        Ok(Event {
            id: id.to_string(),
            provider_variant_id: text(attrs, "providerVariantId"),
            slug: text(attrs, "slug"),
            title: text(attrs, "title").unwrap_or_default(),
            channel_name,
            synopsis: text(attrs, "synopsis"),
            synopsis_brief: text(attrs, "synopsisBrief"),
            genres: genres(attrs),
            start,
            end,
            end_padded,
            attributes: attrs.clone(),
        })
    }
}
