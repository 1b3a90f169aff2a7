//! The canonical event produced by the normalizer.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// A live event with a well-formed time interval.
///
/// Immutable for the duration of one pipeline run. `end > start` always
/// holds; `end_padded` is what every packing and overlap decision uses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: String,
    /// Needed to build a playable deep link. Events without one stay in the
    /// guide but never appear in playlists.
    pub provider_variant_id: Option<String>,
    pub slug: Option<String>,
    pub title: String,
    pub channel_name: Option<String>,
    pub synopsis: Option<String>,
    pub synopsis_brief: Option<String>,
    pub genres: Vec<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub end_padded: DateTime<Utc>,
    /// Untouched upstream attributes, kept for downstream metadata rendering.
    #[serde(skip)]
    pub attributes: Map<String, Value>,
}

impl Event {
    /// Minimal event with no metadata, mostly for tests and benches.
    pub fn bare(
        id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        padding: TimeDelta,
    ) -> Self {
        Self {
            id: id.into(),
            provider_variant_id: None,
            slug: None,
            title: String::new(),
            channel_name: None,
            synopsis: None,
            synopsis_brief: None,
            genres: Vec::new(),
            start,
            end,
            end_padded: end + padding,
            attributes: Map::new(),
        }
    }

    /// Whether the padded interval `[start, end_padded)` intersects
    /// `[from, until)`.
    pub fn overlaps(&self, from: DateTime<Utc>, until: DateTime<Utc>) -> bool {
        self.start < until && self.end_padded > from
    }
}
