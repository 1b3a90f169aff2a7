//! Event metadata to guide programme mapping, shared by the lane and the
//! direct renderers.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// Title used when neither the event nor the entry has one.
pub const FALLBACK_TITLE: &str = "Peacock Sports";

/// Category tags every real event carries before its genres.
pub const FIXED_CATEGORIES: [&str; 2] = ["Sports", "Sports event"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub kind: String,
    pub url: String,
}

/// What the renderers know about an event, images in stored order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventMeta {
    pub id: String,
    pub pvid: Option<String>,
    pub title: Option<String>,
    pub synopsis: Option<String>,
    pub synopsis_brief: Option<String>,
    pub channel_name: Option<String>,
    pub genres: Vec<String>,
    pub images: Vec<Image>,
}

impl EventMeta {
    /// First image of the first preferred type present, else any image.
    pub fn icon(&self, preferred: &[String]) -> Option<&str> {
        preferred
            .iter()
            .find_map(|kind| self.images.iter().find(|img| &img.kind == kind))
            .or_else(|| self.images.first())
            .map(|img| img.url.as_str())
    }

    pub fn description(&self) -> Option<&str> {
        self.synopsis
            .as_deref()
            .or(self.synopsis_brief.as_deref())
            .filter(|d| !d.is_empty())
    }

    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = FIXED_CATEGORIES.iter().map(|c| c.to_string()).collect();
        categories.extend(self.genres.iter().filter(|g| !g.is_empty()).cloned());
        if let Some(channel) = self.channel_name.as_deref().filter(|c| !c.is_empty()) {
            categories.push(channel.to_string());
        }
        categories
    }

    pub fn has_pvid(&self) -> bool {
        self.pvid.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// One `<programme>` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Programme {
    pub channel: String,
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub title: String,
    pub description: Option<String>,
    pub categories: Vec<String>,
    pub icon: Option<String>,
    pub live: bool,
}

impl Programme {
    /// A synthetic block with no categories, icon or live marker.
    pub fn placeholder(
        channel: impl Into<String>,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        title: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            start,
            stop: min_stop(start, stop),
            title: title.into(),
            description,
            categories: Vec::new(),
            icon: None,
            live: false,
        }
    }

    /// A real event. The title falls back from the event title to
    /// `entry_title` to [`FALLBACK_TITLE`].
    pub fn for_event(
        channel: impl Into<String>,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        entry_title: &str,
        meta: &EventMeta,
        preferred_images: &[String],
    ) -> Self {
        let title = meta
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(Some(entry_title).filter(|t| !t.is_empty()))
            .unwrap_or(FALLBACK_TITLE);

        Self {
            channel: channel.into(),
            start,
            stop: min_stop(start, stop),
            title: title.to_string(),
            description: meta.description().map(String::from),
            categories: meta.categories(),
            icon: meta.icon(preferred_images).map(String::from),
            live: true,
        }
    }
}

/// `stop`, or one minute after `start` when the interval is not positive.
pub fn min_stop(start: DateTime<Utc>, stop: DateTime<Utc>) -> DateTime<Utc> {
    if stop <= start {
        start + TimeDelta::minutes(1)
    } else {
        stop
    }
}
