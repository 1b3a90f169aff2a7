//! Lane-based rendering: one guide channel and one playlist entry per lane.

use chrono::{DateTime, Utc};

use lanecast_core::{LaneId, Result};
use lanecast_schedule::{Lane, LaneEntry, PLACEHOLDER_TITLE};

use crate::deeplink;
use crate::m3u::{generate_playlist, PlaylistEntry};
use crate::options::RenderOptions;
use crate::programme::{EventMeta, Programme};
use crate::xmltv::{write_guide, GuideChannel};

pub const LANE_GROUP: &str = "Peacock Lanes";

pub fn lane_channel_id(lane: LaneId) -> String {
    format!("peacock.lane.{lane}")
}

/// A lane entry joined with the metadata of its event, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRow {
    pub entry: LaneEntry,
    pub meta: Option<EventMeta>,
}

impl ScheduleRow {
    /// The provider variant id when this row is a playable event.
    pub fn pvid(&self) -> Option<&str> {
        if self.entry.is_placeholder() {
            return None;
        }
        self.meta
            .as_ref()
            .and_then(|m| m.pvid.as_deref())
            .filter(|p| !p.is_empty())
    }
}

/// A persisted schedule as the renderers consume it.
#[derive(Debug, Clone, Default)]
pub struct LaneSchedule {
    pub lanes: Vec<Lane>,
    /// Ordered by lane, then start.
    pub rows: Vec<ScheduleRow>,
}

impl LaneSchedule {
    pub fn new(lanes: Vec<Lane>, mut rows: Vec<ScheduleRow>) -> Self {
        rows.sort_by_key(|r| (r.entry.lane_id, r.entry.start));
        Self { lanes, rows }
    }

    pub fn rows_for(&self, lane: LaneId) -> impl Iterator<Item = &ScheduleRow> {
        self.rows.iter().filter(move |r| r.entry.lane_id == lane)
    }

    fn playable_for(&self, lane: LaneId) -> impl Iterator<Item = &ScheduleRow> {
        self.rows_for(lane).filter(|r| r.pvid().is_some())
    }

    /// Earliest playable row starting at or after `now`, else the earliest
    /// playable row overall.
    pub fn upcoming_or_earliest(&self, now: DateTime<Utc>) -> Option<&ScheduleRow> {
        let mut playable: Vec<&ScheduleRow> = self.rows.iter().filter(|r| r.pvid().is_some()).collect();
        playable.sort_by_key(|r| r.entry.start);
        playable
            .iter()
            .find(|r| r.entry.start >= now)
            .or_else(|| playable.first())
            .copied()
    }

    /// Row a direct lane link should play: the lane's next playable row,
    /// else its earliest, else the schedule-wide pick.
    pub fn direct_pick(&self, lane: LaneId, now: DateTime<Utc>) -> Option<&ScheduleRow> {
        self.playable_for(lane)
            .find(|r| r.entry.start >= now)
            .or_else(|| self.playable_for(lane).next())
            .or_else(|| self.upcoming_or_earliest(now))
    }

    /// The lane's playable row live at `now`, else its next one.
    pub fn current_or_next(&self, lane: LaneId, now: DateTime<Utc>) -> Option<&ScheduleRow> {
        self.playable_for(lane)
            .filter(|r| r.entry.start <= now && r.entry.end > now)
            .last()
            .or_else(|| self.playable_for(lane).find(|r| r.entry.start > now))
    }
}

/// How a lane playlist entry resolves to something playable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaneLinkMode {
    /// Server-side lookup at `{server_url}/api/lane/{id}/deeplink`.
    Indirect { server_url: String },
    /// Deep link of the lane's upcoming event, computed now.
    Direct,
    /// Current-or-next deep link wrapped for capture-based players.
    Chrome,
}

pub fn lane_guide(schedule: &LaneSchedule, options: &RenderOptions) -> Result<String> {
    let channels: Vec<GuideChannel> = schedule
        .lanes
        .iter()
        .map(|lane| GuideChannel {
            id: lane_channel_id(lane.id),
            display_name: format!("{} ({})", lane.name, lane.logical_number),
            icon: None,
        })
        .collect();

    let mut programmes = Vec::with_capacity(schedule.rows.len());
    for lane in &schedule.lanes {
        let channel = lane_channel_id(lane.id);
        for row in schedule.rows_for(lane.id) {
            let entry = &row.entry;
            let programme = if entry.is_placeholder() {
                Programme::placeholder(&channel, entry.start, entry.end, PLACEHOLDER_TITLE, None)
            } else {
                let fallback = EventMeta::default();
                let meta = row.meta.as_ref().unwrap_or(&fallback);
                Programme::for_event(
                    &channel,
                    entry.start,
                    entry.end,
                    &entry.title,
                    meta,
                    &options.preferred_images,
                )
            };
            programmes.push(programme);
        }
    }

    tracing::debug!(
        channels = channels.len(),
        programmes = programmes.len(),
        "Rendered lane guide"
    );
    write_guide(&options.generator, &channels, &programmes)
}

pub fn lane_playlist(schedule: &LaneSchedule, mode: &LaneLinkMode, now: DateTime<Utc>) -> String {
    let entries: Vec<PlaylistEntry> = schedule
        .lanes
        .iter()
        .filter_map(|lane| {
            let url = match mode {
                LaneLinkMode::Indirect { server_url } => format!(
                    "{}/api/lane/{}/deeplink",
                    server_url.trim_end_matches('/'),
                    lane.id
                ),
                LaneLinkMode::Direct => {
                    let Some(pvid) = schedule.direct_pick(lane.id, now).and_then(ScheduleRow::pvid) else {
                        tracing::debug!(lane = %lane.id, "No playable event; lane omitted");
                        return None;
                    };
                    deeplink::encode(pvid)
                }
                LaneLinkMode::Chrome => schedule
                    .current_or_next(lane.id, now)
                    .and_then(ScheduleRow::pvid)
                    .map(|pvid| deeplink::chrome(&deeplink::encode(pvid)))
                    .unwrap_or_else(|| deeplink::CHROME_FALLBACK.to_string()),
            };
            Some(PlaylistEntry {
                tvg_id: lane_channel_id(lane.id),
                name: lane.name.clone(),
                channel_number: Some(lane.logical_number),
                group: LANE_GROUP.to_string(),
                logo: Some(String::new()),
                url,
            })
        })
        .collect();

    generate_playlist(&entries)
}
