//! Per-event ("direct") rendering.
//!
//! Every playable event inside the forward horizon gets its own channel,
//! `peacock.event.{ordinal}`, with exactly three segments: a "not started"
//! placeholder, the event, and an "ended" placeholder. Channels are
//! computed once and passed to both the guide and the playlist writer so
//! the two documents always agree on ids.

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};

use lanecast_core::time::{ceil_half_hour, snap_half_hour};
use lanecast_core::Result;

use crate::deeplink;
use crate::lanes::LaneSchedule;
use crate::m3u::{generate_playlist, PlaylistEntry};
use crate::options::RenderOptions;
use crate::programme::{EventMeta, Programme};
use crate::xmltv::{write_guide, GuideChannel};

pub const EVENT_GROUP: &str = "Peacock Events";
pub const NOT_STARTED_TITLE: &str = "Event Not Started";
pub const ENDED_TITLE: &str = "Event Ended";

/// How far before the event the "not started" segment may begin.
const LEAD_IN: TimeDelta = TimeDelta::hours(8);
/// How long the "ended" segment runs past the event.
const TAIL: TimeDelta = TimeDelta::hours(24);
/// Boundary segments shorter than this are dropped.
const MIN_SEGMENT: TimeDelta = TimeDelta::seconds(60);

pub fn event_channel_id(ordinal: usize) -> String {
    format!("peacock.event.{ordinal}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectChannel {
    /// One-based, in start order for this run.
    pub ordinal: usize,
    pub id: String,
    pub title: String,
    pub pvid: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub meta: EventMeta,
}

/// Playable events whose `[start, end)` intersects `[now, now + horizon]`.
pub fn direct_channels(
    schedule: &LaneSchedule,
    now: DateTime<Utc>,
    horizon: TimeDelta,
) -> Vec<DirectChannel> {
    let until = now + horizon;
    let mut rows: Vec<_> = schedule
        .rows
        .iter()
        .filter(|r| r.pvid().is_some() && r.entry.start <= until && r.entry.end > now)
        .collect();
    rows.sort_by_key(|r| r.entry.start);

    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|r| seen.insert(r.entry.entry_id.clone()))
        .enumerate()
        .filter_map(|(i, row)| {
            let meta = row.meta.clone()?;
            let pvid = row.pvid()?.to_string();
            let ordinal = i + 1;
            let title = meta
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| format!("Peacock Event {ordinal}"));
            Some(DirectChannel {
                ordinal,
                id: event_channel_id(ordinal),
                title,
                pvid,
                start: row.entry.start,
                end: row.entry.end,
                meta,
            })
        })
        .collect()
}

fn local_time(ts: DateTime<Utc>, options: &RenderOptions) -> String {
    format!(
        "{} {}",
        ts.with_timezone(&options.display_offset).format("%I:%M %p"),
        options.display_zone_label
    )
}

/// The three segments of one direct channel, boundary segments shorter than
/// a minute left out.
pub fn segments(channel: &DirectChannel, now: DateTime<Utc>, options: &RenderOptions) -> Vec<Programme> {
    let mut out = Vec::with_capacity(3);

    let before = snap_half_hour(now.max(channel.start - LEAD_IN));
    if channel.start - before >= MIN_SEGMENT {
        out.push(Programme::placeholder(
            &channel.id,
            before,
            channel.start,
            NOT_STARTED_TITLE,
            Some(format!(
                "This event starts at {}. Check back closer to start time.",
                local_time(channel.start, options)
            )),
        ));
    }

    out.push(Programme::for_event(
        &channel.id,
        channel.start,
        channel.end,
        &channel.title,
        &channel.meta,
        &options.preferred_images,
    ));

    let after = ceil_half_hour(channel.end);
    let after_end = channel.end + TAIL;
    if after_end - after >= MIN_SEGMENT {
        out.push(Programme::placeholder(
            &channel.id,
            after,
            after_end,
            ENDED_TITLE,
            Some(format!(
                "This event ended at {}. Check guide for upcoming events.",
                local_time(channel.end, options)
            )),
        ));
    }

    out
}

pub fn direct_guide(
    channels: &[DirectChannel],
    now: DateTime<Utc>,
    options: &RenderOptions,
) -> Result<String> {
    let guide_channels: Vec<GuideChannel> = channels
        .iter()
        .map(|c| GuideChannel {
            id: c.id.clone(),
            display_name: c.title.clone(),
            icon: None,
        })
        .collect();
    let programmes: Vec<Programme> = channels
        .iter()
        .flat_map(|c| segments(c, now, options))
        .collect();

    write_guide(&options.generator, &guide_channels, &programmes)
}

pub fn direct_playlist(channels: &[DirectChannel], options: &RenderOptions) -> String {
    let entries: Vec<PlaylistEntry> = channels
        .iter()
        .map(|c| PlaylistEntry {
            tvg_id: c.id.clone(),
            name: c.title.clone(),
            channel_number: None,
            group: EVENT_GROUP.to_string(),
            logo: c.meta.icon(&options.preferred_images).map(String::from),
            url: deeplink::encode(&c.pvid),
        })
        .collect();

    generate_playlist(&entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lanes::tests::{at, event_row, placeholder_row};
    use crate::programme::Image;
    use lanecast_schedule::Lane;

    fn schedule() -> LaneSchedule {
        LaneSchedule::new(
            Lane::numbered(2, 9000, "Peacock Sports"),
            vec![
                event_row(1, "done", Some("pv-done"), at(5, 0), at(6, 0)),
                placeholder_row(1, at(6, 0), at(12, 0)),
                event_row(1, "late", Some("pv-late"), at(12, 0), at(13, 45)),
                event_row(2, "live", Some("pv-live"), at(9, 0), at(10, 30)),
                event_row(2, "nopv", None, at(11, 0), at(12, 0)),
            ],
        )
    }

    #[test]
    fn selects_playable_events_in_horizon_by_start() {
        let channels = direct_channels(&schedule(), at(9, 20), TimeDelta::hours(24));
        let ids: Vec<(&str, &str)> = channels
            .iter()
            .map(|c| (c.id.as_str(), c.meta.id.as_str()))
            .collect();
        assert_eq!(ids, vec![("peacock.event.1", "live"), ("peacock.event.2", "late")]);

        let short = direct_channels(&schedule(), at(9, 20), TimeDelta::hours(2));
        assert_eq!(short.len(), 1);
    }

    #[test]
    fn three_segments_with_snapped_boundaries() {
        let channels = direct_channels(&schedule(), at(9, 20), TimeDelta::hours(24));
        let late = &channels[1];
        let segs = segments(late, at(9, 20), &RenderOptions::default());
        assert_eq!(segs.len(), 3);

        assert_eq!(segs[0].title, NOT_STARTED_TITLE);
        assert_eq!((segs[0].start, segs[0].stop), (at(9, 30), at(12, 0)));
        assert_eq!(
            segs[0].description.as_deref(),
            Some("This event starts at 07:00 AM EST. Check back closer to start time.")
        );

        assert_eq!(segs[1].title, "Event late");
        assert!(segs[1].live);

        assert_eq!(segs[2].title, ENDED_TITLE);
        assert_eq!(segs[2].start, at(14, 0));
        assert_eq!(segs[2].stop, at(13, 45) + TimeDelta::hours(24));
        assert_eq!(
            segs[2].description.as_deref(),
            Some("This event ended at 08:45 AM EST. Check guide for upcoming events.")
        );
    }

    #[test]
    fn live_event_has_no_lead_in() {
        let channels = direct_channels(&schedule(), at(9, 20), TimeDelta::hours(24));
        let segs = segments(&channels[0], at(9, 20), &RenderOptions::default());
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].title, "Event live");
        assert_eq!(segs[1].start, at(10, 30));
    }

    #[test]
    fn lead_in_is_capped_at_eight_hours() {
        let channels = direct_channels(&schedule(), at(2, 10), TimeDelta::hours(24));
        let late = channels.iter().find(|c| c.meta.id == "late").unwrap();
        let segs = segments(late, at(2, 10), &RenderOptions::default());
        assert_eq!(segs[0].start, at(4, 0));
    }

    #[test]
    fn guide_and_playlist_share_channel_ids() {
        let mut schedule = schedule();
        if let Some(meta) = schedule.rows[2].meta.as_mut() {
            meta.images.push(Image {
                kind: "landscape".into(),
                url: "https://img/late".into(),
            });
        }
        let options = RenderOptions::default();
        let now = at(9, 20);
        let channels = direct_channels(&schedule, now, options.direct_horizon);
        let xml = direct_guide(&channels, now, &options).unwrap();
        let m3u = direct_playlist(&channels, &options);

        for channel in &channels {
            assert!(xml.contains(&format!("<channel id=\"{}\">", channel.id)));
            assert!(m3u.contains(&format!("tvg-id=\"{}\"", channel.id)));
        }
        assert!(m3u.contains(&deeplink::encode("pv-live")));
        assert!(m3u.contains("tvg-logo=\"https://img/late\""));
        assert_eq!(m3u.matches("tvg-logo").count(), 1);
    }
}
