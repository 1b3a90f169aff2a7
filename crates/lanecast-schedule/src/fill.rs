//! Placeholder gap filling.
//!
//! Turns each lane's packed events into a contiguous timeline over the
//! shared window: idle time is covered by fixed-length "Nothing Scheduled"
//! blocks, the last one in each gap clipped to the gap's end.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use lanecast_core::time::to_iso;
use lanecast_core::LaneId;

use crate::event::Event;

/// Title of every placeholder entry.
pub const PLACEHOLDER_TITLE: &str = "Nothing Scheduled";

/// A virtual channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lane {
    pub id: LaneId,
    /// External channel number: `base + id - 1`.
    pub logical_number: u32,
    pub name: String,
}

impl Lane {
    pub fn new(id: LaneId, base: u32, prefix: &str) -> Self {
        Self {
            id,
            logical_number: base + id.get().saturating_sub(1),
            name: format!("{prefix} {id}"),
        }
    }

    /// Lanes `1..=count`.
    pub fn numbered(count: u32, base: u32, prefix: &str) -> Vec<Self> {
        LaneId::range(count).map(|id| Self::new(id, base, prefix)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryKind {
    Event { event_id: String },
    Placeholder,
}

/// One interval on a lane's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaneEntry {
    pub lane_id: LaneId,
    /// Event id, or a synthetic id derived from lane and start.
    pub entry_id: String,
    pub kind: EntryKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
}

impl LaneEntry {
    pub fn placeholder(lane_id: LaneId, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            lane_id,
            entry_id: placeholder_id(lane_id, start),
            kind: EntryKind::Placeholder,
            start,
            end,
            title: PLACEHOLDER_TITLE.to_string(),
        }
    }

    /// The event spans `[start, end_padded)` on its lane.
    pub fn for_event(lane_id: LaneId, event: &Event) -> Self {
        Self {
            lane_id,
            entry_id: event.id.clone(),
            kind: EntryKind::Event {
                event_id: event.id.clone(),
            },
            start: event.start,
            end: event.end_padded,
            title: event.title.clone(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.kind, EntryKind::Placeholder)
    }

    pub fn event_id(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Event { event_id } => Some(event_id),
            EntryKind::Placeholder => None,
        }
    }
}

pub fn placeholder_id(lane_id: LaneId, start: DateTime<Utc>) -> String {
    format!("placeholder-{lane_id}-{}", to_iso(start))
}

/// Build every lane's timeline over `[window_start, window_end)`.
///
/// `lanes[i]` holds lane `i + 1`'s events in start order. A non-positive
/// `block` covers each gap with a single placeholder.
pub fn fill(
    lanes: &[Vec<&Event>],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    block: TimeDelta,
) -> Vec<Vec<LaneEntry>> {
    lanes
        .iter()
        .zip(LaneId::range(lanes.len() as u32))
        .map(|(events, lane_id)| fill_lane(lane_id, events, window_start, window_end, block))
        .collect()
}

fn fill_lane(
    lane_id: LaneId,
    events: &[&Event],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    block: TimeDelta,
) -> Vec<LaneEntry> {
    let mut entries = Vec::with_capacity(events.len() * 2 + 1);
    let mut cursor = window_start;

    for event in events {
        fill_gap(&mut entries, lane_id, cursor, event.start, block);
        entries.push(LaneEntry::for_event(lane_id, event));
        cursor = cursor.max(event.end_padded);
    }
    fill_gap(&mut entries, lane_id, cursor, window_end, block);

    entries
}

fn fill_gap(
    entries: &mut Vec<LaneEntry>,
    lane_id: LaneId,
    mut cursor: DateTime<Utc>,
    until: DateTime<Utc>,
    block: TimeDelta,
) {
    while cursor < until {
        let end = if block > TimeDelta::zero() {
            (cursor + block).min(until)
        } else {
            until
        };
        entries.push(LaneEntry::placeholder(lane_id, cursor, end));
        cursor = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, h, m, 0).unwrap()
    }

    fn assert_contiguous(entries: &[LaneEntry], from: DateTime<Utc>, until: DateTime<Utc>) {
        assert_eq!(entries.first().map(|e| e.start), Some(from));
        assert_eq!(entries.last().map(|e| e.end), Some(until));
        for e in entries {
            assert!(e.end > e.start, "degenerate entry {e:?}");
        }
        for pair in entries.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn empty_lane_two_hour_window_gets_two_blocks() {
        let lanes: Vec<Vec<&Event>> = vec![Vec::new()];
        let filled = fill(&lanes, at(9, 0), at(11, 0), TimeDelta::minutes(60));
        assert_eq!(filled.len(), 1);
        let lane = &filled[0];
        assert_eq!(lane.len(), 2);
        assert!(lane.iter().all(LaneEntry::is_placeholder));
        assert_contiguous(lane, at(9, 0), at(11, 0));
        assert_eq!(lane[0].title, PLACEHOLDER_TITLE);
    }

    #[test]
    fn gaps_end_with_a_partial_block() {
        let event = Event::bare("a", at(10, 20), at(11, 0), TimeDelta::minutes(15));
        let lanes = vec![vec![&event]];
        let filled = fill(&lanes, at(8, 0), at(13, 0), TimeDelta::minutes(60));
        let lane = &filled[0];
        assert_contiguous(lane, at(8, 0), at(13, 0));

        let spans: Vec<(DateTime<Utc>, DateTime<Utc>, bool)> =
            lane.iter().map(|e| (e.start, e.end, e.is_placeholder())).collect();
        assert_eq!(
            spans,
            vec![
                (at(8, 0), at(9, 0), true),
                (at(9, 0), at(10, 0), true),
                (at(10, 0), at(10, 20), true),
                (at(10, 20), at(11, 15), false),
                (at(11, 15), at(12, 15), true),
                (at(12, 15), at(13, 0), true),
            ]
        );
        assert_eq!(lane[3].event_id(), Some("a"));
    }

    #[test]
    fn adjacent_events_have_no_placeholder_between() {
        let a = Event::bare("a", at(9, 0), at(10, 0), TimeDelta::zero());
        let b = Event::bare("b", at(10, 0), at(11, 0), TimeDelta::zero());
        let lanes = vec![vec![&a, &b]];
        let filled = fill(&lanes, at(9, 0), at(11, 0), TimeDelta::minutes(60));
        assert_eq!(filled[0].len(), 2);
        assert!(filled[0].iter().all(|e| !e.is_placeholder()));
    }

    #[test]
    fn placeholder_ids_are_deterministic() {
        let lanes: Vec<Vec<&Event>> = vec![Vec::new(), Vec::new()];
        let first = fill(&lanes, at(9, 0), at(10, 0), TimeDelta::minutes(30));
        let second = fill(&lanes, at(9, 0), at(10, 0), TimeDelta::minutes(30));
        assert_eq!(first, second);
        assert_eq!(first[1][0].entry_id, "placeholder-2-2026-10-19T09:00:00+00:00");
        assert_eq!(first[1][0].lane_id, LaneId::new(2));
    }

    #[test]
    fn non_positive_block_fills_each_gap_once() {
        let lanes: Vec<Vec<&Event>> = vec![Vec::new()];
        let filled = fill(&lanes, at(9, 0), at(12, 0), TimeDelta::zero());
        assert_eq!(filled[0].len(), 1);
        assert_contiguous(&filled[0], at(9, 0), at(12, 0));
    }

    #[test]
    fn inverted_window_emits_nothing() {
        let lanes: Vec<Vec<&Event>> = vec![Vec::new()];
        let filled = fill(&lanes, at(12, 0), at(9, 0), TimeDelta::minutes(60));
        assert!(filled[0].is_empty());
    }

    #[test]
    fn lane_numbering() {
        let lanes = Lane::numbered(3, 9000, "Peacock Sports");
        assert_eq!(lanes[2].id, LaneId::new(3));
        assert_eq!(lanes[2].logical_number, 9002);
        assert_eq!(lanes[2].name, "Peacock Sports 3");
    }
}
