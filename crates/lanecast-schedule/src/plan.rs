//! One full scheduling pass: pick eligible events, pack them and fill every
//! lane over the shared window.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};

use lanecast_core::config::ScheduleConfig;

use crate::event::Event;
use crate::fill::{fill, Lane, LaneEntry};
use crate::pack::pack;
use crate::window::Window;

/// Scheduler settings, usually taken from [`ScheduleConfig`].
#[derive(Debug, Clone)]
pub struct PlanSettings {
    pub lanes: u32,
    pub lane_start_number: u32,
    pub lane_name_prefix: String,
    pub block: TimeDelta,
    pub extra: TimeDelta,
    pub horizon: TimeDelta,
}

impl PlanSettings {
    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self {
            lanes: config.lanes,
            lane_start_number: config.lane_start_number,
            lane_name_prefix: config.lane_name_prefix.clone(),
            block: config.placeholder_block(),
            extra: config.extra_days(),
            horizon: config.horizon(),
        }
    }
}

/// A complete schedule ready to persist or export.
#[derive(Debug, Clone)]
pub struct Plan {
    pub window: Window,
    pub lanes: Vec<Lane>,
    /// `entries[i]` is the timeline of `lanes[i]`.
    pub entries: Vec<Vec<LaneEntry>>,
    pub overflow: Vec<String>,
    pub out_of_horizon: usize,
}

impl Plan {
    pub fn packed_count(&self) -> usize {
        self.entries
            .iter()
            .flatten()
            .filter(|e| !e.is_placeholder())
            .count()
    }

    pub fn placeholder_count(&self) -> usize {
        self.entries
            .iter()
            .flatten()
            .filter(|e| e.is_placeholder())
            .count()
    }

    /// All entries, lane by lane, each lane in start order.
    pub fn all_entries(&self) -> impl Iterator<Item = &LaneEntry> {
        self.entries.iter().flatten()
    }
}

/// Schedule `events` relative to `now`.
///
/// Only events whose padded end is after `now` and whose start is before
/// `now + horizon` are considered. They are stable-sorted by start, so
/// equal starts keep the order they were given in. `now` is truncated to
/// whole seconds, the precision instants are persisted with.
pub fn plan(events: &[Event], settings: &PlanSettings, now: DateTime<Utc>) -> Plan {
    let now = now.trunc_subsecs(0);
    let horizon_end = now + settings.horizon;
    let mut eligible: Vec<Event> = events
        .iter()
        .filter(|e| e.overlaps(now, horizon_end))
        .cloned()
        .collect();
    let out_of_horizon = events.len() - eligible.len();
    eligible.sort_by_key(|e| e.start);

    let start = Window::start_for(now, eligible.first().map(|e| e.start));
    let packing = pack(&eligible, settings.lanes, start);
    let end = Window::end_for(now, packing.latest_end(), settings.extra);
    let window = Window { start, end };

    let entries = fill(&packing.lanes, window.start, window.end, settings.block);
    let overflow: Vec<String> = packing.overflow.iter().map(|e| e.id.clone()).collect();

    tracing::info!(
        eligible = eligible.len(),
        packed = packing.packed_count(),
        overflowed = overflow.len(),
        out_of_horizon,
        window_start = %window.start,
        window_end = %window.end,
        "Planned lane schedule"
    );

    Plan {
        window,
        lanes: Lane::numbered(settings.lanes, settings.lane_start_number, &settings.lane_name_prefix),
        entries,
        overflow,
        out_of_horizon,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lanecast_core::LaneId;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, d, h, m, 0).unwrap()
    }

    fn settings(lanes: u32) -> PlanSettings {
        PlanSettings {
            lanes,
            lane_start_number: 9000,
            lane_name_prefix: "Peacock Sports".into(),
            block: TimeDelta::minutes(60),
            extra: TimeDelta::days(1),
            horizon: TimeDelta::days(7),
        }
    }

    fn ev(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        Event::bare(id, start, end, TimeDelta::minutes(45))
    }

    #[test]
    fn every_lane_covers_the_same_window() {
        let events = vec![
            ev("a", at(19, 10, 0), at(19, 12, 0)),
            ev("b", at(19, 10, 30), at(19, 11, 0)),
            ev("c", at(20, 18, 5), at(20, 20, 0)),
        ];
        let plan = plan(&events, &settings(3), at(19, 9, 20));
        assert_eq!(plan.window.start, at(19, 8, 0));
        assert_eq!(plan.window.end, at(21, 20, 0));
        assert_eq!(plan.lanes.len(), 3);
        assert_eq!(plan.lanes[0].id, LaneId::new(1));
        for lane in &plan.entries {
            assert_eq!(lane.first().map(|e| e.start), Some(plan.window.start));
            assert_eq!(lane.last().map(|e| e.end), Some(plan.window.end));
            for pair in lane.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
        }
        assert_eq!(plan.packed_count(), 3);
        assert!(plan.overflow.is_empty());
    }

    #[test]
    fn past_and_far_future_events_are_dropped() {
        let events = vec![
            ev("past", at(19, 5, 0), at(19, 6, 0)),
            ev("live", at(19, 8, 0), at(19, 9, 0)),
            ev("far", at(28, 9, 0), at(28, 10, 0)),
        ];
        let plan = plan(&events, &settings(2), at(19, 9, 20));
        assert_eq!(plan.out_of_horizon, 2);
        let ids: Vec<&str> = plan.all_entries().filter_map(|e| e.event_id()).collect();
        assert_eq!(ids, vec!["live"]);
        assert_eq!(plan.window.start, at(19, 7, 0));
    }

    #[test]
    fn sub_second_now_yields_whole_second_entries() {
        let now = at(19, 9, 20) + TimeDelta::milliseconds(750);
        let events = vec![ev("a", at(19, 10, 0), at(19, 12, 0))];
        let plan = plan(&events, &settings(1), now);
        assert!(plan
            .all_entries()
            .all(|e| e.start.timestamp_subsec_nanos() == 0 && e.end.timestamp_subsec_nanos() == 0));
    }

    #[test]
    fn no_events_still_covers_every_lane() {
        let plan = plan(&[], &settings(2), at(19, 9, 20));
        assert_eq!(plan.window.start, at(19, 8, 0));
        assert_eq!(plan.window.end, at(20, 9, 0));
        assert_eq!(plan.packed_count(), 0);
        assert_eq!(plan.placeholder_count(), 2 * 25);
    }

    #[test]
    fn unsorted_input_is_packed_in_start_order() {
        let events = vec![
            ev("late", at(19, 12, 0), at(19, 13, 0)),
            ev("early", at(19, 10, 0), at(19, 11, 0)),
        ];
        let plan = plan(&events, &settings(1), at(19, 9, 0));
        let ids: Vec<&str> = plan.all_entries().filter_map(|e| e.event_id()).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[test]
    fn overflow_is_reported_by_id() {
        let events = vec![
            ev("a", at(19, 10, 0), at(19, 11, 0)),
            ev("b", at(19, 10, 0), at(19, 11, 0)),
        ];
        let plan = plan(&events, &settings(1), at(19, 9, 0));
        assert_eq!(plan.overflow, vec!["b".to_string()]);
    }
}
