//! First-fit greedy interval packing.

use chrono::{DateTime, Utc};

use crate::event::Event;

/// Result of packing a start-ordered event sequence onto lanes.
#[derive(Debug, Clone, Default)]
pub struct Packing<'a> {
    /// One start-ordered sequence per lane; index 0 is lane 1.
    pub lanes: Vec<Vec<&'a Event>>,
    /// Events that found every lane busy at their start.
    pub overflow: Vec<&'a Event>,
}

impl<'a> Packing<'a> {
    pub fn packed_count(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    /// The latest padded end across all packed events.
    pub fn latest_end(&self) -> Option<DateTime<Utc>> {
        self.lanes
            .iter()
            .flatten()
            .map(|e| e.end_padded)
            .max()
    }
}

/// Assign `events` to `lane_count` lanes.
///
/// `events` must already be ordered by start; ties keep the caller's order.
/// Each lane tracks the instant it becomes free, starting at
/// `window_start`. An event goes to the lowest-numbered lane free at or
/// before its start, and that lane is then busy until the event's padded
/// end. Events that fit nowhere are returned as overflow.
pub fn pack<'a>(events: &'a [Event], lane_count: u32, window_start: DateTime<Utc>) -> Packing<'a> {
    let mut free_at = vec![window_start; lane_count as usize];
    let mut packing = Packing {
        lanes: vec![Vec::new(); lane_count as usize],
        overflow: Vec::new(),
    };

    for event in events {
        match free_at.iter().position(|free| *free <= event.start) {
            Some(lane) => {
                free_at[lane] = event.end_padded;
                packing.lanes[lane].push(event);
            }
            None => {
                tracing::debug!(event = %event.id, start = %event.start, "No free lane; overflowed");
                packing.overflow.push(event);
            }
        }
    }

    packing
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, h, m, 0).unwrap()
    }

    fn ev(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        Event::bare(id, start, end, TimeDelta::zero())
    }

    fn ids(lane: &[&Event]) -> Vec<String> {
        lane.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn third_concurrent_event_overflows_two_lanes() {
        let events = vec![
            ev("a", at(9, 0), at(10, 0)),
            ev("b", at(9, 30), at(10, 30)),
            ev("c", at(9, 45), at(10, 15)),
        ];
        let packing = pack(&events, 2, at(8, 0));
        assert_eq!(ids(&packing.lanes[0]), vec!["a"]);
        assert_eq!(ids(&packing.lanes[1]), vec!["b"]);
        assert_eq!(ids(&packing.overflow), vec!["c"]);
        assert_eq!(packing.packed_count(), 2);
    }

    #[test]
    fn back_to_back_events_share_a_lane() {
        let events = vec![
            ev("a", at(9, 0), at(10, 0)),
            ev("b", at(10, 0), at(11, 0)),
        ];
        let packing = pack(&events, 3, at(8, 0));
        assert_eq!(ids(&packing.lanes[0]), vec!["a", "b"]);
        assert!(packing.lanes[1].is_empty());
        assert_eq!(packing.latest_end(), Some(at(11, 0)));
    }

    #[test]
    fn padding_blocks_the_lane() {
        let events = vec![
            Event::bare("a", at(9, 0), at(10, 0), TimeDelta::minutes(45)),
            Event::bare("b", at(10, 30), at(11, 0), TimeDelta::minutes(45)),
        ];
        let packing = pack(&events, 2, at(8, 0));
        assert_eq!(ids(&packing.lanes[0]), vec!["a"]);
        assert_eq!(ids(&packing.lanes[1]), vec!["b"]);
    }

    #[test]
    fn ties_follow_input_order() {
        let events = vec![ev("y", at(9, 0), at(10, 0)), ev("x", at(9, 0), at(10, 0))];
        let packing = pack(&events, 2, at(8, 0));
        assert_eq!(ids(&packing.lanes[0]), vec!["y"]);
        assert_eq!(ids(&packing.lanes[1]), vec!["x"]);
    }

    #[test]
    fn zero_lanes_overflows_everything() {
        let events = vec![ev("a", at(9, 0), at(10, 0))];
        let packing = pack(&events, 0, at(8, 0));
        assert!(packing.lanes.is_empty());
        assert_eq!(packing.overflow.len(), 1);
    }

    #[test]
    fn first_fit_picks_lowest_free_lane() {
        let events: Vec<Event> = (0..12)
            .map(|i| {
                let start = at(8, 0) + TimeDelta::minutes(i * 20);
                ev(&format!("e{i}"), start, start + TimeDelta::minutes(50 + (i % 3) * 25))
            })
            .collect();
        let window_start = at(7, 0);
        let packing = pack(&events, 3, window_start);

        // Replay: every assignment went to the first lane free at the start.
        let mut free_at = vec![window_start; 3];
        for event in &events {
            let expected = free_at.iter().position(|f| *f <= event.start);
            let actual = packing
                .lanes
                .iter()
                .position(|lane| lane.iter().any(|e| e.id == event.id));
            assert_eq!(expected, actual, "event {}", event.id);
            if let Some(lane) = expected {
                free_at[lane] = event.end_padded;
            }
        }

        for lane in &packing.lanes {
            for pair in lane.windows(2) {
                assert!(pair[0].end_padded <= pair[1].start);
            }
        }
    }
}
