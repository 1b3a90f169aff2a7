//! The shared schedule window every lane covers.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use lanecast_core::time::floor_hour;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Window start: one hour before the earlier of `now` and the earliest
    /// event start, each floored to the hour.
    pub fn start_for(now: DateTime<Utc>, earliest_start: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let hour = TimeDelta::hours(1);
        let from_now = floor_hour(now) - hour;
        match earliest_start {
            Some(earliest) => from_now.min(floor_hour(earliest) - hour),
            None => from_now,
        }
    }

    /// Window end: the latest padded end plus `extra`, floored to the hour.
    /// With nothing packed the window runs `extra` past `now`.
    pub fn end_for(
        now: DateTime<Utc>,
        latest_end: Option<DateTime<Utc>>,
        extra: TimeDelta,
    ) -> DateTime<Utc> {
        floor_hour(latest_end.unwrap_or(now) + extra)
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, d, h, m, 0).unwrap()
    }

    #[test]
    fn start_uses_the_earlier_anchor() {
        assert_eq!(Window::start_for(at(19, 9, 40), Some(at(19, 11, 0))), at(19, 8, 0));
        assert_eq!(Window::start_for(at(19, 9, 40), Some(at(19, 6, 59))), at(19, 5, 0));
        assert_eq!(Window::start_for(at(19, 9, 40), None), at(19, 8, 0));
    }

    #[test]
    fn end_adds_extra_days_and_floors() {
        let extra = TimeDelta::days(5);
        assert_eq!(Window::end_for(at(19, 9, 0), Some(at(19, 22, 45)), extra), at(24, 22, 0));
        assert_eq!(Window::end_for(at(19, 9, 40), None, extra), at(24, 9, 0));
    }
}
