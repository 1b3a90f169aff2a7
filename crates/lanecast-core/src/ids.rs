//! Lane identifiers.
//!
//! Lanes are numbered `1..=N` for a run. The number is what external
//! channel ids are derived from, so it is kept distinct from the logical
//! channel number (which is offset by a configured base).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// One-based index of a virtual lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneId(u32);

impl LaneId {
    /// Wrap a raw one-based lane number.
    #[must_use]
    pub const fn new(n: u32) -> Self {
        Self(n)
    }

    /// The raw lane number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Zero-based position of this lane in per-lane vectors.
    #[must_use]
    pub const fn index(self) -> usize {
        (self.0 as usize).saturating_sub(1)
    }

    /// Iterate `1..=count` in lane order.
    pub fn range(count: u32) -> impl Iterator<Item = LaneId> {
        (1..=count).map(LaneId)
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LaneId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<u32> for LaneId {
    fn from(n: u32) -> Self {
        Self(n)
    }
}

impl From<LaneId> for u32 {
    fn from(id: LaneId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_one_based() {
        let ids: Vec<u32> = LaneId::range(3).map(LaneId::get).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(LaneId::new(1).index(), 0);
    }

    #[test]
    fn parse_and_display() {
        let id: LaneId = "12".parse().unwrap();
        assert_eq!(id, LaneId::new(12));
        assert_eq!(id.to_string(), "12");
        assert!("x".parse::<LaneId>().is_err());
    }
}
