//! lanecast-schedule: turns raw catalog records into a fully covered lane
//! schedule.
//!
//! The stages run in order and are pure functions of their inputs:
//!
//! - [`normalize`]: raw attribute record to canonical [`Event`]
//! - [`pack`]: first-fit assignment of events to a fixed number of lanes
//! - [`fill`]: placeholder blocks over every idle interval of every lane
//! - [`plan`]: window computation and the three stages above in one call

pub mod event;
pub mod fill;
pub mod normalize;
pub mod pack;
pub mod plan;
pub mod window;

pub use event::Event;
pub use fill::{fill, EntryKind, Lane, LaneEntry, PLACEHOLDER_TITLE};
pub use normalize::{Normalizer, Rejection};
pub use pack::{pack, Packing};
pub use plan::{plan, Plan, PlanSettings};
pub use window::Window;
