//! lanecast-core: shared types, errors, configuration and time helpers.
//!
//! This crate is the foundational dependency for the other lanecast crates,
//! providing the unified error type, lane identifiers, the TOML-backed
//! application configuration and the UTC instant arithmetic used by the
//! scheduler and the exporters.

pub mod config;
pub mod error;
pub mod ids;
pub mod time;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::LaneId;
