//! Database query modules.

pub mod events;
pub mod images;
pub mod lanes;
