//! lanecast-db: database access and persistence layer.
//!
//! This crate provides SQLite-backed storage with connection pooling,
//! embedded migrations, typed models, and query modules for events, their
//! images and the lane schedule.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
pub mod schema;
