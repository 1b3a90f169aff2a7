//! lanecast: packs live events onto a fixed set of virtual lanes and
//! publishes them as XMLTV guides and M3U playlists.
//!
//! The stages live in the member crates; this crate wires them to the
//! catalog, the database and the filesystem.

pub mod build;
pub mod export;
pub mod ingest;
pub mod refresh;
