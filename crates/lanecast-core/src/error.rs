//! Unified error type for lanecast.
//!
//! All crates funnel their failures into [`Error`]. Per-event problems
//! (malformed attributes, missing identifiers, lane overflow) are never
//! errors; they are skipped and counted by the stage that sees them.

use std::fmt;

/// Unified error type covering all failure modes in lanecast.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "lane", "event").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Configuration or input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation conflicts with one already in flight.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Fetching or decoding the upstream catalog failed.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// The database has no schedule to export.
    #[error(
        "Missing tables: {}. Run `lanecast refresh` to build the schedule first",
        tables.join(", ")
    )]
    MissingSchema {
        /// Names of the tables that were not found.
        tables: Vec<String>,
    },

    /// Rendering an output document failed.
    #[error("Export error [{format}]: {message}")]
    Export {
        /// The document format being written ("xmltv", "m3u").
        format: String,
        /// Human-readable error description.
        message: String,
    },

    /// A pipeline stage failed.
    #[error("Pipeline error [{step}]: {message}")]
    Pipeline {
        /// The pipeline stage that failed.
        step: String,
        /// Human-readable error description.
        message: String,
    },

    /// A run exceeded its wall-clock budget.
    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// The schema exists but no schedule build has completed.
    #[error("No schedule has been built. Run `lanecast refresh` to build the schedule first")]
    ScheduleNotBuilt,
}

impl Error {
    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::Catalog`].
    pub fn catalog(message: impl fmt::Display) -> Self {
        Error::Catalog(message.to_string())
    }

    /// Convenience constructor for [`Error::Export`].
    pub fn export(format: impl Into<String>, message: impl fmt::Display) -> Self {
        Error::Export {
            format: format.into(),
            message: message.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Pipeline`].
    pub fn pipeline(step: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Pipeline {
            step: step.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
