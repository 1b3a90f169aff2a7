use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lanecast")]
#[command(author, version, about = "Pack live events onto virtual lanes and export guides and playlists")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Pin the current time (RFC 3339) for reproducible output
    #[arg(long, global = true, value_parser = parse_now)]
    pub now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    pub command: Commands,
}

fn parse_now(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 time '{s}': {e}"))
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the catalog and upsert its events
    Ingest {
        /// Read the catalog response from a file instead of fetching it
        #[arg(long)]
        file: Option<PathBuf>,

        /// Catalog node to fetch (overrides catalog.slug)
        #[arg(long)]
        slug: Option<String>,
    },

    /// Rebuild the lane schedule from stored events
    Build {
        /// Number of lanes (overrides schedule.lanes)
        #[arg(long)]
        lanes: Option<u32>,

        /// Days ahead to schedule (overrides schedule.days_ahead)
        #[arg(long)]
        days_ahead: Option<u32>,
    },

    /// Write guides and playlists from the stored schedule
    Export {
        /// Output directory (overrides export.out_dir)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Ingest, build and export in one run
    Refresh {
        /// Reuse the stored events instead of fetching the catalog
        #[arg(long)]
        skip_ingest: bool,

        /// Read the catalog response from a file instead of fetching it
        #[arg(long, conflicts_with = "skip_ingest")]
        file: Option<PathBuf>,
    },

    /// Print the deep link a lane should play now
    Deeplink {
        /// Lane id (1-based)
        lane_id: u32,

        /// Print the decoded payload as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate,

    /// Display version information
    Version,
}
