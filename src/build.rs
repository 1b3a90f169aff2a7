//! Rebuild the lane schedule from the stored events.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use lanecast_core::config::ScheduleConfig;
use lanecast_core::Result;
use lanecast_db::queries::{events, lanes};
use lanecast_schedule::{plan, Event, LaneEntry, Normalizer, PlanSettings, Rejection, Window};

/// Counts from one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub loaded: usize,
    pub rejected: usize,
    pub denied: usize,
    pub out_of_horizon: usize,
    pub packed: usize,
    pub overflow: Vec<String>,
    pub placeholders: usize,
    pub lanes: u32,
    pub window: Window,
}

/// Normalize stored events. Returns the events plus `(rejected, denied)`.
pub fn load_events(conn: &Connection, normalizer: &Normalizer) -> Result<(Vec<Event>, usize, usize)> {
    let records = events::list_events(conn)?;
    let mut out = Vec::with_capacity(records.len());
    let mut rejected = 0;
    let mut denied = 0;

    for record in records {
        match normalizer.normalize(&record.id, &record.raw_attributes) {
            Ok(event) => out.push(event),
            Err(Rejection::DeniedChannel(channel)) => {
                tracing::debug!(event = %record.id, "Skipping denied channel {}", channel);
                denied += 1;
            }
            Err(reason) => {
                tracing::debug!(event = %record.id, "Skipping event: {}", reason);
                rejected += 1;
            }
        }
    }

    Ok((out, rejected, denied))
}

/// Plan lanes for every stored event and replace the persisted schedule.
pub fn build_lanes(conn: &Connection, config: &ScheduleConfig, now: DateTime<Utc>) -> Result<BuildReport> {
    let normalizer = Normalizer::from_config(config);
    let (events, rejected, denied) = load_events(conn, &normalizer)?;
    let loaded = events.len() + rejected + denied;

    let settings = PlanSettings::from_config(config);
    let plan = plan(&events, &settings, now);

    let entries: Vec<LaneEntry> = plan.all_entries().cloned().collect();
    lanes::replace_schedule(conn, &plan.lanes, &entries)?;

    let report = BuildReport {
        loaded,
        rejected,
        denied,
        out_of_horizon: plan.out_of_horizon,
        packed: plan.packed_count(),
        overflow: plan.overflow.clone(),
        placeholders: plan.placeholder_count(),
        lanes: settings.lanes,
        window: plan.window,
    };

    if !report.overflow.is_empty() {
        tracing::warn!(
            "{} event(s) did not fit on {} lanes",
            report.overflow.len(),
            report.lanes
        );
    }
    tracing::info!(
        loaded = report.loaded,
        packed = report.packed,
        placeholders = report.placeholders,
        "Built lane schedule"
    );
    Ok(report)
}
