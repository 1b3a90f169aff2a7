//! The refresh driver: ingest, build and export as one non-overlapping run.
//!
//! A second trigger while a run is in flight is rejected with
//! [`Error::Conflict`] rather than queued. The whole run is bounded by
//! `refresh.timeout_secs`; when that expires the run is reported as failed,
//! but blocking stages already handed to the thread pool finish on their own.

use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Mutex;

use lanecast_core::config::Config;
use lanecast_core::{Error, Result};
use lanecast_db::pool::{get_conn, DbPool};

use crate::build::{build_lanes, BuildReport};
use crate::export::{export_all, ExportReport};
use crate::ingest::{fetch_catalog, ingest_items, load_catalog_file, IngestReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Failed,
}

/// Outcome of one refresh. Stage reports are present for every stage that
/// completed before the run ended.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Instant the schedule was anchored on.
    pub now: DateTime<Utc>,
    pub error: Option<String>,
    pub ingest: Option<IngestReport>,
    pub build: Option<BuildReport>,
    pub export: Option<ExportReport>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Succeeded
    }
}

#[derive(Debug, Clone, Default)]
pub struct RefreshOptions {
    pub skip_ingest: bool,
    /// Read the catalog from this file instead of fetching it.
    pub catalog_file: Option<PathBuf>,
    /// Pin the wall clock; defaults to the current time.
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Stages {
    ingest: Option<IngestReport>,
    build: Option<BuildReport>,
    export: Option<ExportReport>,
}

pub struct RefreshDriver {
    config: Config,
    pool: DbPool,
    lock: Mutex<()>,
    last: RwLock<Option<RunReport>>,
}

impl RefreshDriver {
    pub fn new(config: Config, pool: DbPool) -> Self {
        Self {
            config,
            pool,
            lock: Mutex::new(()),
            last: RwLock::new(None),
        }
    }

    /// The report of the most recent finished run, if any.
    pub fn last_report(&self) -> Option<RunReport> {
        self.last.read().clone()
    }

    pub fn is_running(&self) -> bool {
        self.lock.try_lock().is_err()
    }

    /// Run every stage once. Returns `Err` only when another run holds the
    /// lock; stage failures and timeouts come back as a failed report.
    pub async fn refresh(&self, options: RefreshOptions) -> Result<RunReport> {
        let _guard = self
            .lock
            .try_lock()
            .map_err(|_| Error::Conflict("a refresh is already in progress".into()))?;

        let started_at = Utc::now();
        let now = options.now.unwrap_or(started_at);
        let timer = Instant::now();
        tracing::info!(now = %now, "Starting refresh");

        let mut stages = Stages::default();
        let outcome = with_budget(
            self.config.refresh.timeout_secs,
            self.run_stages(&options, now, &mut stages),
        )
        .await;

        let report = RunReport {
            status: if outcome.is_ok() {
                RunStatus::Succeeded
            } else {
                RunStatus::Failed
            },
            started_at,
            finished_at: Utc::now(),
            duration_ms: timer.elapsed().as_millis() as u64,
            now,
            error: outcome.err().map(|e| e.to_string()),
            ingest: stages.ingest,
            build: stages.build,
            export: stages.export,
        };

        match &report.error {
            None => tracing::info!(duration_ms = report.duration_ms, "Refresh complete"),
            Some(e) => tracing::error!("Refresh failed: {}", e),
        }

        *self.last.write() = Some(report.clone());
        Ok(report)
    }

    async fn run_stages(
        &self,
        options: &RefreshOptions,
        now: DateTime<Utc>,
        stages: &mut Stages,
    ) -> Result<()> {
        if !options.skip_ingest {
            let items = match &options.catalog_file {
                Some(path) => {
                    let path = path.clone();
                    blocking("ingest", move || load_catalog_file(&path)).await?
                }
                None => fetch_catalog(&self.config.catalog, &self.config.catalog.slug).await?,
            };
            let pool = self.pool.clone();
            stages.ingest = Some(
                blocking("ingest", move || {
                    let conn = get_conn(&pool)?;
                    ingest_items(&conn, &items, now)
                })
                .await?,
            );
        }

        let pool = self.pool.clone();
        let schedule = self.config.schedule.clone();
        stages.build = Some(
            blocking("build", move || {
                let conn = get_conn(&pool)?;
                build_lanes(&conn, &schedule, now)
            })
            .await?,
        );

        let pool = self.pool.clone();
        let export = self.config.export.clone();
        stages.export = Some(
            blocking("export", move || {
                let conn = get_conn(&pool)?;
                export_all(&conn, &export, now)
            })
            .await?,
        );

        Ok(())
    }
}

/// Run a synchronous stage on the blocking pool.
async fn blocking<T, F>(step: &'static str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::pipeline(step, e.to_string()))?
}

async fn with_budget<F>(timeout_secs: u64, fut: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    tokio::time::timeout(Duration::from_secs(timeout_secs), fut)
        .await
        .map_err(|_| Error::Timeout(timeout_secs))?
}
