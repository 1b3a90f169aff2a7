mod cli;

use lanecast::{build, export, ingest, refresh};
use lanecast_core::config::Config;
use lanecast_core::{Error, LaneId};
use lanecast_db::pool::{get_conn, init_pool, open_existing};
use lanecast_db::queries::lanes;
use lanecast_db::schema::check_schedule_built;
use lanecast_export::deeplink;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;
use cli::{Cli, Commands};
use serde::Serialize;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "lanecast=debug,lanecast_schedule=debug,lanecast_export=debug,lanecast_db=debug".to_string()
        } else {
            "lanecast=info,lanecast_schedule=info,lanecast_export=info,lanecast_db=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let now = cli.now.unwrap_or_else(Utc::now);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Ingest { file, slug } => run_ingest(config_path, file, slug, now),
        Commands::Build { lanes, days_ahead } => run_build(config_path, lanes, days_ahead, now),
        Commands::Export { out_dir } => run_export(config_path, out_dir, now),
        Commands::Refresh { skip_ingest, file } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_refresh(config_path, skip_ingest, file, cli.now))
        }
        Commands::Deeplink { lane_id, json } => print_deeplink(config_path, lane_id, json, now),
        Commands::Validate => validate_config(config_path),
        Commands::Version => {
            println!("lanecast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_ingest(
    config_path: Option<&Path>,
    file: Option<PathBuf>,
    slug: Option<String>,
    now: DateTime<Utc>,
) -> Result<()> {
    let config = Config::load_or_default(config_path)?;

    let items = match file {
        Some(path) => ingest::load_catalog_file(&path)?,
        None => {
            let slug = slug.unwrap_or_else(|| config.catalog.slug.clone());
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(ingest::fetch_catalog(&config.catalog, &slug))?
        }
    };

    let pool = init_pool(&config.database.path)?;
    let conn = get_conn(&pool)?;
    let report = ingest::ingest_items(&conn, &items, now)?;
    print_json(&report)
}

fn run_build(
    config_path: Option<&Path>,
    lanes: Option<u32>,
    days_ahead: Option<u32>,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut config = Config::load_or_default(config_path)?;
    if let Some(lanes) = lanes {
        config.schedule.lanes = lanes;
    }
    if let Some(days) = days_ahead {
        config.schedule.days_ahead = days;
    }
    config.check()?;

    let pool = init_pool(&config.database.path)?;
    let conn = get_conn(&pool)?;
    let report = build::build_lanes(&conn, &config.schedule, now)?;
    print_json(&report)
}

fn run_export(config_path: Option<&Path>, out_dir: Option<PathBuf>, now: DateTime<Utc>) -> Result<()> {
    let mut config = Config::load_or_default(config_path)?;
    if let Some(dir) = out_dir {
        config.export.out_dir = dir;
    }

    let report = export::export_database(&config.database.path, &config.export, now)?;
    print_json(&report)
}

async fn run_refresh(
    config_path: Option<&Path>,
    skip_ingest: bool,
    file: Option<PathBuf>,
    now: Option<DateTime<Utc>>,
) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let pool = init_pool(&config.database.path)?;
    let driver = refresh::RefreshDriver::new(config, pool);

    let report = driver
        .refresh(refresh::RefreshOptions {
            skip_ingest,
            catalog_file: file,
            now,
        })
        .await?;
    print_json(&report)?;

    if let Some(error) = report.error {
        anyhow::bail!("Refresh failed: {error}");
    }
    Ok(())
}

fn print_deeplink(config_path: Option<&Path>, lane_id: u32, json: bool, now: DateTime<Utc>) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let pool = open_existing(&config.database.path)?;
    let conn = get_conn(&pool)?;
    check_schedule_built(&conn)?;

    let lane = LaneId::new(lane_id);
    if lanes::get_lane(&conn, lane)?.is_none() {
        return Err(Error::not_found("lane", lane).into());
    }
    let pvid = lanes::current_lane_pvid(&conn, lane, now)?
        .ok_or_else(|| Error::not_found("playable event on lane", lane))?;

    let url = deeplink::encode(&pvid);
    if json {
        print_json(&serde_json::json!({
            "lane": lane_id,
            "pvid": pvid,
            "url": url,
            "payload": deeplink::decode(&url),
        }))
    } else {
        println!("{url}");
        Ok(())
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            Config::load(p)?
        }
        None => {
            println!("No config file specified, searching default locations");
            Config::load_or_default(None)?
        }
    };

    println!("✓ Configuration is valid");
    println!("  Database: {}", config.database.path.display());
    println!(
        "  Lanes: {} (numbered from {})",
        config.schedule.lanes, config.schedule.lane_start_number
    );
    println!("  Days ahead: {}", config.schedule.days_ahead);
    println!("  Output directory: {}", config.export.out_dir.display());

    let warnings = config.validate();
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &warnings {
            println!("  - {warning}");
        }
    }

    Ok(())
}
