//! Write the guide and playlist documents from a persisted schedule.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use lanecast_core::config::ExportConfig;
use lanecast_core::{Error, Result};
use lanecast_db::models::ScheduledEntry;
use lanecast_db::pool::{get_conn, open_existing};
use lanecast_db::queries::{images, lanes};
use lanecast_db::schema::check_schedule_built;
use lanecast_export::{
    direct_channels, direct_guide, direct_playlist, lane_guide, lane_playlist, EventMeta, Image,
    LaneLinkMode, LaneSchedule, RenderOptions, ScheduleRow,
};

/// Paths written and counts rendered by one export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub lanes: usize,
    pub programmes: usize,
    pub direct_channels: usize,
    pub files: Vec<PathBuf>,
}

fn meta_for(row: &ScheduledEntry, images: &HashMap<String, Vec<Image>>) -> Option<EventMeta> {
    let id = row.event_id.clone()?;
    Some(EventMeta {
        images: images.get(&id).cloned().unwrap_or_default(),
        id,
        pvid: row.pvid.clone(),
        title: row.event_title.clone(),
        synopsis: row.synopsis.clone(),
        synopsis_brief: row.synopsis_brief.clone(),
        channel_name: row.channel_name.clone(),
        genres: row.genres.clone(),
    })
}

/// Read lanes, entries and artwork into the shape the renderers take.
pub fn load_lane_schedule(conn: &Connection) -> Result<LaneSchedule> {
    let lanes: Vec<_> = lanes::list_lanes(conn)?.iter().map(|l| l.to_lane()).collect();

    let mut by_event: HashMap<String, Vec<Image>> = HashMap::new();
    for image in images::list_images(conn)? {
        by_event.entry(image.event_id).or_default().push(Image {
            kind: image.img_type,
            url: image.url,
        });
    }

    let rows = lanes::load_schedule(conn)?
        .iter()
        .map(|row| ScheduleRow {
            entry: row.to_lane_entry(),
            meta: meta_for(row, &by_event),
        })
        .collect();

    Ok(LaneSchedule::new(lanes, rows))
}

fn write_file(path: &Path, contents: &str, format: &str) -> Result<()> {
    std::fs::write(path, contents)
        .map_err(|e| Error::export(format, format!("failed to write {}: {e}", path.display())))?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

/// Render every output document into `config.out_dir`.
pub fn export_all(conn: &Connection, config: &ExportConfig, now: DateTime<Utc>) -> Result<ExportReport> {
    check_schedule_built(conn)?;
    std::fs::create_dir_all(&config.out_dir)?;

    let schedule = load_lane_schedule(conn)?;
    let options = RenderOptions::from_config(config);
    let mut files = Vec::new();

    let guide = lane_guide(&schedule, &options)?;
    write_file(&config.lanes_xml_path(), &guide, "xmltv")?;
    files.push(config.lanes_xml_path());

    let indirect = LaneLinkMode::Indirect {
        server_url: config.server_url.clone(),
    };
    write_file(&config.lanes_m3u_path(), &lane_playlist(&schedule, &indirect, now), "m3u")?;
    files.push(config.lanes_m3u_path());

    let chrome = lane_playlist(&schedule, &LaneLinkMode::Chrome, now);
    write_file(&config.chrome_m3u_path(), &chrome, "m3u")?;
    files.push(config.chrome_m3u_path());

    let channels = direct_channels(&schedule, now, options.direct_horizon);
    write_file(&config.direct_xml_path(), &direct_guide(&channels, now, &options)?, "xmltv")?;
    files.push(config.direct_xml_path());
    write_file(&config.direct_m3u_path(), &direct_playlist(&channels, &options), "m3u")?;
    files.push(config.direct_m3u_path());

    if let Some(path) = config.lanes_direct_m3u_path() {
        write_file(&path, &lane_playlist(&schedule, &LaneLinkMode::Direct, now), "m3u")?;
        files.push(path);
    }

    let report = ExportReport {
        lanes: schedule.lanes.len(),
        programmes: schedule.rows.len(),
        direct_channels: channels.len(),
        files,
    };
    tracing::info!(
        lanes = report.lanes,
        programmes = report.programmes,
        direct_channels = report.direct_channels,
        "Exported guides and playlists"
    );
    Ok(report)
}

/// Export from an existing database file. Nothing is created when the
/// schedule tables are missing or no build has run.
pub fn export_database(db_path: &Path, config: &ExportConfig, now: DateTime<Utc>) -> Result<ExportReport> {
    let pool = open_existing(db_path)?;
    let conn = get_conn(&pool)?;
    export_all(&conn, config, now)
}
