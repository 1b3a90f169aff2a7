//! Shared test harness for integration tests.
//!
//! Provides [`Workspace`], a temporary directory holding a config file, a
//! database path and an output directory, plus helpers for reading back the
//! rendered documents.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use lanecast_core::config::Config;

/// The instant every fixture time is relative to.
pub const NOW: &str = "2026-10-19T09:00:00Z";

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
}

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/catalog.json")
}

/// A throwaway directory with a config pointing inside it.
pub struct Workspace {
    pub dir: TempDir,
    pub config: Config,
}

impl Workspace {
    pub fn new(lanes: u32) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let mut config = Config::default();
        config.database.path = dir.path().join("data/lanecast.db");
        config.export.out_dir = dir.path().join("out");
        config.schedule.lanes = lanes;

        let toml = format!(
            "[database]\npath = '{}'\n\n[schedule]\nlanes = {}\n\n[export]\nout_dir = '{}'\n",
            config.database.path.display(),
            lanes,
            config.export.out_dir.display()
        );
        std::fs::write(dir.path().join("lanecast.toml"), toml).expect("failed to write config");

        Self { dir, config }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("lanecast.toml")
    }

    pub fn out_dir(&self) -> &Path {
        &self.config.export.out_dir
    }

    pub fn read_output(&self, name: &str) -> String {
        std::fs::read_to_string(self.out_dir().join(name))
            .unwrap_or_else(|e| panic!("failed to read {name}: {e}"))
    }
}

/// One `<programme>` block reduced to the fields tests compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedProgramme {
    pub channel: String,
    pub start: String,
    pub stop: String,
    pub title: String,
}

fn attribute(tag: &str, name: &str) -> String {
    let needle = format!("{name}=\"");
    let from = tag.find(&needle).map(|i| i + needle.len()).unwrap_or(0);
    let to = tag[from..].find('"').map(|i| from + i).unwrap_or(from);
    tag[from..to].to_string()
}

/// Pull every programme out of a rendered guide.
pub fn programmes(xml: &str) -> Vec<ParsedProgramme> {
    xml.split("<programme ")
        .skip(1)
        .map(|block| {
            let tag_end = block.find('>').unwrap_or(block.len());
            let tag = &block[..tag_end];
            let title = block
                .split("<title>")
                .nth(1)
                .and_then(|rest| rest.split("</title>").next())
                .unwrap_or_default()
                .to_string();
            ParsedProgramme {
                channel: attribute(tag, "channel"),
                start: attribute(tag, "start"),
                stop: attribute(tag, "stop"),
                title,
            }
        })
        .collect()
}

/// Channel ids declared by a guide, in document order.
pub fn guide_channel_ids(xml: &str) -> Vec<String> {
    xml.split("<channel ")
        .skip(1)
        .map(|block| attribute(&block[..block.find('>').unwrap_or(block.len())], "id"))
        .collect()
}

/// `tvg-id` values of a playlist, in document order.
pub fn playlist_ids(m3u: &str) -> Vec<String> {
    m3u.lines()
        .filter(|l| l.starts_with("#EXTINF"))
        .map(|l| attribute(l, "tvg-id"))
        .collect()
}
