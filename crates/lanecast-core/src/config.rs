//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from TOML and carries the
//! sub-configs for the database, the upstream catalog, lane scheduling,
//! export and the refresh driver. Every section defaults sensibly so a
//! completely empty file is valid.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub catalog: CatalogConfig,
    pub schedule: ScheduleConfig,
    pub export: ExportConfig,
    pub refresh: RefreshConfig,
}

impl Config {
    /// Deserialize a `Config` from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load and check configuration from an explicit file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        config.check()?;
        Ok(config)
    }

    /// Load from `path` if given, else from the first default location that
    /// exists, else return defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default_paths = [
            "./lanecast.toml",
            "./config.toml",
            "~/.config/lanecast/config.toml",
            "/etc/lanecast/config.toml",
        ];

        for path_str in default_paths {
            let expanded = shellexpand::tilde(path_str);
            let path = Path::new(expanded.as_ref());
            if path.exists() {
                tracing::info!("Loading config from {}", path.display());
                return Self::load(path);
            }
        }

        tracing::info!("No config file found; using defaults");
        Ok(Self::default())
    }

    /// Reject configurations the scheduler cannot run with.
    pub fn check(&self) -> Result<()> {
        if self.schedule.lanes == 0 {
            return Err(Error::Validation("schedule.lanes must be at least 1".into()));
        }
        if self.schedule.placeholder_block_minutes == 0 {
            return Err(Error::Validation(
                "schedule.placeholder_block_minutes must be at least 1".into(),
            ));
        }
        if self.schedule.padding_minutes < 0 {
            return Err(Error::Validation(
                "schedule.padding_minutes must not be negative".into(),
            ));
        }
        if self.schedule.default_duration_secs <= 0 {
            return Err(Error::Validation(
                "schedule.default_duration_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.schedule.days_ahead == 0 {
            warnings.push("schedule.days_ahead is 0; only live events will be scheduled".into());
        }
        if self.export.direct_horizon_hours == 0 {
            warnings.push("export.direct_horizon_hours is 0; direct outputs will be empty".into());
        }
        if self.export.preferred_image_types.is_empty() {
            warnings.push("export.preferred_image_types is empty; any image will be used".into());
        }
        if !self.export.server_url.starts_with("http://")
            && !self.export.server_url.starts_with("https://")
        {
            warnings.push(format!(
                "export.server_url '{}' has no http(s) scheme",
                self.export.server_url
            ));
        }
        if self.refresh.timeout_secs == 0 {
            warnings.push("refresh.timeout_secs is 0; every refresh will time out".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// SQLite database location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/lanecast.db"),
        }
    }
}

/// Upstream catalog endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub slug: String,
    pub timeout_secs: u64,
    pub territory: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://atom.peacocktv.com/adapter-calypso/v3/query/node".into(),
            slug: "/sports/live-and-upcoming".into(),
            timeout_secs: 30,
            territory: "US".into(),
        }
    }
}

/// Lane packing and placeholder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub lanes: u32,
    pub lane_start_number: u32,
    pub lane_name_prefix: String,
    pub padding_minutes: i64,
    pub placeholder_block_minutes: u32,
    pub placeholder_extra_days: u32,
    pub days_ahead: u32,
    pub default_duration_secs: i64,
    /// Channel names that are known not to carry real events.
    pub denied_channels: Vec<String>,
}

impl ScheduleConfig {
    pub fn padding(&self) -> TimeDelta {
        TimeDelta::minutes(self.padding_minutes)
    }

    pub fn placeholder_block(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.placeholder_block_minutes))
    }

    pub fn extra_days(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.placeholder_extra_days))
    }

    pub fn horizon(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.days_ahead))
    }

    pub fn default_duration(&self) -> TimeDelta {
        TimeDelta::seconds(self.default_duration_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            lanes: 10,
            lane_start_number: 9000,
            lane_name_prefix: "Peacock Sports".into(),
            padding_minutes: 45,
            placeholder_block_minutes: 60,
            placeholder_extra_days: 5,
            days_ahead: 7,
            default_duration_secs: 7200,
            denied_channels: vec![
                "NBC Sports NOW".into(),
                "NFL Channel".into(),
                "Telemundo Deportes Ahora".into(),
            ],
        }
    }
}

/// Output document locations and rendering options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub out_dir: PathBuf,
    pub lanes_xml: String,
    pub lanes_m3u: String,
    pub chrome_m3u: String,
    pub direct_xml: String,
    pub direct_m3u: String,
    /// Optional lane playlist carrying each lane's upcoming deep link
    /// directly instead of a server lookup URL.
    pub lanes_direct_m3u: Option<String>,
    /// Base URL of the server that resolves `/api/lane/{id}/deeplink`.
    pub server_url: String,
    pub direct_horizon_hours: u32,
    pub preferred_image_types: Vec<String>,
    /// Fixed offset used when printing local times in placeholder text.
    pub display_offset_minutes: i32,
    pub display_zone_label: String,
}

impl ExportConfig {
    pub fn lanes_xml_path(&self) -> PathBuf {
        self.out_dir.join(&self.lanes_xml)
    }

    pub fn lanes_m3u_path(&self) -> PathBuf {
        self.out_dir.join(&self.lanes_m3u)
    }

    pub fn chrome_m3u_path(&self) -> PathBuf {
        self.out_dir.join(&self.chrome_m3u)
    }

    pub fn direct_xml_path(&self) -> PathBuf {
        self.out_dir.join(&self.direct_xml)
    }

    pub fn direct_m3u_path(&self) -> PathBuf {
        self.out_dir.join(&self.direct_m3u)
    }

    pub fn lanes_direct_m3u_path(&self) -> Option<PathBuf> {
        self.lanes_direct_m3u.as_ref().map(|name| self.out_dir.join(name))
    }

    pub fn direct_horizon(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.direct_horizon_hours))
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            lanes_xml: "peacock_lanes.xml".into(),
            lanes_m3u: "peacock_lanes.m3u".into(),
            chrome_m3u: "peacock_lanes_chrome.m3u".into(),
            direct_xml: "peacock_direct.xml".into(),
            direct_m3u: "peacock_direct.m3u".into(),
            lanes_direct_m3u: None,
            server_url: "http://localhost:6655".into(),
            direct_horizon_hours: 24,
            preferred_image_types: vec![
                "landscape".into(),
                "scene169".into(),
                "titleArt169".into(),
                "scene34".into(),
            ],
            display_offset_minutes: -300,
            display_zone_label: "EST".into(),
        }
    }
}

/// Refresh driver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub timeout_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { timeout_secs: 300 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_valid() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.schedule.lanes, 10);
        assert_eq!(config.schedule.lane_start_number, 9000);
        assert_eq!(config.schedule.padding(), TimeDelta::minutes(45));
        assert_eq!(config.export.direct_horizon_hours, 24);
        assert!(config.check().is_ok());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [schedule]
            lanes = 4
            denied_channels = ["Promo"]

            [export]
            out_dir = "/srv/guide"
            "#,
        )
        .unwrap();
        assert_eq!(config.schedule.lanes, 4);
        assert_eq!(config.schedule.placeholder_block_minutes, 60);
        assert_eq!(config.schedule.denied_channels, vec!["Promo".to_string()]);
        assert_eq!(
            config.export.lanes_xml_path(),
            PathBuf::from("/srv/guide/peacock_lanes.xml")
        );
    }

    #[test]
    fn zero_lanes_is_rejected() {
        let config = Config::from_toml("[schedule]\nlanes = 0\n").unwrap();
        assert!(matches!(config.check(), Err(Error::Validation(_))));
    }

    #[test]
    fn negative_padding_is_rejected() {
        let config = Config::from_toml("[schedule]\npadding_minutes = -150\n").unwrap();
        let err = config.check().unwrap_err();
        assert!(err.to_string().contains("padding_minutes"), "{err}");

        let config = Config::from_toml("[schedule]\npadding_minutes = 0\n").unwrap();
        config.check().unwrap();
    }

    #[test]
    fn parse_error_is_validation() {
        let err = Config::from_toml("[schedule\nlanes = ").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn warnings_for_suspicious_values() {
        let mut config = Config::default();
        config.export.server_url = "localhost:6655".into();
        config.export.direct_horizon_hours = 0;
        let warnings = config.validate();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lanecast.toml");
        std::fs::write(&path, "[database]\npath = \"/tmp/x.db\"\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Config::load_or_default(Some(Path::new("/nonexistent/lanecast.toml")));
        assert!(matches!(err, Err(Error::Io { .. })));
    }
}
