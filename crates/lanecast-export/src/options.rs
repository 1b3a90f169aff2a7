use chrono::{FixedOffset, Offset, TimeDelta, Utc};

use lanecast_core::config::ExportConfig;

pub const GENERATOR_NAME: &str = "lanecast";

/// Rendering settings shared by every document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub generator: String,
    pub preferred_images: Vec<String>,
    /// Fixed offset for the local times printed in direct placeholders.
    pub display_offset: FixedOffset,
    pub display_zone_label: String,
    pub direct_horizon: TimeDelta,
}

impl RenderOptions {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            generator: GENERATOR_NAME.to_string(),
            preferred_images: config.preferred_image_types.clone(),
            display_offset: FixedOffset::east_opt(config.display_offset_minutes * 60)
                .unwrap_or_else(|| Utc.fix()),
            display_zone_label: config.display_zone_label.clone(),
            direct_horizon: config.direct_horizon(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}
