/* Persisted daemon configuration.
 *
 * Stored as a flat keyed JSON document. Every field carries a serde
 * default, so a partial document is merged over the defaults and unknown
 * or missing keys fall back silently. A document that fails to parse is
 * logged and replaced by the full defaults; configuration problems are
 * never fatal. */

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::MonitorError;

/* Which devices the tray front-end renders in its icon. */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconStyle {
    Split,
    MouseOnly,
    HeadphoneOnly,
}

/* Hex color values the front-end uses per battery band. */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorConfig {
    #[serde(default = "default_color_high")]
    pub high: String,
    #[serde(default = "default_color_medium")]
    pub medium: String,
    #[serde(default = "default_color_low")]
    pub low: String,
    #[serde(default = "default_color_charging")]
    pub charging: String,
    #[serde(default = "default_color_error")]
    pub error: String,
}

fn default_color_high() -> String {
    "#00FF00".to_string()
}
fn default_color_medium() -> String {
    "#FFFF00".to_string()
}
fn default_color_low() -> String {
    "#FF0000".to_string()
}
fn default_color_charging() -> String {
    "#FFA500".to_string()
}
fn default_color_error() -> String {
    "#808080".to_string()
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            high: default_color_high(),
            medium: default_color_medium(),
            low: default_color_low(),
            charging: default_color_charging(),
            error: default_color_error(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /* Seconds between polling passes, floor of 1. */
    pub update_interval: u64,
    /* Persisted for front-ends that register themselves with the OS;
     * the daemon itself performs no autostart registration. */
    pub autostart: bool,
    pub icon_style: IconStyle,
    pub colors: ColorConfig,
    pub show_percentages: bool,
    pub debug_mode: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            update_interval: 300,
            autostart: true,
            icon_style: IconStyle::Split,
            colors: ColorConfig::default(),
            show_percentages: true,
            debug_mode: false,
        }
    }
}

impl MonitorConfig {
    /* Load the config from `path`, falling back to full defaults when the
     * file is missing or corrupt. Never fails. */
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(MonitorError::System(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self, MonitorError> {
        let text = fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&text)
            .map_err(|e| MonitorError::ConfigCorrupt(format!("{}: {e}", path.display())))?;
        config.update_interval = config.update_interval.max(1);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), MonitorError> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| MonitorError::ConfigCorrupt(e.to_string()))?;
        fs::write(path, text)?;
        debug!("Config saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_values() {
        let config = MonitorConfig::default();
        assert_eq!(config.update_interval, 300);
        assert!(config.autostart);
        assert_eq!(config.icon_style, IconStyle::Split);
        assert_eq!(config.colors.charging, "#FFA500");
        assert!(config.show_percentages);
        assert!(!config.debug_mode);
    }

    #[test]
    fn test_partial_document_merges_over_defaults() {
        let config: MonitorConfig =
            serde_json::from_str(r#"{"update_interval": 60, "icon_style": "mouse_only"}"#)
                .unwrap();
        assert_eq!(config.update_interval, 60);
        assert_eq!(config.icon_style, IconStyle::MouseOnly);
        /* untouched keys keep their defaults */
        assert!(config.autostart);
        assert_eq!(config.colors.low, "#FF0000");
    }

    #[test]
    fn test_partial_colors_merge_too() {
        let config: MonitorConfig =
            serde_json::from_str(r##"{"colors": {"low": "#AA0000"}}"##).unwrap();
        assert_eq!(config.colors.low, "#AA0000");
        assert_eq!(config.colors.high, "#00FF00");
    }

    #[test]
    fn test_corrupt_document_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("battmond-corrupt-config.json");
        fs::write(&path, "{ not json").unwrap();
        let config = MonitorConfig::load(&path);
        assert_eq!(config, MonitorConfig::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("battmond-definitely-missing.json");
        let _ = fs::remove_file(&path);
        assert_eq!(MonitorConfig::load(&path), MonitorConfig::default());
    }

    #[test]
    fn test_interval_floor_is_one_second() {
        let path = std::env::temp_dir().join("battmond-zero-interval.json");
        fs::write(&path, r#"{"update_interval": 0}"#).unwrap();
        let config = MonitorConfig::load(&path);
        assert_eq!(config.update_interval, 1);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let path = std::env::temp_dir().join("battmond-roundtrip-config.json");
        let mut config = MonitorConfig::default();
        config.update_interval = 600;
        config.icon_style = IconStyle::HeadphoneOnly;
        config.save(&path).unwrap();
        assert_eq!(MonitorConfig::load(&path), config);
        let _ = fs::remove_file(&path);
    }
}
