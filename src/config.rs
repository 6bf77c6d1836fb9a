//! Chart Configuration
//! Layout, interaction and colour settings, loaded once and threaded into every
//! layout computation.

use crate::scene::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Longest series the generator accepts, about a century.
pub const MAX_SPAN_MINUTES: i64 = 100 * 366 * 24 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Margins around the detail plot area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 0.0,
            bottom: 30.0,
            left: 40.0,
        }
    }
}

/// Band scale padding for the detail bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPadding {
    pub inner: f64,
    pub outer: f64,
    pub align: f64,
}

impl Default for BandPadding {
    fn default() -> Self {
        Self {
            inner: 0.2,
            outer: 1.0,
            align: 1.0,
        }
    }
}

/// Colours as `#RRGGBB` strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub bar: String,
    pub bracket: String,
    pub indicator: String,
    pub overview_line: String,
    pub axis: String,
    pub background: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bar: "#95CAFE".to_string(),
            bracket: "#95CAFE".to_string(),
            indicator: "#000000".to_string(),
            overview_line: "#3A7BC8".to_string(),
            axis: "#000000".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}

/// Everything the chart needs to lay itself out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    /// Height of the detail region; the overview strip sits below it.
    pub main_height: f64,
    pub margin: Margins,
    pub point_count: usize,
    pub spacing_minutes: i64,
    pub scale_factor: f64,
    pub band: BandPadding,
    pub y_ticks: usize,
    /// Tooltip offset from the pointer (x, y).
    pub tooltip_offset: (f64, f64),
    pub fade_out_ms: u64,
    pub reanchor_ms: u64,
    pub bracket_width: f64,
    pub overview_stroke_width: f64,
    pub palette: Palette,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            main_height: 500.0,
            margin: Margins::default(),
            point_count: 1500,
            spacing_minutes: 30,
            scale_factor: 100.0,
            band: BandPadding::default(),
            y_ticks: 10,
            tooltip_offset: (30.0, -80.0),
            fade_out_ms: 500,
            reanchor_ms: 100,
            bracket_width: 1.5,
            overview_stroke_width: 1.5,
            palette: Palette::default(),
        }
    }
}

impl ChartConfig {
    /// Load a config from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: ChartConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        info!(path = %path.display(), "loaded chart config");
        Ok(config)
    }

    /// Load from `path` if given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                debug!("no config path given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0.0 || self.height <= 0.0 || self.main_height <= 0.0 {
            return Err(ConfigError::Invalid("sizes must be positive".into()));
        }
        if self.margin.left + self.margin.right >= self.width {
            return Err(ConfigError::Invalid(
                "horizontal margins leave no plot area".into(),
            ));
        }
        if self.margin.top + self.margin.bottom >= self.main_height {
            return Err(ConfigError::Invalid(
                "vertical margins leave no plot area".into(),
            ));
        }
        if self.height < self.overview_bottom() {
            return Err(ConfigError::Invalid(format!(
                "height {} cannot hold the overview strip (needs {})",
                self.height,
                self.overview_bottom()
            )));
        }
        if self.point_count == 0 {
            return Err(ConfigError::Invalid("point_count must be at least 1".into()));
        }
        if self.spacing_minutes <= 0 {
            return Err(ConfigError::Invalid("spacing_minutes must be positive".into()));
        }
        let span = i64::try_from(self.point_count)
            .ok()
            .and_then(|n| n.checked_mul(self.spacing_minutes));
        if span.map_or(true, |m| m > MAX_SPAN_MINUTES) {
            return Err(ConfigError::Invalid(format!(
                "{} points at {} minute spacing exceed {} minutes",
                self.point_count, self.spacing_minutes, MAX_SPAN_MINUTES
            )));
        }
        if self.scale_factor <= 0.0 {
            return Err(ConfigError::Invalid("scale_factor must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.band.inner) || !(0.0..=1.0).contains(&self.band.align) {
            return Err(ConfigError::Invalid(
                "band inner padding and align must be within [0, 1]".into(),
            ));
        }
        for (name, hex) in self.palette_entries() {
            if Color::from_hex(hex).is_none() {
                return Err(ConfigError::Invalid(format!("bad colour for {name}: {hex}")));
            }
        }
        Ok(())
    }

    fn palette_entries(&self) -> [(&'static str, &str); 6] {
        [
            ("bar", &self.palette.bar),
            ("bracket", &self.palette.bracket),
            ("indicator", &self.palette.indicator),
            ("overview_line", &self.palette.overview_line),
            ("axis", &self.palette.axis),
            ("background", &self.palette.background),
        ]
    }

    /// Horizontal bounds of the detail viewport.
    pub fn detail_x_range(&self) -> (f64, f64) {
        (self.margin.left, self.width - self.margin.right)
    }

    /// Vertical pixel range for values: (bottom, top).
    pub fn detail_y_range(&self) -> (f64, f64) {
        (self.main_height - self.margin.bottom, self.margin.top)
    }

    /// Zoom extent, also used as the translate extent.
    pub fn zoom_extent(&self) -> [(f64, f64); 2] {
        [
            (self.margin.left, self.margin.top),
            (self.width - self.margin.right, self.main_height - self.margin.top),
        ]
    }

    pub fn overview_top(&self) -> f64 {
        self.main_height + 20.0
    }

    pub fn overview_bottom(&self) -> f64 {
        self.main_height + 60.0
    }

    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    pub fn reanchor(&self) -> Duration {
        Duration::from_millis(self.reanchor_ms)
    }

    pub fn color(&self, hex: &str) -> Color {
        Color::from_hex(hex).unwrap_or(Color::BLACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ChartConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detail_x_range(), (40.0, 800.0));
        assert_eq!(config.detail_y_range(), (470.0, 20.0));
        assert_eq!(config.zoom_extent(), [(40.0, 20.0), (800.0, 480.0)]);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ChartConfig = serde_json::from_str(r#"{ "point_count": 42 }"#).unwrap();
        assert_eq!(config.point_count, 42);
        assert_eq!(config.width, 800.0);
        assert_eq!(config.palette.bar, "#95CAFE");
    }

    #[test]
    fn rejects_zero_points() {
        let config = ChartConfig {
            point_count: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_runaway_span() {
        let config: ChartConfig =
            serde_json::from_str(r#"{ "spacing_minutes": 1000000000 }"#).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = ChartConfig {
            point_count: usize::MAX,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_colour() {
        let mut config = ChartConfig::default();
        config.palette.bar = "blue".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_short_canvas() {
        let config = ChartConfig {
            height: 520.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn save_then_load_file() {
        let path = std::env::temp_dir().join(format!("timebar-config-{}.json", std::process::id()));
        let config = ChartConfig {
            scale_factor: 50.0,
            ..Default::default()
        };
        config.save(&path).unwrap();
        let loaded = ChartConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }
}
