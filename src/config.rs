//! Timeline settings loaded from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ACCENT_CLIP, ACCENT_MARKER, ACCENT_NOTCH, CLEAR_COLOUR, DEFAULT_COLUMN_WIDTH_PX,
    DEFAULT_ROW_GAP_PX, DEFAULT_ROW_HEIGHT_PX, MARKER_MIN_WIDTH_PX, ZOOM_STEP_PER_SCROLL,
};
use crate::error::{Result, TimelineError};
use crate::state::{clamp_column_width, Colour, TimelineViewMeta};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub row_height_px: u32,
    pub row_gap_px: u32,
    pub column_width_px: f32,
    pub left_column: i32,
    pub zoom_step: f32,
    pub marker_min_width_px: f32,
    pub clear_colour: [f64; 4],
    /// Hex colours, `#rrggbb` or `#rrggbbaa`
    pub clip_colour: String,
    pub marker_colour: String,
    pub notch_colour: String,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            row_height_px: DEFAULT_ROW_HEIGHT_PX,
            row_gap_px: DEFAULT_ROW_GAP_PX,
            column_width_px: DEFAULT_COLUMN_WIDTH_PX,
            left_column: 0,
            zoom_step: ZOOM_STEP_PER_SCROLL,
            marker_min_width_px: MARKER_MIN_WIDTH_PX,
            clear_colour: CLEAR_COLOUR,
            clip_colour: ACCENT_CLIP.to_string(),
            marker_colour: ACCENT_MARKER.to_string(),
            notch_colour: ACCENT_NOTCH.to_string(),
        }
    }
}

impl TimelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::debug!("Loaded timeline config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.row_height_px == 0 {
            return Err(TimelineError::Config("row_height_px must be positive".to_string()));
        }
        if !self.zoom_step.is_finite() {
            return Err(TimelineError::Config("zoom_step must be finite".to_string()));
        }
        if !self.marker_min_width_px.is_finite() || self.marker_min_width_px < 0.0 {
            return Err(TimelineError::Config(
                "marker_min_width_px must be a non-negative number".to_string(),
            ));
        }
        for (name, hex) in [
            ("clip_colour", &self.clip_colour),
            ("marker_colour", &self.marker_colour),
            ("notch_colour", &self.notch_colour),
        ] {
            if Colour::from_hex(hex).is_none() {
                return Err(TimelineError::Config(format!("{name} is not a hex colour: {hex}")));
            }
        }
        Ok(())
    }

    /// Starting view; the column width is clamped into the zoom bounds.
    pub fn initial_view_meta(&self) -> TimelineViewMeta {
        TimelineViewMeta {
            left_column: self.left_column,
            row_height_px: self.row_height_px,
            row_gap_px: self.row_gap_px,
            column_width_px: clamp_column_width(self.column_width_px),
            ..TimelineViewMeta::default()
        }
    }

    pub fn clip_colour(&self) -> Colour {
        Colour::from_hex(&self.clip_colour).unwrap_or(Colour::WHITE)
    }

    pub fn marker_colour(&self) -> Colour {
        Colour::from_hex(&self.marker_colour).unwrap_or(Colour::WHITE)
    }

    pub fn notch_colour(&self) -> Colour {
        Colour::from_hex(&self.notch_colour).unwrap_or(Colour::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_COLUMN_WIDTH_PX;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: TimelineConfig = serde_json::from_str(r#"{ "row_height_px": 20 }"#).unwrap();
        assert_eq!(config.row_height_px, 20);
        assert_eq!(config.row_gap_px, DEFAULT_ROW_GAP_PX);
        assert_eq!(config.clip_colour, ACCENT_CLIP);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_initial_view_clamps_zoom() {
        let config = TimelineConfig {
            column_width_px: 50.0,
            left_column: -3,
            ..TimelineConfig::default()
        };
        let meta = config.initial_view_meta();
        assert_eq!(meta.column_width_px, MAX_COLUMN_WIDTH_PX);
        assert_eq!(meta.left_column, -3);
    }

    #[test]
    fn test_bad_colour_rejected() {
        let config = TimelineConfig {
            marker_colour: "orange".to_string(),
            ..TimelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(TimelineError::Config(_))));
    }

    #[test]
    fn test_zero_row_height_rejected() {
        let config = TimelineConfig {
            row_height_px: 0,
            ..TimelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir()
            .join(format!("timeline-config-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, r#"{ "left_column": 12, "zoom_step": 0.5 }"#).unwrap();
        let config = TimelineConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(config.left_column, 12);
        assert_eq!(config.zoom_step, 0.5);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("timeline-config-does-not-exist.json");
        assert!(matches!(TimelineConfig::load(&path), Err(TimelineError::Io(_))));
    }
}
