use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COLUMN_WIDTH_PX, DEFAULT_ROW_GAP_PX, DEFAULT_ROW_HEIGHT_PX, MAX_COLUMN_WIDTH_PX,
    MIN_COLUMN_WIDTH_PX, ZOOM_STEP_PER_SCROLL,
};

/// A position in pixels, origin top-left (mouse space).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPos {
    pub x: f64,
    pub y: f64,
}

impl PixelPos {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Drawable dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: f64,
    pub height: f64,
}

impl PixelSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn to_array(self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

/// Discrete timeline position: `x` is a column, `y` a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TimelineCoord {
    pub x: i32,
    pub y: i32,
}

impl TimelineCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Scroll, zoom and row sizing shared between input handling and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineViewMeta {
    /// Column shown at the left edge
    pub left_column: i32,
    pub row_height_px: u32,
    pub row_gap_px: u32,
    /// Zoom; always within `[MIN_COLUMN_WIDTH_PX, MAX_COLUMN_WIDTH_PX]`
    pub column_width_px: f32,
    /// Size of the last drawn frame, needed to flip mouse y
    pub last_view_size: PixelSize,
}

impl Default for TimelineViewMeta {
    fn default() -> Self {
        Self {
            left_column: 0,
            row_height_px: DEFAULT_ROW_HEIGHT_PX,
            row_gap_px: DEFAULT_ROW_GAP_PX,
            column_width_px: DEFAULT_COLUMN_WIDTH_PX,
            last_view_size: PixelSize::default(),
        }
    }
}

impl TimelineViewMeta {
    /// Vertical pitch of one row including its gap.
    pub fn row_pitch_px(&self) -> u32 {
        self.row_height_px.saturating_add(self.row_gap_px)
    }

    pub fn set_column_width(&mut self, column_width_px: f32) {
        self.column_width_px = clamp_column_width(column_width_px);
    }

    /// Apply a scroll delta as zoom. Not anchored to the cursor.
    pub fn apply_scroll_zoom(&mut self, scroll_delta: f64) {
        self.apply_scroll_zoom_with(scroll_delta, ZOOM_STEP_PER_SCROLL);
    }

    /// As `apply_scroll_zoom` with a custom step per unit of delta.
    pub fn apply_scroll_zoom_with(&mut self, scroll_delta: f64, zoom_step: f32) {
        let zoom = scroll_delta as f32 * zoom_step;
        self.set_column_width(self.column_width_px + zoom);
    }
}

/// Clamp a column width into the zoom bounds. NaN falls back to the minimum.
pub fn clamp_column_width(column_width_px: f32) -> f32 {
    if column_width_px.is_nan() {
        return MIN_COLUMN_WIDTH_PX;
    }
    column_width_px.clamp(MIN_COLUMN_WIDTH_PX, MAX_COLUMN_WIDTH_PX)
}
