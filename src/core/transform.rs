//! Pixel <-> timeline coordinate conversion.
//!
//! Mouse input arrives with a top-left origin; the render surface uses a
//! bottom-left origin. `pixel_to_coord` flips y with the last drawn view height
//! before applying zoom and scroll. The `*_rect_px` helpers produce the same
//! geometry the WGSL vertex shaders emit, so hover highlighting and
//! hit-testing agree.

use crate::constants::MARKER_MIN_WIDTH_PX;
use crate::state::{
    Clip, Marker, Notch, NotchMeta, PixelPos, TimelineCoord, TimelineViewMeta,
};

/// Rectangle in render space (origin bottom-left), in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

/// Convert a mouse position to a timeline coordinate.
///
/// Both axes truncate toward zero, so fractional negative positions land in
/// the column/row nearer zero rather than the floor. Positions outside the
/// viewport are converted as-is; callers hit-test them like any other.
pub fn pixel_to_coord(pixel: PixelPos, meta: &TimelineViewMeta) -> TimelineCoord {
    let flipped_y = meta.last_view_size.height - pixel.y;

    // apply zoom then scroll
    let columns = pixel.x / meta.column_width_px as f64 + meta.left_column as f64;
    let rows = flipped_y / meta.row_pitch_px() as f64;

    // `as` truncates toward zero and saturates, so a zero row pitch stays total
    TimelineCoord::new(columns as i32, rows as i32)
}

/// Column under a horizontal pixel position, ignoring rows.
pub fn pixel_x_to_column(pixel_x: f64, meta: &TimelineViewMeta) -> i32 {
    pixel_to_coord(PixelPos::new(pixel_x, 0.0), meta).x
}

/// Left edge of `column` in pixels.
pub fn column_to_pixel_x(column: i64, meta: &TimelineViewMeta) -> f64 {
    (column - meta.left_column as i64) as f64 * meta.column_width_px as f64
}

/// Bottom edge of `row` in render space.
pub fn row_to_pixel_y(row: i64, meta: &TimelineViewMeta) -> f64 {
    row as f64 * meta.row_pitch_px() as f64
}

pub fn clip_rect_px(clip: &Clip, meta: &TimelineViewMeta) -> PixelRect {
    PixelRect {
        x: column_to_pixel_x(clip.column as i64, meta),
        y: row_to_pixel_y(clip.row as i64, meta),
        width: clip.occupied_width() as f64 * meta.column_width_px as f64,
        height: meta.row_height_px as f64,
    }
}

pub fn notch_rect_px(
    clip: &Clip,
    notch: Notch,
    notch_meta: &NotchMeta,
    meta: &TimelineViewMeta,
) -> PixelRect {
    let column = clip.column as i64 + notch.frame as i64;
    let row = clip.row as i64 + notch_meta.notch_row as i64;
    PixelRect {
        x: column_to_pixel_x(column, meta),
        y: row_to_pixel_y(row, meta),
        width: (meta.column_width_px.max(notch_meta.min_width_px)) as f64,
        height: meta.row_height_px as f64,
    }
}

pub fn marker_rect_px(marker: &Marker, meta: &TimelineViewMeta) -> PixelRect {
    PixelRect {
        x: column_to_pixel_x(marker.column as i64, meta),
        y: 0.0,
        width: meta.column_width_px.max(MARKER_MIN_WIDTH_PX) as f64,
        height: meta.last_view_size.height,
    }
}

/// Convert a render-space point back to mouse space.
pub fn render_to_mouse(x: f64, y: f64, meta: &TimelineViewMeta) -> PixelPos {
    PixelPos::new(x, meta.last_view_size.height - y)
}
