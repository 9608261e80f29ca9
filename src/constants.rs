//! Shared timeline constants: zoom bounds, sizing defaults and colours.

/// Narrowest a column may be drawn, in pixels.
pub const MIN_COLUMN_WIDTH_PX: f32 = 0.1;
/// Widest a column may be drawn, in pixels.
pub const MAX_COLUMN_WIDTH_PX: f32 = 10.0;
/// Column width change per unit of scroll delta.
pub const ZOOM_STEP_PER_SCROLL: f32 = 0.1;

pub const DEFAULT_ROW_HEIGHT_PX: u32 = 40;
pub const DEFAULT_ROW_GAP_PX: u32 = 1;
pub const DEFAULT_COLUMN_WIDTH_PX: f32 = 5.0;

/// Markers stay visible when zoomed far out.
pub const MARKER_MIN_WIDTH_PX: f32 = 1.0;

pub const ACCENT_CLIP: &str = "#22c55e";
pub const ACCENT_MARKER: &str = "#f97316";
pub const ACCENT_NOTCH: &str = "#fafafa";

/// Transparent black, so the host surface shows through.
pub const CLEAR_COLOUR: [f64; 4] = [0.0, 0.0, 0.0, 0.0];

/// Instance `flags` bits shared with the clip box shader.
pub const CLIP_FLAG_SELECTED: u32 = 1;
pub const CLIP_FLAG_HOVERED: u32 = 1 << 1;
