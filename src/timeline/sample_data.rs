//! Generated data for previews and the demo binary.

use crate::state::{Clip, Colour, Marker};

/// A staircase of clips: clip `t` starts at column `t` on row `t` and spans
/// `(t + 60) * 3` columns.
pub fn sample_clips(count: u32, colour: Colour) -> Vec<Clip> {
    (0..count)
        .map(|t| Clip::new(t, (t + 60) * 3, t, colour))
        .collect()
}

/// Markers every `spacing` columns starting at column 0.
pub fn sample_markers(count: u32, spacing: i32, colour: Colour) -> Vec<Marker> {
    (0..count as i32)
        .map(|index| Marker::new(index.saturating_mul(spacing), colour))
        .collect()
}
