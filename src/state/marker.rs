use serde::{Deserialize, Serialize};

use super::Colour;

/// A marker (point-in-time annotation).
///
/// Markers ignore rows and are drawn as a full-height vertical indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Column position; may sit left of column zero
    pub column: i32,
    pub colour: Colour,
}

impl Marker {
    pub fn new(column: i32, colour: Colour) -> Self {
        Self { column, colour }
    }
}
