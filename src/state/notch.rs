use serde::{Deserialize, Serialize};

use super::Colour;

/// A tick relative to its owning clip's first column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notch {
    pub frame: i32,
}

/// Shared styling for every notch in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NotchMeta {
    pub colour: Colour,
    /// Row offset from the owning clip's row
    pub notch_row: i32,
    /// Notches never draw narrower than this, whatever the zoom
    pub min_width_px: f32,
}

impl Default for NotchMeta {
    fn default() -> Self {
        Self {
            colour: Colour::WHITE,
            notch_row: 0,
            min_width_px: 1.0,
        }
    }
}

/// Notches drawn together with one style.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NotchBatch {
    pub meta: NotchMeta,
    pub notches: Vec<Notch>,
}

impl NotchBatch {
    pub fn new(meta: NotchMeta) -> Self {
        Self {
            meta,
            notches: Vec::new(),
        }
    }

    pub fn with_frames(meta: NotchMeta, frames: impl IntoIterator<Item = i32>) -> Self {
        Self {
            meta,
            notches: frames.into_iter().map(|frame| Notch { frame }).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.notches.is_empty()
    }
}
