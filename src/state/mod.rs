//! State management module
//!
//! This module contains the data the timeline draws and interacts with:
//! - Clip: blocks spanning a column range on one row
//! - Marker: point-in-time, row-independent annotations
//! - Notch / NotchBatch: ticks relative to a clip
//! - TimelineViewMeta: scroll, zoom and row sizing
//! - Binding / SelectionState: values shared with the host UI

mod binding;
mod clip;
mod colour;
mod marker;
mod notch;
mod selection;
mod view_meta;

pub use binding::*;
pub use clip::*;
pub use colour::*;
pub use marker::*;
pub use notch::*;
pub use selection::*;
pub use view_meta::*;
