//! Timeline widget
//!
//! - TimelineViewController: caches, bindings, input and rendering in one place
//! - sample_clips / sample_markers: generated preview data

mod controller;
mod sample_data;

pub use controller::TimelineViewController;
pub use sample_data::{sample_clips, sample_markers};
