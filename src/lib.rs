//! Zoomable, scrollable clip timeline.
//!
//! Clips, markers and notches are laid out on a column/row grid, drawn as
//! instanced quads and driven by pixel-space mouse samples.

pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod render;
pub mod state;
pub mod timeline;

pub use config::TimelineConfig;
pub use error::{Result, TimelineError};
pub use timeline::TimelineViewController;
