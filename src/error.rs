//! Error types for timeline setup.
//!
//! Only setup work can fail: building a pipeline for one of the batch kinds,
//! acquiring a GPU device, or loading a config file. Per-frame work (transform,
//! hit-testing, batch assembly) is total.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimelineError {
    /// A shader module does not define the entry point a pipeline asked for.
    #[error("missing function \"{entry_point}\" in shader {shader}")]
    MissingEntryPoint {
        shader: &'static str,
        entry_point: &'static str,
    },

    /// The backend rejected the pipeline descriptor.
    #[error("failed to build pipeline {label}: {message}")]
    Pipeline { label: &'static str, message: String },

    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("failed to create GPU device: {0}")]
    Device(String),

    #[error("invalid timeline config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = TimelineError> = std::result::Result<T, E>;
