//! Instanced batch rendering
//!
//! The timeline draws through a `RenderBackend`: it asks for one pipeline per
//! batch kind, then submits one instanced draw per non-empty batch.
//! `WgpuBackend` draws on a GPU; `RecordingBackend` keeps the calls for
//! inspection.

mod batch;
mod recording;
mod shaders;
mod types;
mod wgpu_backend;

pub use batch::{BatchKind, FrameInputs, FramePlan, FrameStats, PlannedDraw, RenderBatchBuilder};
pub use recording::{RecordedDraw, RecordingBackend};
pub use shaders::{
    CLIP_BOX_VERTEX, COLOUR_FRAGMENT, MARKER_VERTEX, NOTCH_VERTEX, TIMELINE_SHADER,
    TIMELINE_SHADER_LABEL,
};
pub use types::{
    AttributeFormat, BatchUniform, ClipInstance, InstanceAttribute, MarkerInstance, NotchInstance,
};
pub use wgpu_backend::{OffscreenTarget, WgpuBackend};

use crate::error::{Result, TimelineError};

/// Opaque id of a pipeline created by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineHandle(pub usize);

/// Everything a backend needs to build one batch kind's pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineDescriptor<'a> {
    pub label: &'static str,
    pub shader_label: &'static str,
    pub shader_source: &'a str,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
    /// Bytes between consecutive instance records
    pub instance_stride: u64,
    pub attributes: &'static [InstanceAttribute],
}

impl PipelineDescriptor<'_> {
    /// Fail with `MissingEntryPoint` unless the shader defines both entry
    /// points.
    pub fn validate_entry_points(&self) -> Result<()> {
        for entry_point in [self.vertex_entry, self.fragment_entry] {
            if !defines_function(self.shader_source, entry_point) {
                return Err(TimelineError::MissingEntryPoint {
                    shader: self.shader_label,
                    entry_point,
                });
            }
        }
        Ok(())
    }
}

/// One instanced draw: `instance_count` records packed in `instances`.
#[derive(Debug, Clone, Copy)]
pub struct InstancedDraw<'a> {
    pub instances: &'a [u8],
    pub instance_count: u32,
    pub uniform: BatchUniform,
}

/// Target the batch builder draws into.
pub trait RenderBackend {
    /// Build a pipeline. Called at most once per batch kind while it keeps
    /// succeeding.
    fn create_pipeline(&mut self, descriptor: &PipelineDescriptor<'_>) -> Result<PipelineHandle>;

    /// Queue one instanced draw of a 4-vertex strip. Never called with zero
    /// instances.
    fn draw_instanced(&mut self, pipeline: PipelineHandle, draw: InstancedDraw<'_>);
}

impl<B: RenderBackend + ?Sized> RenderBackend for &mut B {
    fn create_pipeline(&mut self, descriptor: &PipelineDescriptor<'_>) -> Result<PipelineHandle> {
        (**self).create_pipeline(descriptor)
    }

    fn draw_instanced(&mut self, pipeline: PipelineHandle, draw: InstancedDraw<'_>) {
        (**self).draw_instanced(pipeline, draw)
    }
}

fn defines_function(source: &str, name: &str) -> bool {
    let mut tokens = source
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .peekable();
    while let Some(token) = tokens.next() {
        if token == "fn" && tokens.peek() == Some(&name) {
            return true;
        }
    }
    false
}
