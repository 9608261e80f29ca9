use crate::error::{Result, TimelineError};

use super::shaders::NOTCH_VERTEX;
use super::types::BatchUniform;
use super::{InstancedDraw, PipelineDescriptor, PipelineHandle, RenderBackend};

/// One draw as the backend received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub pipeline: PipelineHandle,
    pub pipeline_label: &'static str,
    pub vertex_entry: &'static str,
    pub instance_count: u32,
    pub bytes: Vec<u8>,
    pub uniform: BatchUniform,
}

impl RecordedDraw {
    /// First column of the owning clip, for notch draws.
    pub fn owner_column(&self) -> Option<u32> {
        (self.vertex_entry == NOTCH_VERTEX).then_some(self.uniform.clip[0])
    }
}

/// Backend that draws nothing and keeps every call.
///
/// Used headless when no GPU adapter exists, and by tests.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pipelines: Vec<(&'static str, &'static str)>,
    draws: Vec<RecordedDraw>,
    failing: Vec<&'static str>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create_pipeline` reject the pipeline with this label.
    pub fn fail_pipeline(&mut self, label: &'static str) {
        self.failing.push(label);
    }

    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    /// Labels of the pipelines built so far, in build order.
    pub fn pipelines(&self) -> Vec<&'static str> {
        self.pipelines.iter().map(|(label, _)| *label).collect()
    }

    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    /// Forget recorded draws, keeping the pipelines.
    pub fn take_draws(&mut self) -> Vec<RecordedDraw> {
        std::mem::take(&mut self.draws)
    }
}

impl RenderBackend for RecordingBackend {
    fn create_pipeline(&mut self, descriptor: &PipelineDescriptor<'_>) -> Result<PipelineHandle> {
        descriptor.validate_entry_points()?;
        if self.failing.contains(&descriptor.label) {
            return Err(TimelineError::Pipeline {
                label: descriptor.label,
                message: "rejected by recording backend".to_string(),
            });
        }
        self.pipelines.push((descriptor.label, descriptor.vertex_entry));
        Ok(PipelineHandle(self.pipelines.len() - 1))
    }

    fn draw_instanced(&mut self, pipeline: PipelineHandle, draw: InstancedDraw<'_>) {
        let Some((label, vertex_entry)) = self.pipelines.get(pipeline.0).copied() else {
            log::warn!("Draw on unknown pipeline {:?}", pipeline);
            return;
        };
        self.draws.push(RecordedDraw {
            pipeline,
            pipeline_label: label,
            vertex_entry,
            instance_count: draw.instance_count,
            bytes: draw.instances.to_vec(),
            uniform: draw.uniform,
        });
    }
}
