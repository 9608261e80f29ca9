//! Per-frame batch assembly.
//!
//! A frame is planned first (instance arrays built, empty batches dropped),
//! then every pipeline the plan needs is made ready, and only then are draws
//! submitted. A pipeline failure therefore aborts the frame before any draw
//! reaches the backend.

use std::borrow::Cow;

use crate::constants::MARKER_MIN_WIDTH_PX;
use crate::core::notch_source::NotchSource;
use crate::error::Result;
use crate::state::{Binding, Clip, ClipId, Marker, PixelSize, TimelineViewMeta};

use super::shaders::{
    CLIP_BOX_VERTEX, COLOUR_FRAGMENT, MARKER_VERTEX, NOTCH_VERTEX, TIMELINE_SHADER,
    TIMELINE_SHADER_LABEL,
};
use super::types::{BatchUniform, ClipInstance, MarkerInstance, NotchInstance};
use super::{InstancedDraw, PipelineDescriptor, PipelineHandle, RenderBackend};

/// The closed set of primitives the timeline draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchKind {
    ClipBox,
    Notch,
    Marker,
}

impl BatchKind {
    pub const ALL: [BatchKind; 3] = [BatchKind::ClipBox, BatchKind::Notch, BatchKind::Marker];

    fn index(self) -> usize {
        match self {
            BatchKind::ClipBox => 0,
            BatchKind::Notch => 1,
            BatchKind::Marker => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BatchKind::ClipBox => "clip_box_pipeline",
            BatchKind::Notch => "notch_pipeline",
            BatchKind::Marker => "marker_pipeline",
        }
    }

    pub fn pipeline_descriptor(self, shader_source: &str) -> PipelineDescriptor<'_> {
        let (vertex_entry, instance_stride, attributes) = match self {
            BatchKind::ClipBox => (
                CLIP_BOX_VERTEX,
                std::mem::size_of::<ClipInstance>(),
                ClipInstance::ATTRIBUTES,
            ),
            BatchKind::Notch => (
                NOTCH_VERTEX,
                std::mem::size_of::<NotchInstance>(),
                NotchInstance::ATTRIBUTES,
            ),
            BatchKind::Marker => (
                MARKER_VERTEX,
                std::mem::size_of::<MarkerInstance>(),
                MarkerInstance::ATTRIBUTES,
            ),
        };
        PipelineDescriptor {
            label: self.label(),
            shader_label: TIMELINE_SHADER_LABEL,
            shader_source,
            vertex_entry,
            fragment_entry: COLOUR_FRAGMENT,
            instance_stride: instance_stride as u64,
            attributes,
        }
    }

    pub fn build_pipeline<B: RenderBackend + ?Sized>(
        self,
        shader_source: &str,
        backend: &mut B,
    ) -> Result<PipelineHandle> {
        let descriptor = self.pipeline_descriptor(shader_source);
        descriptor.validate_entry_points()?;
        backend.create_pipeline(&descriptor)
    }

    /// Submit one planned batch. Empty batches never reach the backend.
    pub fn draw<B: RenderBackend + ?Sized>(
        self,
        pipeline: PipelineHandle,
        planned: &PlannedDraw,
        backend: &mut B,
    ) {
        if planned.instance_count == 0 {
            return;
        }
        backend.draw_instanced(
            pipeline,
            InstancedDraw {
                instances: &planned.instances,
                instance_count: planned.instance_count,
                uniform: planned.uniform,
            },
        );
    }
}

/// Everything one frame draws, read from the controller's caches.
pub struct FrameInputs<'a> {
    pub clips: &'a [Clip],
    pub markers: &'a [Marker],
    pub notches: &'a dyn NotchSource,
    pub selected: Option<ClipId>,
    pub hovered: Option<ClipId>,
}

/// One draw ready for submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDraw {
    pub kind: BatchKind,
    /// Owning clip, for notch batches
    pub clip: Option<ClipId>,
    pub instances: Vec<u8>,
    pub instance_count: u32,
    pub uniform: BatchUniform,
}

/// Ordered draws for one frame: clip boxes, notches, markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramePlan {
    pub draws: Vec<PlannedDraw>,
}

impl FramePlan {
    /// Assemble batches from one consistent view snapshot.
    pub fn build(view: &TimelineViewMeta, viewport: PixelSize, inputs: &FrameInputs<'_>) -> Self {
        Self::build_with_marker_width(view, viewport, inputs, MARKER_MIN_WIDTH_PX)
    }

    pub fn build_with_marker_width(
        view: &TimelineViewMeta,
        viewport: PixelSize,
        inputs: &FrameInputs<'_>,
        marker_min_width_px: f32,
    ) -> Self {
        let base = BatchUniform::new(view, viewport);
        let mut draws = Vec::new();

        let clip_instances: Vec<ClipInstance> = inputs
            .clips
            .iter()
            .map(|clip| ClipInstance::new(clip, inputs.selected, inputs.hovered))
            .collect();
        push_draw(&mut draws, BatchKind::ClipBox, None, &clip_instances, base);

        for (clip, owner) in inputs.clips.iter().zip(clip_instances.iter()) {
            // owned snapshot; a producer may keep appending meanwhile
            for batch in inputs.notches.fetch(clip.id) {
                if batch.is_empty() {
                    continue;
                }
                let notch_instances: Vec<NotchInstance> =
                    batch.notches.iter().copied().map(NotchInstance::from).collect();
                let uniform = base.with_notch_owner(owner, &batch.meta);
                push_draw(&mut draws, BatchKind::Notch, Some(clip.id), &notch_instances, uniform);
            }
        }

        let marker_instances: Vec<MarkerInstance> =
            inputs.markers.iter().map(MarkerInstance::from).collect();
        push_draw(
            &mut draws,
            BatchKind::Marker,
            None,
            &marker_instances,
            base.with_min_width(marker_min_width_px),
        );

        Self { draws }
    }

    pub fn kinds(&self) -> impl Iterator<Item = BatchKind> + '_ {
        self.draws.iter().map(|draw| draw.kind)
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}

fn push_draw<T: bytemuck::Pod>(
    draws: &mut Vec<PlannedDraw>,
    kind: BatchKind,
    clip: Option<ClipId>,
    instances: &[T],
    uniform: BatchUniform,
) {
    if instances.is_empty() {
        return;
    }
    draws.push(PlannedDraw {
        kind,
        clip,
        instances: bytemuck::cast_slice(instances).to_vec(),
        instance_count: instances.len() as u32,
        uniform,
    });
}

/// Draw counts for one submitted frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub clip_draws: usize,
    pub notch_draws: usize,
    pub marker_draws: usize,
    pub instances: u64,
}

impl FrameStats {
    pub fn draw_calls(&self) -> usize {
        self.clip_draws + self.notch_draws + self.marker_draws
    }
}

/// Builds and submits the timeline's batches each frame.
///
/// Pipelines are created lazily the first time a kind has something to draw
/// and reused for the builder's lifetime. A failed build is not cached; the
/// next frame tries again.
pub struct RenderBatchBuilder {
    shader_source: Cow<'static, str>,
    pipelines: [Option<PipelineHandle>; 3],
    marker_min_width_px: f32,
}

impl Default for RenderBatchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBatchBuilder {
    pub fn new() -> Self {
        Self::with_shader(TIMELINE_SHADER)
    }

    /// Use a replacement WGSL module. It must define the same entry points
    /// and uniform layout as the built-in one.
    pub fn with_shader(shader_source: impl Into<Cow<'static, str>>) -> Self {
        Self {
            shader_source: shader_source.into(),
            pipelines: [None; 3],
            marker_min_width_px: MARKER_MIN_WIDTH_PX,
        }
    }

    pub fn with_marker_min_width(mut self, marker_min_width_px: f32) -> Self {
        self.marker_min_width_px = marker_min_width_px;
        self
    }

    pub fn has_pipeline(&self, kind: BatchKind) -> bool {
        self.pipelines[kind.index()].is_some()
    }

    /// Render one frame at `drawable` size.
    ///
    /// Records `drawable` into the bound view meta first (mouse input flips y
    /// with it), then draws from a single snapshot of the view.
    pub fn render_frame<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        view: &Binding<TimelineViewMeta>,
        drawable: PixelSize,
        inputs: &FrameInputs<'_>,
    ) -> Result<FrameStats> {
        if view.with(|meta| meta.last_view_size != drawable) {
            view.update(|meta| meta.last_view_size = drawable);
        }
        let snapshot = view.get();
        let plan = FramePlan::build_with_marker_width(
            &snapshot,
            drawable,
            inputs,
            self.marker_min_width_px,
        );
        self.submit(backend, &plan)
    }

    pub fn submit<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        plan: &FramePlan,
    ) -> Result<FrameStats> {
        if plan.is_empty() {
            return Ok(FrameStats::default());
        }
        for kind in BatchKind::ALL {
            if plan.kinds().any(|planned| planned == kind) {
                self.pipeline(backend, kind)?;
            }
        }

        let mut stats = FrameStats::default();
        for draw in &plan.draws {
            let Some(pipeline) = self.pipelines[draw.kind.index()] else {
                continue;
            };
            draw.kind.draw(pipeline, draw, backend);
            match draw.kind {
                BatchKind::ClipBox => stats.clip_draws += 1,
                BatchKind::Notch => stats.notch_draws += 1,
                BatchKind::Marker => stats.marker_draws += 1,
            }
            stats.instances += draw.instance_count as u64;
        }
        Ok(stats)
    }

    fn pipeline<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        kind: BatchKind,
    ) -> Result<PipelineHandle> {
        if let Some(handle) = self.pipelines[kind.index()] {
            return Ok(handle);
        }
        let handle = kind.build_pipeline(&self.shader_source, backend)?;
        log::info!("Built {} ({:?})", kind.label(), handle);
        self.pipelines[kind.index()] = Some(handle);
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notch_source::{NoNotches, NotchStore};
    use crate::error::TimelineError;
    use crate::render::RecordingBackend;
    use crate::state::{Colour, NotchBatch, NotchMeta};

    fn view() -> Binding<TimelineViewMeta> {
        Binding::new(TimelineViewMeta::default())
    }

    fn inputs<'a>(
        clips: &'a [Clip],
        markers: &'a [Marker],
        notches: &'a dyn NotchSource,
    ) -> FrameInputs<'a> {
        FrameInputs {
            clips,
            markers,
            notches,
            selected: None,
            hovered: None,
        }
    }

    #[test]
    fn test_empty_frame_issues_no_draws() {
        let mut builder = RenderBatchBuilder::new();
        let mut backend = RecordingBackend::new();
        let stats = builder
            .render_frame(
                &mut backend,
                &view(),
                PixelSize::new(400.0, 300.0),
                &inputs(&[], &[], &NoNotches),
            )
            .unwrap();
        assert_eq!(stats.draw_calls(), 0);
        assert!(backend.draws().is_empty());
        assert!(backend.pipelines().is_empty());

        let plan = FramePlan::build(
            &TimelineViewMeta::default(),
            PixelSize::new(400.0, 300.0),
            &inputs(&[], &[], &NoNotches),
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn test_clip_without_notches_skips_notch_draw() {
        let clips = vec![Clip::new(0, 10, 0, Colour::WHITE)];
        let store = NotchStore::new();
        store.set_batches(clips[0].id, vec![NotchBatch::new(NotchMeta::default())]);

        let mut builder = RenderBatchBuilder::new();
        let mut backend = RecordingBackend::new();
        let stats = builder
            .render_frame(
                &mut backend,
                &view(),
                PixelSize::new(400.0, 300.0),
                &inputs(&clips, &[], &store),
            )
            .unwrap();
        assert_eq!(stats.clip_draws, 1);
        assert_eq!(stats.notch_draws, 0);
        assert_eq!(stats.marker_draws, 0);
        assert!(!builder.has_pipeline(BatchKind::Notch));
    }

    #[test]
    fn test_draw_order_clips_notches_markers() {
        let first = Clip::new(0, 10, 0, Colour::WHITE);
        let second = Clip::new(20, 10, 1, Colour::WHITE);
        let clips = vec![first.clone(), second.clone()];
        let markers = vec![Marker::new(5, Colour::WHITE), Marker::new(-2, Colour::WHITE)];

        let store = NotchStore::new();
        let meta_a = NotchMeta {
            notch_row: 0,
            ..NotchMeta::default()
        };
        let meta_b = NotchMeta {
            notch_row: 1,
            ..NotchMeta::default()
        };
        store.set_batches(
            second.id,
            vec![
                NotchBatch::with_frames(meta_a, [1, 2, 3]),
                NotchBatch::with_frames(meta_b, [4]),
            ],
        );
        store.set_batches(first.id, vec![NotchBatch::with_frames(meta_a, [0, 9])]);

        let mut builder = RenderBatchBuilder::new();
        let mut backend = RecordingBackend::new();
        builder
            .render_frame(
                &mut backend,
                &view(),
                PixelSize::new(800.0, 200.0),
                &inputs(&clips, &markers, &store),
            )
            .unwrap();

        let summary: Vec<(&str, Option<u32>, u32)> = backend
            .draws()
            .iter()
            .map(|draw| (draw.pipeline_label, draw.owner_column(), draw.instance_count))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("clip_box_pipeline", None, 2),
                ("notch_pipeline", Some(0), 2),
                ("notch_pipeline", Some(20), 3),
                ("notch_pipeline", Some(20), 1),
                ("marker_pipeline", None, 2),
            ]
        );
        assert_eq!(backend.draws()[3].uniform.notch_row, 1);
    }

    #[test]
    fn test_render_records_drawable_size() {
        let binding = view();
        let mut builder = RenderBatchBuilder::new();
        let mut backend = RecordingBackend::new();
        builder
            .render_frame(
                &mut backend,
                &binding,
                PixelSize::new(640.0, 480.0),
                &inputs(&[], &[], &NoNotches),
            )
            .unwrap();
        assert_eq!(binding.get().last_view_size, PixelSize::new(640.0, 480.0));

        let version = binding.version();
        builder
            .render_frame(
                &mut backend,
                &binding,
                PixelSize::new(640.0, 480.0),
                &inputs(&[], &[], &NoNotches),
            )
            .unwrap();
        assert_eq!(binding.version(), version);
    }

    #[test]
    fn test_uniforms_carry_view_and_viewport() {
        let binding = Binding::new(TimelineViewMeta {
            left_column: -7,
            column_width_px: 2.5,
            ..TimelineViewMeta::default()
        });
        let clips = vec![Clip::new(3, 1, 0, Colour::WHITE)];
        let mut builder = RenderBatchBuilder::new();
        let mut backend = RecordingBackend::new();
        builder
            .render_frame(
                &mut backend,
                &binding,
                PixelSize::new(300.0, 100.0),
                &inputs(&clips, &[], &NoNotches),
            )
            .unwrap();
        let uniform = backend.draws()[0].uniform;
        assert_eq!(uniform.left_column, -7);
        assert_eq!(uniform.column_width_px, 2.5);
        assert_eq!(uniform.viewport_px, [300.0, 100.0]);
    }

    #[test]
    fn test_pipelines_built_once() {
        let clips = vec![Clip::new(0, 1, 0, Colour::WHITE)];
        let mut builder = RenderBatchBuilder::new();
        let mut backend = RecordingBackend::new();
        for _ in 0..3 {
            builder
                .render_frame(
                    &mut backend,
                    &view(),
                    PixelSize::new(10.0, 10.0),
                    &inputs(&clips, &[], &NoNotches),
                )
                .unwrap();
        }
        assert_eq!(backend.pipelines(), &["clip_box_pipeline"]);
        assert_eq!(backend.draws().len(), 3);
    }

    #[test]
    fn test_missing_entry_point_fails_frame_without_draws() {
        let clips = vec![Clip::new(0, 1, 0, Colour::WHITE)];
        let markers = vec![Marker::new(0, Colour::WHITE)];
        let broken = TIMELINE_SHADER.replace("fn marker_vertex", "fn marker_vertex_old");
        let mut builder = RenderBatchBuilder::with_shader(broken);
        let mut backend = RecordingBackend::new();
        let result = builder.render_frame(
            &mut backend,
            &view(),
            PixelSize::new(10.0, 10.0),
            &inputs(&clips, &markers, &NoNotches),
        );
        assert!(matches!(
            result,
            Err(TimelineError::MissingEntryPoint {
                entry_point: "marker_vertex",
                ..
            })
        ));
        assert!(backend.draws().is_empty());
        assert!(!builder.has_pipeline(BatchKind::Marker));

        // frames without markers still render
        let stats = builder
            .render_frame(
                &mut backend,
                &view(),
                PixelSize::new(10.0, 10.0),
                &inputs(&clips, &[], &NoNotches),
            )
            .unwrap();
        assert_eq!(stats.clip_draws, 1);
    }

    #[test]
    fn test_backend_failure_is_retried_next_frame() {
        let clips = vec![Clip::new(0, 1, 0, Colour::WHITE)];
        let mut builder = RenderBatchBuilder::new();
        let mut backend = RecordingBackend::new();
        backend.fail_pipeline("clip_box_pipeline");
        let result = builder.render_frame(
            &mut backend,
            &view(),
            PixelSize::new(10.0, 10.0),
            &inputs(&clips, &[], &NoNotches),
        );
        assert!(matches!(result, Err(TimelineError::Pipeline { .. })));

        backend.clear_failures();
        builder
            .render_frame(
                &mut backend,
                &view(),
                PixelSize::new(10.0, 10.0),
                &inputs(&clips, &[], &NoNotches),
            )
            .unwrap();
        assert!(builder.has_pipeline(BatchKind::ClipBox));
    }

    #[test]
    fn test_selected_and_hovered_flags_reach_instances() {
        let clips = vec![
            Clip::new(0, 1, 0, Colour::WHITE),
            Clip::new(5, 1, 0, Colour::WHITE),
        ];
        let frame = FrameInputs {
            clips: &clips,
            markers: &[],
            notches: &NoNotches,
            selected: Some(clips[1].id),
            hovered: Some(clips[0].id),
        };
        let plan =
            FramePlan::build(&TimelineViewMeta::default(), PixelSize::new(10.0, 10.0), &frame);
        let bytes = &plan.draws[0].instances;
        let first: ClipInstance = bytemuck::pod_read_unaligned(&bytes[..32]);
        let second: ClipInstance = bytemuck::pod_read_unaligned(&bytes[32..64]);
        assert_eq!(first.flags, crate::constants::CLIP_FLAG_HOVERED);
        assert_eq!(second.flags, crate::constants::CLIP_FLAG_SELECTED);
    }

    #[test]
    fn test_marker_min_width_reaches_uniform() {
        let markers = vec![Marker::new(1, Colour::WHITE)];
        let mut builder = RenderBatchBuilder::new().with_marker_min_width(3.0);
        let mut backend = RecordingBackend::new();
        builder
            .render_frame(
                &mut backend,
                &view(),
                PixelSize::new(10.0, 10.0),
                &inputs(&[], &markers, &NoNotches),
            )
            .unwrap();
        assert_eq!(backend.draws()[0].uniform.min_width_px, 3.0);
        assert_eq!(backend.draws()[0].owner_column(), None);
    }
}
