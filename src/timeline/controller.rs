use crate::config::TimelineConfig;
use crate::core::interaction::{InteractionState, MouseSample, SampleOutcome, TimelineObserver};
use crate::core::notch_source::NotchSource;
use crate::error::Result;
use crate::render::{FrameInputs, FrameStats, RenderBackend, RenderBatchBuilder};
use crate::state::{Binding, Clip, Marker, PixelSize, SelectionState, TimelineViewMeta};

/// Owns the timeline's caches and wires input, state and rendering together.
///
/// The host keeps clones of the view and selection bindings; clip and marker
/// lists are pushed in through `sync_clips` / `sync_markers` and replaced
/// wholesale whenever they differ from the cached copy.
pub struct TimelineViewController {
    view: Binding<TimelineViewMeta>,
    selection: SelectionState,
    clips: Vec<Clip>,
    markers: Vec<Marker>,
    notches: Box<dyn NotchSource>,
    observer: Box<dyn TimelineObserver>,
    interaction: InteractionState,
    builder: RenderBatchBuilder,
    min_display_height_px: f64,
    seen_view_version: u64,
}

impl TimelineViewController {
    pub fn new(
        view: Binding<TimelineViewMeta>,
        selection: SelectionState,
        notches: impl NotchSource + 'static,
        observer: impl TimelineObserver + 'static,
    ) -> Self {
        let seen_view_version = view.version();
        Self {
            view,
            selection,
            clips: Vec::new(),
            markers: Vec::new(),
            notches: Box::new(notches),
            observer: Box::new(observer),
            interaction: InteractionState::new(),
            builder: RenderBatchBuilder::new(),
            min_display_height_px: 0.0,
            seen_view_version,
        }
    }

    /// Apply zoom step and marker width from a config.
    pub fn with_config(mut self, config: &TimelineConfig) -> Self {
        self.interaction = InteractionState::new().with_zoom_step(config.zoom_step);
        self.builder = RenderBatchBuilder::new().with_marker_min_width(config.marker_min_width_px);
        self
    }

    pub fn with_batch_builder(mut self, builder: RenderBatchBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn view(&self) -> &Binding<TimelineViewMeta> {
        &self.view
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    /// Height needed to show every row in use; 0 with no clips.
    pub fn min_display_height_px(&self) -> f64 {
        self.min_display_height_px
    }

    /// Replace the clip cache when `clips` differs. Returns whether it did.
    pub fn sync_clips(&mut self, clips: &[Clip]) -> bool {
        if self.clips.as_slice() == clips {
            return false;
        }
        log::info!("Clip data changed ({} clips)", clips.len());
        self.clips = clips.to_vec();
        self.min_display_height_px = self.view.with(|meta| min_display_height(&self.clips, meta));
        true
    }

    /// Replace the marker cache when `markers` differs. Returns whether it did.
    pub fn sync_markers(&mut self, markers: &[Marker]) -> bool {
        if self.markers.as_slice() == markers {
            return false;
        }
        log::info!("Marker data changed ({} markers)", markers.len());
        self.markers = markers.to_vec();
        true
    }

    /// Swap the notch source, e.g. when the host's data owner changes.
    pub fn set_notch_source(&mut self, notches: impl NotchSource + 'static) {
        self.notches = Box::new(notches);
    }

    /// Feed one mouse sample. View changes are written back to the binding.
    pub fn handle_mouse(&mut self, sample: &MouseSample) -> SampleOutcome {
        let mut meta = self.view.get();
        let outcome = self.interaction.handle_sample(
            sample,
            &mut meta,
            &self.clips,
            &self.selection,
            self.observer.as_mut(),
        );
        if outcome.view_changed {
            self.view.set(meta);
        }
        outcome
    }

    /// Whether the view binding was written since the last call, by either
    /// side.
    pub fn poll_view_change(&mut self) -> bool {
        let version = self.view.version();
        let changed = version != self.seen_view_version;
        self.seen_view_version = version;
        if changed {
            // rows may have been resized by the host
            self.min_display_height_px =
                self.view.with(|meta| min_display_height(&self.clips, meta));
        }
        changed
    }

    /// Draw one frame of `drawable` size.
    pub fn render<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        drawable: PixelSize,
    ) -> Result<FrameStats> {
        let inputs = FrameInputs {
            clips: &self.clips,
            markers: &self.markers,
            notches: self.notches.as_ref(),
            selected: self.selection.selected_clip(),
            hovered: self.selection.hovered_clip(),
        };
        let result = self.builder.render_frame(backend, &self.view, drawable, &inputs);
        if let Err(err) = &result {
            log::warn!("Timeline frame failed: {}", err);
        }
        result
    }

    /// Debug overlay text: hover coordinate, zoom, left column.
    pub fn overlay_lines(&self) -> [String; 3] {
        let hover = self.interaction.hover_coord();
        let meta = self.view.get();
        [
            format!("Hover ({},{})", hover.x, hover.y),
            format!("zoom {:.2}", meta.column_width_px),
            format!("left {}", meta.left_column),
        ]
    }
}

fn min_display_height(clips: &[Clip], meta: &TimelineViewMeta) -> f64 {
    clips
        .iter()
        .map(|clip| clip.row)
        .max()
        .map_or(0.0, |max_row| (max_row as f64 + 1.0) * meta.row_pitch_px() as f64)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::core::notch_source::{NoNotches, NotchStore};
    use crate::render::RecordingBackend;
    use crate::state::{ClipId, Colour, NotchBatch, NotchMeta, TimelineCoord};

    fn scenario_view() -> Binding<TimelineViewMeta> {
        Binding::new(TimelineViewMeta {
            left_column: 0,
            row_height_px: 40,
            row_gap_px: 1,
            column_width_px: 5.0,
            last_view_size: PixelSize::new(400.0, 500.0),
        })
    }

    fn controller_with_clicks(
        view: Binding<TimelineViewMeta>,
        selection: SelectionState,
    ) -> (TimelineViewController, Rc<RefCell<Vec<TimelineCoord>>>) {
        let clicks = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&clicks);
        let observer = move |coord: TimelineCoord| sink.borrow_mut().push(coord);
        let controller = TimelineViewController::new(view, selection, NoNotches, observer);
        (controller, clicks)
    }

    #[test]
    fn test_end_to_end_click_selects_clip() {
        let view = scenario_view();
        let selection = SelectionState::default();
        let (mut controller, clicks) = controller_with_clicks(view.clone(), selection.clone());
        let clip = Clip::new(10, 4, 0, Colour::WHITE);
        controller.sync_clips(&[clip.clone()]);

        let outcome = controller.handle_mouse(&MouseSample::left(55.0, 479.0));
        assert_eq!(outcome.hover, TimelineCoord::new(11, 0));
        assert_eq!(outcome.hovered_clip, Some(clip.id));
        assert_eq!(selection.selected_clip(), Some(clip.id));
        assert_eq!(selection.hovered_clip(), Some(clip.id));
        assert!(clicks.borrow().is_empty());
    }

    #[test]
    fn test_sync_clips_detects_value_change() {
        let (mut controller, _) =
            controller_with_clicks(scenario_view(), SelectionState::default());
        let clips = vec![Clip::new(0, 5, 2, Colour::WHITE), Clip::new(5, 5, 0, Colour::WHITE)];
        assert!(controller.sync_clips(&clips));
        assert!(!controller.sync_clips(&clips.clone()));
        assert_eq!(controller.min_display_height_px(), 3.0 * 41.0);

        let mut moved = clips.clone();
        moved[1].column = 6;
        assert!(controller.sync_clips(&moved));
        assert_eq!(controller.clips()[1].column, 6);

        assert!(controller.sync_clips(&[]));
        assert_eq!(controller.min_display_height_px(), 0.0);
    }

    #[test]
    fn test_sync_markers() {
        let (mut controller, _) =
            controller_with_clicks(scenario_view(), SelectionState::default());
        let markers = vec![Marker::new(3, Colour::WHITE)];
        assert!(controller.sync_markers(&markers));
        assert!(!controller.sync_markers(&markers));
        assert_eq!(controller.markers().len(), 1);
    }

    #[test]
    fn test_pan_and_zoom_write_back_to_binding() {
        let view = scenario_view();
        let (mut controller, _) = controller_with_clicks(view.clone(), SelectionState::default());
        controller.poll_view_change();

        controller.handle_mouse(&MouseSample::right(100.0, 0.0));
        assert!(!controller.poll_view_change());
        controller.handle_mouse(&MouseSample::right(50.0, 0.0));
        assert_eq!(view.get().left_column, 10);
        assert!(controller.poll_view_change());

        controller.handle_mouse(&MouseSample::scroll(50.0, 0.0, 10.0));
        assert!((view.get().column_width_px - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_host_row_resize_updates_min_height() {
        let view = scenario_view();
        let (mut controller, _) = controller_with_clicks(view.clone(), SelectionState::default());
        controller.sync_clips(&[Clip::new(0, 1, 1, Colour::WHITE)]);
        assert_eq!(controller.min_display_height_px(), 82.0);

        view.update(|meta| meta.row_height_px = 19);
        assert!(controller.poll_view_change());
        assert_eq!(controller.min_display_height_px(), 40.0);
    }

    #[test]
    fn test_render_uses_caches_and_bindings() {
        let view = scenario_view();
        let selection = SelectionState::default();
        let (mut controller, _) = controller_with_clicks(view.clone(), selection.clone());
        let clips = vec![Clip::new(10, 4, 0, Colour::WHITE), Clip::new(0, 2, 1, Colour::WHITE)];
        controller.sync_clips(&clips);
        controller.sync_markers(&[Marker::new(7, Colour::WHITE)]);

        let store = NotchStore::new();
        store.set_batches(
            clips[1].id,
            vec![NotchBatch::with_frames(NotchMeta::default(), [0, 1])],
        );
        controller.set_notch_source(store);
        selection.select_clip(clips[0].id);

        let mut backend = RecordingBackend::new();
        let stats = controller
            .render(&mut backend, PixelSize::new(800.0, 600.0))
            .unwrap();
        assert_eq!(stats.clip_draws, 1);
        assert_eq!(stats.notch_draws, 1);
        assert_eq!(stats.marker_draws, 1);
        assert_eq!(stats.instances, 5);
        assert_eq!(view.get().last_view_size, PixelSize::new(800.0, 600.0));
    }

    #[test]
    fn test_stale_selection_highlights_nothing() {
        let selection = SelectionState::default();
        let (mut controller, _) = controller_with_clicks(scenario_view(), selection.clone());
        controller.sync_clips(&[Clip::new(0, 1, 0, Colour::WHITE)]);
        selection.select_clip(ClipId::new());

        let mut backend = RecordingBackend::new();
        controller.render(&mut backend, PixelSize::new(10.0, 10.0)).unwrap();
        let instance: crate::render::ClipInstance =
            bytemuck::pod_read_unaligned(&backend.draws()[0].bytes[..32]);
        assert_eq!(instance.flags, 0);
    }

    #[test]
    fn test_overlay_lines() {
        let (mut controller, _) =
            controller_with_clicks(scenario_view(), SelectionState::default());
        controller.handle_mouse(&MouseSample::hover(55.0, 479.0));
        assert_eq!(
            controller.overlay_lines(),
            [
                "Hover (11,0)".to_string(),
                "zoom 5.00".to_string(),
                "left 0".to_string()
            ]
        );
    }

    #[test]
    fn test_config_zoom_step() {
        let config = TimelineConfig {
            zoom_step: 0.5,
            ..TimelineConfig::default()
        };
        let view = scenario_view();
        let ignore = |_: TimelineCoord| {};
        let mut controller =
            TimelineViewController::new(view.clone(), SelectionState::default(), NoNotches, ignore)
                .with_config(&config);
        controller.handle_mouse(&MouseSample::scroll(0.0, 0.0, 2.0));
        assert!((view.get().column_width_px - 6.0).abs() < 1e-5);
    }
}
