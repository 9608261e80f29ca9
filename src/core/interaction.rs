//! Mouse interaction: pan, select/scrub, hover and zoom.
//!
//! Each button runs its own `Idle -> Dragging -> Idle` cycle with its own
//! anchor. Right drag pans; left press selects on the first sample and then
//! scrubs. Both may be armed at once; nothing arbitrates between them.
//!
//! Per sample the order is: pan, press, hover, zoom. Hover therefore sees
//! this sample's pan, and a scroll delta takes effect from the next sample.

use crate::constants::ZOOM_STEP_PER_SCROLL;
use crate::core::hit_test::hit_test;
use crate::core::transform::pixel_to_coord;
use crate::state::{Clip, ClipId, PixelPos, SelectionState, TimelineCoord, TimelineViewMeta};

/// One snapshot of the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseSample {
    pub position: PixelPos,
    pub left_down: bool,
    pub right_down: bool,
    /// Scroll wheel movement since the last sample
    pub scroll_delta: f64,
}

impl MouseSample {
    pub fn hover(x: f64, y: f64) -> Self {
        Self {
            position: PixelPos::new(x, y),
            ..Self::default()
        }
    }

    pub fn left(x: f64, y: f64) -> Self {
        Self {
            left_down: true,
            ..Self::hover(x, y)
        }
    }

    pub fn right(x: f64, y: f64) -> Self {
        Self {
            right_down: true,
            ..Self::hover(x, y)
        }
    }

    pub fn scroll(x: f64, y: f64, scroll_delta: f64) -> Self {
        Self {
            scroll_delta,
            ..Self::hover(x, y)
        }
    }
}

/// Receives events the timeline does not handle itself.
pub trait TimelineObserver {
    /// A press (or a drag continuing from a press) landed on `coord`.
    fn clicked_empty_space(&mut self, coord: TimelineCoord);
}

impl<F: FnMut(TimelineCoord)> TimelineObserver for F {
    fn clicked_empty_space(&mut self, coord: TimelineCoord) {
        self(coord)
    }
}

/// State captured when a right drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PanAnchor {
    meta: TimelineViewMeta,
    start: PixelPos,
}

/// What a sample resolved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleOutcome {
    pub hover: TimelineCoord,
    pub hovered_clip: Option<ClipId>,
    /// Scroll or zoom changed during this sample
    pub view_changed: bool,
}

#[derive(Debug, Clone)]
pub struct InteractionState {
    pan_anchor: Option<PanAnchor>,
    press_anchor: Option<PixelPos>,
    hover: TimelineCoord,
    zoom_step: f32,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            pan_anchor: None,
            press_anchor: None,
            hover: TimelineCoord::default(),
            zoom_step: ZOOM_STEP_PER_SCROLL,
        }
    }
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column width change per unit of scroll delta.
    pub fn with_zoom_step(mut self, zoom_step: f32) -> Self {
        self.zoom_step = zoom_step;
        self
    }

    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    pub fn is_pressing(&self) -> bool {
        self.press_anchor.is_some()
    }

    /// Coordinate under the pointer at the last sample.
    pub fn hover_coord(&self) -> TimelineCoord {
        self.hover
    }

    /// Drop both drag anchors.
    pub fn reset(&mut self) {
        self.pan_anchor = None;
        self.press_anchor = None;
    }

    pub fn handle_sample(
        &mut self,
        sample: &MouseSample,
        view: &mut TimelineViewMeta,
        clips: &[Clip],
        selection: &SelectionState,
        observer: &mut dyn TimelineObserver,
    ) -> SampleOutcome {
        let before = *view;

        self.update_pan(sample, view);
        self.update_press(sample, view, clips, selection, observer);

        self.hover = pixel_to_coord(sample.position, view);
        let hovered_clip = hit_test(self.hover, clips).map(|clip| clip.id);
        selection.set_hovered(hovered_clip);

        if sample.scroll_delta != 0.0 {
            view.apply_scroll_zoom_with(sample.scroll_delta, self.zoom_step);
        }

        SampleOutcome {
            hover: self.hover,
            hovered_clip,
            view_changed: *view != before,
        }
    }

    fn update_pan(&mut self, sample: &MouseSample, view: &mut TimelineViewMeta) {
        if !sample.right_down {
            self.pan_anchor = None;
            return;
        }

        let anchor = *self.pan_anchor.get_or_insert(PanAnchor {
            meta: *view,
            start: sample.position,
        });
        // measure against the drag-start view so the delta doesn't drift as we scroll
        let start = pixel_to_coord(PixelPos::new(anchor.start.x, 0.0), &anchor.meta);
        let now = pixel_to_coord(PixelPos::new(sample.position.x, 0.0), &anchor.meta);
        let change = start.x.saturating_sub(now.x);
        view.left_column = anchor.meta.left_column.saturating_add(change);
    }

    fn update_press(
        &mut self,
        sample: &MouseSample,
        view: &TimelineViewMeta,
        clips: &[Clip],
        selection: &SelectionState,
        observer: &mut dyn TimelineObserver,
    ) {
        if !sample.left_down {
            self.press_anchor = None;
            return;
        }

        let coord = pixel_to_coord(sample.position, view);
        if self.press_anchor.is_some() {
            // scrub: clips are not reconsidered mid-drag
            observer.clicked_empty_space(coord);
            return;
        }

        self.press_anchor = Some(sample.position);
        match hit_test(coord, clips) {
            Some(clip) => {
                log::debug!("Selected clip {} at ({},{})", clip.id, coord.x, coord.y);
                selection.select_clip(clip.id);
            }
            None => {
                selection.clear_selection();
                observer.clicked_empty_space(coord);
            }
        }
    }
}
