//! Selection and hover state shared with the host.

use super::{Binding, ClipId};

/// Selected and hovered clip, each a two-way binding.
///
/// Ids are weak references: an id with no matching clip simply highlights
/// nothing.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub selected: Binding<Option<ClipId>>,
    pub hovered: Binding<Option<ClipId>>,
}

impl SelectionState {
    pub fn new(selected: Binding<Option<ClipId>>, hovered: Binding<Option<ClipId>>) -> Self {
        Self { selected, hovered }
    }

    /// Replace the selection with a single clip.
    pub fn select_clip(&self, clip_id: ClipId) {
        self.selected.set_if_changed(Some(clip_id));
    }

    pub fn clear_selection(&self) {
        self.selected.set_if_changed(None);
    }

    pub fn set_hovered(&self, clip_id: Option<ClipId>) {
        self.hovered.set_if_changed(clip_id);
    }

    pub fn selected_clip(&self) -> Option<ClipId> {
        self.selected.get()
    }

    pub fn hovered_clip(&self) -> Option<ClipId> {
        self.hovered.get()
    }
}
