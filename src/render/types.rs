//! Instance records and uniforms shared with the WGSL shaders.
//!
//! Field order and sizes must match `shaders.rs`.

use crate::constants::{CLIP_FLAG_HOVERED, CLIP_FLAG_SELECTED};
use crate::state::{Clip, ClipId, Marker, Notch, NotchMeta, PixelSize, TimelineViewMeta};

/// Vertex attribute formats the instance layouts use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeFormat {
    Uint32x4,
    Sint32,
    Float32x4,
}

/// One per-instance attribute of a pipeline's instance buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceAttribute {
    pub location: u32,
    pub offset: u64,
    pub format: AttributeFormat,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ClipInstance {
    pub column: u32,
    pub width: u32,
    pub row: u32,
    /// `CLIP_FLAG_*` bits
    pub flags: u32,
    pub colour: [f32; 4],
}

impl ClipInstance {
    pub const ATTRIBUTES: &'static [InstanceAttribute] = &[
        InstanceAttribute {
            location: 0,
            offset: 0,
            format: AttributeFormat::Uint32x4,
        },
        InstanceAttribute {
            location: 1,
            offset: 16,
            format: AttributeFormat::Float32x4,
        },
    ];

    pub fn new(clip: &Clip, selected: Option<ClipId>, hovered: Option<ClipId>) -> Self {
        let mut flags = 0;
        if selected == Some(clip.id) {
            flags |= CLIP_FLAG_SELECTED;
        }
        if hovered == Some(clip.id) {
            flags |= CLIP_FLAG_HOVERED;
        }
        Self {
            column: clip.column,
            width: clip.width,
            row: clip.row,
            flags,
            colour: clip.colour.to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NotchInstance {
    pub frame: i32,
}

impl NotchInstance {
    pub const ATTRIBUTES: &'static [InstanceAttribute] = &[InstanceAttribute {
        location: 0,
        offset: 0,
        format: AttributeFormat::Sint32,
    }];
}

impl From<Notch> for NotchInstance {
    fn from(notch: Notch) -> Self {
        Self { frame: notch.frame }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MarkerInstance {
    pub column: i32,
    _pad: [u32; 3],
    pub colour: [f32; 4],
}

impl MarkerInstance {
    pub const ATTRIBUTES: &'static [InstanceAttribute] = &[
        InstanceAttribute {
            location: 0,
            offset: 0,
            format: AttributeFormat::Sint32,
        },
        InstanceAttribute {
            location: 1,
            offset: 16,
            format: AttributeFormat::Float32x4,
        },
    ];
}

impl From<&Marker> for MarkerInstance {
    fn from(marker: &Marker) -> Self {
        Self {
            column: marker.column,
            _pad: [0; 3],
            colour: marker.colour.to_array(),
        }
    }
}

/// Per-draw uniform block, identical layout for every batch kind.
///
/// Clip box and marker draws leave the clip fields zeroed; notch draws carry
/// their owning clip so frames resolve relative to its first column.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BatchUniform {
    pub left_column: i32,
    pub row_height_px: u32,
    pub row_gap_px: u32,
    pub column_width_px: f32,
    pub viewport_px: [f32; 2],
    _pad0: [f32; 2],
    /// column, width, row, flags of the owning clip
    pub clip: [u32; 4],
    pub colour: [f32; 4],
    pub notch_row: i32,
    pub min_width_px: f32,
    _pad1: [f32; 2],
}

impl BatchUniform {
    pub fn new(view: &TimelineViewMeta, viewport: PixelSize) -> Self {
        Self {
            left_column: view.left_column,
            row_height_px: view.row_height_px,
            row_gap_px: view.row_gap_px,
            column_width_px: view.column_width_px,
            viewport_px: viewport.to_array(),
            _pad0: [0.0; 2],
            clip: [0; 4],
            colour: [0.0; 4],
            notch_row: 0,
            min_width_px: 0.0,
            _pad1: [0.0; 2],
        }
    }

    pub fn with_min_width(mut self, min_width_px: f32) -> Self {
        self.min_width_px = min_width_px;
        self
    }

    pub fn with_notch_owner(mut self, owner: &ClipInstance, meta: &NotchMeta) -> Self {
        self.clip = [owner.column, owner.width, owner.row, owner.flags];
        self.colour = meta.colour.to_array();
        self.notch_row = meta.notch_row;
        self.min_width_px = meta.min_width_px;
        self
    }
}
