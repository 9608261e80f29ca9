//! WGSL for the three batch kinds.
//!
//! The vertex shaders mirror `core::transform`: columns scale by the column
//! width after subtracting the left column, rows stack upward from the bottom
//! edge at `row_height + row_gap` pitch. Quads are drawn as 4-vertex triangle
//! strips with one instance per entity.

pub const TIMELINE_SHADER_LABEL: &str = "timeline_shader";

pub const CLIP_BOX_VERTEX: &str = "clip_box_vertex";
pub const NOTCH_VERTEX: &str = "notch_vertex";
pub const MARKER_VERTEX: &str = "marker_vertex";
pub const COLOUR_FRAGMENT: &str = "colour_frag";

pub const TIMELINE_SHADER: &str = r#"
struct BatchUniform {
    left_column: i32,
    row_height_px: u32,
    row_gap_px: u32,
    column_width_px: f32,
    viewport_px: vec2<f32>,
    _pad0: vec2<f32>,
    clip: vec4<u32>,
    colour: vec4<f32>,
    notch_row: i32,
    min_width_px: f32,
    _pad1: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) colour: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> batch: BatchUniform;

// strip order (0,0) (1,0) (0,1) (1,1)
fn quad_corner(vertex_index: u32) -> vec2<f32> {
    return vec2<f32>(f32(vertex_index & 1u), f32((vertex_index >> 1u) & 1u));
}

fn row_pitch() -> f32 {
    return f32(batch.row_height_px + batch.row_gap_px);
}

fn column_to_px(column: f32) -> f32 {
    return (column - f32(batch.left_column)) * batch.column_width_px;
}

fn place(origin: vec2<f32>, size: vec2<f32>, corner: vec2<f32>, colour: vec4<f32>) -> VertexOutput {
    let px = origin + size * corner;
    let ndc = px / max(batch.viewport_px, vec2<f32>(1.0, 1.0)) * 2.0 - vec2<f32>(1.0, 1.0);
    var out: VertexOutput;
    out.position = vec4<f32>(ndc, 0.0, 1.0);
    out.colour = colour;
    return out;
}

@vertex
fn clip_box_vertex(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) clip: vec4<u32>,
    @location(1) colour: vec4<f32>,
) -> VertexOutput {
    let width = f32(max(clip.y, 1u));
    let origin = vec2<f32>(column_to_px(f32(clip.x)), f32(clip.z) * row_pitch());
    let size = vec2<f32>(width * batch.column_width_px, f32(batch.row_height_px));

    var tint = colour;
    if ((clip.w & 1u) != 0u) {
        tint = vec4<f32>(mix(colour.rgb, vec3<f32>(1.0, 1.0, 1.0), 0.35), colour.a);
    } else if ((clip.w & 2u) != 0u) {
        tint = vec4<f32>(mix(colour.rgb, vec3<f32>(1.0, 1.0, 1.0), 0.15), colour.a);
    }
    return place(origin, size, quad_corner(vertex_index), tint);
}

@vertex
fn notch_vertex(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) frame: i32,
) -> VertexOutput {
    let column = f32(batch.clip.x) + f32(frame);
    let row = f32(batch.clip.z) + f32(batch.notch_row);
    let origin = vec2<f32>(column_to_px(column), row * row_pitch());
    let size = vec2<f32>(max(batch.column_width_px, batch.min_width_px), f32(batch.row_height_px));
    return place(origin, size, quad_corner(vertex_index), batch.colour);
}

@vertex
fn marker_vertex(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) column: i32,
    @location(1) colour: vec4<f32>,
) -> VertexOutput {
    let origin = vec2<f32>(column_to_px(f32(column)), 0.0);
    let size = vec2<f32>(max(batch.column_width_px, batch.min_width_px), batch.viewport_px.y);
    return place(origin, size, quad_corner(vertex_index), colour);
}

@fragment
fn colour_frag(input: VertexOutput) -> @location(0) vec4<f32> {
    return input.colour;
}
"#;
