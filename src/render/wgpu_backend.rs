use std::num::NonZeroU64;

use wgpu::util::DeviceExt;

use crate::error::{Result, TimelineError};
use crate::state::PixelSize;

use super::types::{AttributeFormat, BatchUniform};
use super::{InstancedDraw, PipelineDescriptor, PipelineHandle, RenderBackend};

const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

struct PendingDraw {
    pipeline: usize,
    instances: wgpu::Buffer,
    instance_count: u32,
    bind_group: wgpu::BindGroup,
}

/// Draws timeline batches with wgpu.
///
/// Draws are queued by `draw_instanced` and encoded into one render pass by
/// `finish_frame`.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    uniform_bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: Vec<wgpu::RenderPipeline>,
    pending: Vec<PendingDraw>,
}

impl WgpuBackend {
    /// Wrap an existing device; `format` is the colour target's format.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("timeline_uniform_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<BatchUniform>() as u64,
                        ),
                    },
                    count: None,
                }],
            });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("timeline_pipeline_layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        Self {
            device,
            queue,
            format,
            uniform_bind_group_layout,
            pipeline_layout,
            pipelines: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Acquire a device without a window, drawing into `OffscreenTarget`s.
    pub fn headless() -> Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or(TimelineError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("timeline_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
            },
            None,
        ))
        .map_err(|err| TimelineError::Device(err.to_string()))?;

        log::info!("Using GPU adapter {}", adapter.get_info().name);
        Ok(Self::new(device, queue, OFFSCREEN_FORMAT))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn pending_draws(&self) -> usize {
        self.pending.len()
    }

    /// Texture the headless backend can render into.
    pub fn create_target(&self, size: PixelSize) -> OffscreenTarget {
        let width = (size.width.max(1.0) as u32).min(self.device.limits().max_texture_dimension_2d);
        let height =
            (size.height.max(1.0) as u32).min(self.device.limits().max_texture_dimension_2d);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("timeline_offscreen_target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        OffscreenTarget {
            texture,
            view,
            size: PixelSize::new(width as f64, height as f64),
        }
    }

    /// Encode every queued draw into one pass over `target` and submit.
    pub fn finish_frame(&mut self, target: &wgpu::TextureView, clear: [f64; 4]) {
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("timeline_frame"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("timeline_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear[0],
                            g: clear[1],
                            b: clear[2],
                            a: clear[3],
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for draw in &self.pending {
                let Some(pipeline) = self.pipelines.get(draw.pipeline) else {
                    continue;
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &draw.bind_group, &[]);
                pass.set_vertex_buffer(0, draw.instances.slice(..));
                pass.draw(0..4, 0..draw.instance_count);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        self.pending.clear();
    }
}

impl RenderBackend for WgpuBackend {
    fn create_pipeline(&mut self, descriptor: &PipelineDescriptor<'_>) -> Result<PipelineHandle> {
        descriptor.validate_entry_points()?;

        let attributes: Vec<wgpu::VertexAttribute> = descriptor
            .attributes
            .iter()
            .map(|attribute| wgpu::VertexAttribute {
                format: vertex_format(attribute.format),
                offset: attribute.offset,
                shader_location: attribute.location,
            })
            .collect();

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(descriptor.shader_label),
            source: wgpu::ShaderSource::Wgsl(descriptor.shader_source.into()),
        });
        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(descriptor.label),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: descriptor.vertex_entry,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: descriptor.instance_stride,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &attributes,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: descriptor.fragment_entry,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(TimelineError::Pipeline {
                label: descriptor.label,
                message: err.to_string(),
            });
        }

        self.pipelines.push(pipeline);
        Ok(PipelineHandle(self.pipelines.len() - 1))
    }

    fn draw_instanced(&mut self, pipeline: PipelineHandle, draw: InstancedDraw<'_>) {
        if pipeline.0 >= self.pipelines.len() || draw.instance_count == 0 {
            return;
        }
        let instances = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("timeline_instance_buffer"),
            contents: draw.instances,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let uniform = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("timeline_uniform_buffer"),
            contents: bytemuck::bytes_of(&draw.uniform),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("timeline_uniform_bind_group"),
            layout: &self.uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
        });
        self.pending.push(PendingDraw {
            pipeline: pipeline.0,
            instances,
            instance_count: draw.instance_count,
            bind_group,
        });
    }
}

fn vertex_format(format: AttributeFormat) -> wgpu::VertexFormat {
    match format {
        AttributeFormat::Uint32x4 => wgpu::VertexFormat::Uint32x4,
        AttributeFormat::Sint32 => wgpu::VertexFormat::Sint32,
        AttributeFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
    }
}

/// A texture frames can be rendered into without a window.
pub struct OffscreenTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: PixelSize,
}
