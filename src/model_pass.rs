//! wgpu implementation of [`RenderBackend`] for flat-colored models.
//!
//! [`ModelPass`] records the draw calls the scene issues during a frame and
//! replays them in a single render pass from [`ModelPass::encode`].
//!
//! # Architecture
//!
//! The pipeline uses two bind groups:
//! - **Group 0**: Global uniforms (the global-rotation matrix)
//! - **Group 1**: Model uniforms (model matrix and color), bound with a
//!   dynamic offset so every draw in the frame keeps its own slot
//!
//! Queue writes only land when the command buffer is submitted, so writing a
//! single model uniform before each draw would leave every draw with the last
//! value. Instead each draw snapshots the sticky uniforms into its own slot
//! and the whole array is written once per frame.
//!
//! # Depth Buffer
//!
//! The pass owns a `Depth32Float` buffer that follows the surface size; call
//! [`ModelPass::ensure_depth_size`] before encoding if the window may have
//! been resized.

use std::num::NonZeroU64;

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::backend::{BufferId, RenderBackend};
use crate::color::Color;
use crate::error::RenderError;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Model slots allocated up front; the scene draws well under this per frame.
const INITIAL_MODEL_SLOTS: usize = 64;

/// Uniforms shared by every draw in a frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniforms {
    /// Rotation applied outside every model matrix.
    pub global_rotation: [[f32; 4]; 4],
}

/// Per-draw model uniforms.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    /// Model matrix (object to world space transformation).
    pub model: [[f32; 4]; 4],
    /// RGBA color of the whole draw.
    pub color: [f32; 4],
}

impl ModelUniforms {
    pub fn new(model: Mat4, color: Color) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: color.to_array(),
        }
    }
}

impl Default for ModelUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Color::WHITE)
    }
}

/// Size of one model slot, rounded up to the device's dynamic-offset alignment.
fn uniform_stride(alignment: u64) -> u64 {
    let size = std::mem::size_of::<ModelUniforms>() as u64;
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

/// Lays `slots` out at `stride` bytes apart, ready for one buffer write.
fn pack_slots(slots: &[ModelUniforms], stride: u64) -> Vec<u8> {
    let stride = stride as usize;
    let mut bytes = vec![0u8; slots.len() * stride];
    for (chunk, slot) in bytes.chunks_exact_mut(stride).zip(slots) {
        let src = bytemuck::bytes_of(slot);
        chunk[..src.len()].copy_from_slice(src);
    }
    bytes
}

struct VertexBuffer {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

/// A draw recorded between [`ModelPass::encode`] calls.
#[derive(Clone, Copy, Debug)]
struct QueuedDraw {
    buffer: BufferId,
    first: u32,
    count: u32,
}

/// Renders flat-colored triangle lists with depth testing.
///
/// # Pipeline Configuration
///
/// - No culling; the cube and cone winding is not consistent
/// - Alpha blending
/// - Depth write and Less-than comparison
pub struct ModelPass {
    device: wgpu::Device,
    pipeline: wgpu::RenderPipeline,
    global_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    model_capacity: usize,
    model_stride: u64,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
    vertex_buffers: Vec<VertexBuffer>,
    global_rotation: Mat4,
    current: ModelUniforms,
    slots: Vec<ModelUniforms>,
    draws: Vec<QueuedDraw>,
}

impl ModelPass {
    /// Creates the pipeline, uniform buffers and a depth buffer sized to the surface.
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Model Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/model.wgsl").into()),
        });

        // Global uniform buffer (group 0)
        let global_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Global Uniforms"),
            size: std::mem::size_of::<GlobalUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let global_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Global Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &global_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_buffer.as_entire_binding(),
            }],
        });

        // Model uniform buffer (group 1)
        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<ModelUniforms>() as u64),
                },
                count: None,
            }],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let model_stride = uniform_stride(alignment);
        let (model_buffer, model_bind_group) =
            Self::create_model_slots(device, &model_layout, model_stride, INITIAL_MODEL_SLOTS);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Model Pipeline Layout"),
            bind_group_layouts: &[&global_layout, &model_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Model Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let depth_view = Self::create_depth_view(gpu);

        Self {
            device: device.clone(),
            pipeline,
            global_buffer,
            global_bind_group,
            model_layout,
            model_buffer,
            model_bind_group,
            model_capacity: INITIAL_MODEL_SLOTS,
            model_stride,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
            vertex_buffers: Vec::new(),
            global_rotation: Mat4::IDENTITY,
            current: ModelUniforms::default(),
            slots: Vec::new(),
            draws: Vec::new(),
        }
    }

    fn create_model_slots(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniforms"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<ModelUniforms>() as u64),
                }),
            }],
        });

        (buffer, bind_group)
    }

    fn create_depth_view(gpu: &GpuContext) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Ensures the depth buffer matches the current surface size.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            self.depth_view = Self::create_depth_view(gpu);
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Drops the draws queued this frame without rendering them.
    pub fn discard(&mut self) {
        self.slots.clear();
        self.draws.clear();
    }

    fn ensure_model_capacity(&mut self, needed: usize) {
        if needed <= self.model_capacity {
            return;
        }
        let capacity = needed.next_power_of_two();
        log::debug!("Growing model uniform slots {} -> {}", self.model_capacity, capacity);
        let (buffer, bind_group) = Self::create_model_slots(
            &self.device,
            &self.model_layout,
            self.model_stride,
            capacity,
        );
        self.model_buffer = buffer;
        self.model_bind_group = bind_group;
        self.model_capacity = capacity;
    }

    /// Writes this frame's uniforms and records every queued draw into
    /// `target`, cleared to `background` first.
    ///
    /// The queue is emptied afterwards; uploaded vertex buffers stay.
    pub fn encode(
        &mut self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        background: Color,
    ) {
        self.ensure_depth_size(gpu);
        self.ensure_model_capacity(self.slots.len());

        let globals = GlobalUniforms {
            global_rotation: self.global_rotation.to_cols_array_2d(),
        };
        gpu.queue
            .write_buffer(&self.global_buffer, 0, bytemuck::cast_slice(&[globals]));
        if !self.slots.is_empty() {
            gpu.queue.write_buffer(
                &self.model_buffer,
                0,
                &pack_slots(&self.slots, self.model_stride),
            );
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Model Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(background.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.global_bind_group, &[]);

            for (slot, draw) in self.draws.iter().enumerate() {
                // Validated when queued.
                let Some(vertices) = self.vertex_buffers.get(draw.buffer.0) else {
                    continue;
                };
                let offset = (slot as u64 * self.model_stride) as u32;
                render_pass.set_bind_group(1, &self.model_bind_group, &[offset]);
                render_pass.set_vertex_buffer(0, vertices.buffer.slice(..));
                render_pass.draw(draw.first..draw.first + draw.count, 0..1);
            }
        }

        self.discard();
    }
}

impl RenderBackend for ModelPass {
    fn upload_vertices(&mut self, label: &str, mesh: &Mesh) -> Result<BufferId, RenderError> {
        if mesh.is_empty() {
            return Err(RenderError::EmptyUpload(label.to_string()));
        }

        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(mesh.vertices()),
                usage: wgpu::BufferUsages::VERTEX,
            });
        log::debug!("Uploaded '{}' ({} vertices)", label, mesh.vertex_count());

        self.vertex_buffers.push(VertexBuffer {
            buffer,
            vertex_count: mesh.vertex_count(),
        });
        Ok(BufferId(self.vertex_buffers.len() - 1))
    }

    fn set_global_rotation(&mut self, matrix: Mat4) {
        self.global_rotation = matrix;
    }

    fn set_color(&mut self, color: Color) {
        self.current.color = color.to_array();
    }

    fn set_model_matrix(&mut self, matrix: Mat4) {
        self.current.model = matrix.to_cols_array_2d();
    }

    fn draw_triangles(
        &mut self,
        buffer: BufferId,
        first: u32,
        count: u32,
    ) -> Result<(), RenderError> {
        let len = self
            .vertex_buffers
            .get(buffer.0)
            .ok_or(RenderError::UnknownBuffer(buffer))?
            .vertex_count;
        let end = first.saturating_add(count);
        if end > len {
            return Err(RenderError::DrawRange {
                buffer,
                first,
                end,
                len,
            });
        }

        self.slots.push(self.current);
        self.draws.push(QueuedDraw {
            buffer,
            first,
            count,
        });
        Ok(())
    }
}
