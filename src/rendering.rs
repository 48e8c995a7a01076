//! Rendering system with wgpu pipelines for the line and lit styles.

mod offscreen;
mod window;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use thiserror::Error;
use wgpu::util::DeviceExt;

use crate::params::{DrawStyle, RenderConfig};
use crate::surface::{SurfaceGrid, Vertex};

pub use offscreen::{check_target_size, padded_bytes_per_row, OffscreenTarget};
pub use window::{clamp_size, SurfaceTarget};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to find suitable GPU adapter")]
    NoAdapter,

    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface supports no texture formats on this adapter")]
    NoSurfaceFormat,

    #[error("failed to acquire frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("failed to map readback buffer: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),

    #[error("readback callback was dropped")]
    ReadbackDropped,

    #[error("readback size does not match {0}x{1}")]
    ReadbackSize(u32, u32),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),

    #[error("render target {0}x{1} exceeds the device texture limit")]
    TargetTooLarge(u32, u32),
}

/// sRGB transfer function inverse, so the stored target value matches the configured colour
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Uniform block shared by both shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// xyz: normalized direction the light travels, w: ambient term
    pub light: [f32; 4],
}

impl Uniforms {
    pub fn new(view_proj: Mat4, config: &RenderConfig) -> Self {
        let direction = Vec3::from_array(config.light_direction).normalize_or_zero();
        let direction = if direction == Vec3::ZERO {
            Vec3::NEG_Z
        } else {
            direction
        };

        Self {
            view_proj: view_proj.to_cols_array_2d(),
            color: [
                srgb_to_linear(config.color[0]),
                srgb_to_linear(config.color[1]),
                srgb_to_linear(config.color[2]),
                1.0,
            ],
            light: direction.extend(config.ambient.clamp(0.0, 1.0)).to_array(),
        }
    }
}

/// Create a wgpu instance on every available backend
pub fn create_instance() -> wgpu::Instance {
    wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}

/// Adapter, device and queue
pub struct Gpu {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl Gpu {
    /// Request a device, optionally compatible with a window surface
    pub async fn request(
        instance: &wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self, RenderError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        Ok(Self {
            adapter,
            device,
            queue,
        })
    }
}

/// Draws the surface mesh into any colour target of a fixed format
pub struct WaveRenderer {
    style: DrawStyle,
    line_pipeline: wgpu::RenderPipeline,
    lit_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    line_index_buffer: wgpu::Buffer,
    line_index_count: u32,
    triangle_index_buffer: wgpu::Buffer,
    triangle_index_count: u32,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    size: (u32, u32),
}

impl WaveRenderer {
    pub fn new(
        gpu: &Gpu,
        color_format: wgpu::TextureFormat,
        size: (u32, u32),
        grid: &SurfaceGrid,
        style: DrawStyle,
    ) -> Self {
        let device = &gpu.device;

        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Line Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("rendering/lines.wgsl").into()),
        });

        let lit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Lit Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("rendering/lit.wgsl").into()),
        });

        // Create buffers
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&grid.vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let line_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Line Index Buffer"),
            contents: bytemuck::cast_slice(&grid.line_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let triangle_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Triangle Index Buffer"),
            contents: bytemuck::cast_slice(&grid.triangle_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let uniforms = Uniforms::new(Mat4::IDENTITY, &RenderConfig::default());
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Wave Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        // Lines draw in submission order like the classic fixed-function demo
        let line_pipeline = create_pipeline(
            device,
            &PipelineSpec {
                label: "Line Pipeline",
                shader: &line_shader,
                layout: &pipeline_layout,
                color_format,
                topology: wgpu::PrimitiveTopology::LineList,
                attributes: &[wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                }],
                depth_test: false,
            },
        );

        let lit_pipeline = create_pipeline(
            device,
            &PipelineSpec {
                label: "Lit Pipeline",
                shader: &lit_shader,
                layout: &pipeline_layout,
                color_format,
                topology: wgpu::PrimitiveTopology::TriangleList,
                attributes: &[
                    wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    wgpu::VertexAttribute {
                        offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                        shader_location: 1,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                ],
                depth_test: true,
            },
        );

        let size = clamp_size(size.0, size.1);

        Self {
            style,
            line_pipeline,
            lit_pipeline,
            vertex_buffer,
            line_index_buffer,
            line_index_count: grid.line_indices.len() as u32,
            triangle_index_buffer,
            triangle_index_count: grid.triangle_indices.len() as u32,
            uniform_buffer,
            uniform_bind_group,
            depth_view: create_depth_view(device, size),
            size,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Recreate size-dependent attachments
    pub fn resize(&mut self, gpu: &Gpu, width: u32, height: u32) {
        let size = clamp_size(width, height);
        if size != self.size {
            self.size = size;
            self.depth_view = create_depth_view(&gpu.device, size);
        }
    }

    /// Upload this frame's mesh and uniforms
    pub fn update(&self, gpu: &Gpu, vertices: &[Vertex], uniforms: &Uniforms) {
        gpu.queue
            .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniforms]));
    }

    /// Clear `view` to black and draw the surface into it
    pub fn draw(&self, gpu: &Gpu, view: &wgpu::TextureView) {
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let (pipeline, index_buffer, index_count) = match self.style {
                DrawStyle::Lines => (
                    &self.line_pipeline,
                    &self.line_index_buffer,
                    self.line_index_count,
                ),
                DrawStyle::Lit => (
                    &self.lit_pipeline,
                    &self.triangle_index_buffer,
                    self.triangle_index_count,
                ),
            };

            if index_count > 0 {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..index_count, 0, 0..1);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
    }
}

struct PipelineSpec<'a> {
    label: &'a str,
    shader: &'a wgpu::ShaderModule,
    layout: &'a wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
    attributes: &'a [wgpu::VertexAttribute],
    depth_test: bool,
}

fn create_pipeline(device: &wgpu::Device, spec: &PipelineSpec<'_>) -> wgpu::RenderPipeline {
    // Both pipelines share the render pass depth attachment
    let (depth_write_enabled, depth_compare) = if spec.depth_test {
        (true, wgpu::CompareFunction::Less)
    } else {
        (false, wgpu::CompareFunction::Always)
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(spec.layout),
        vertex: wgpu::VertexState {
            module: spec.shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: spec.attributes,
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: spec.shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: spec.color_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: spec.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_view(device: &wgpu::Device, (width, height): (u32, u32)) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 96);
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }

    #[test]
    fn test_uniforms_from_config() {
        let config = RenderConfig::default();
        let uniforms = Uniforms::new(Mat4::IDENTITY, &config);

        // 0.6 in sRGB is about 0.3185 linear; the endpoints are fixed points
        assert_eq!(uniforms.color[0], 0.0);
        assert!((uniforms.color[1] - 0.3185).abs() < 1e-3);
        assert!((uniforms.color[2] - 1.0).abs() < 1e-6);
        assert_eq!(uniforms.color[3], 1.0);
        let light = Vec3::new(uniforms.light[0], uniforms.light[1], uniforms.light[2]);
        assert!((light.length() - 1.0).abs() < 1e-6);
        assert_eq!(uniforms.light[3], config.ambient);
    }

    #[test]
    fn test_srgb_to_linear_round_trips_through_8_bit_encoding() {
        // An sRGB target re-encodes 0.3185 back to about 0.6 * 255 = 153
        let stored = (1.055 * srgb_to_linear(0.6).powf(1.0 / 2.4) - 0.055) * 255.0;
        assert_eq!(stored.round(), 153.0);
        assert!((srgb_to_linear(0.04) - 0.04 / 12.92).abs() < 1e-7);
    }

    #[test]
    fn test_surface_errors_convert_to_render_error() {
        let err = RenderError::from(wgpu::SurfaceError::Lost);
        assert!(matches!(err, RenderError::Surface(wgpu::SurfaceError::Lost)));
    }

    #[test]
    fn test_zero_light_direction_falls_back_to_straight_down() {
        let config = RenderConfig {
            light_direction: [0.0; 3],
            ambient: 3.0,
            ..RenderConfig::default()
        };
        let uniforms = Uniforms::new(Mat4::IDENTITY, &config);

        assert_eq!(uniforms.light, [0.0, 0.0, -1.0, 1.0]);
    }
}
