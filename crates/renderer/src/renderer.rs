//! Main renderer managing wgpu state and rendering.

use crate::{
    camera::{Camera, FrameUniform},
    material::{DrawCommand, DrawUniform, Material},
    mesh::{Mesh, MeshData},
    pipeline::{
        create_background_pipeline, create_draw_bind_group_layout,
        create_environment_bind_group_layout, create_frame_bind_group_layout,
        create_mesh_pipeline, create_skybox_pipeline, create_texture_bind_group_layout,
    },
    texture::{BoundTexture, CubeFaces, CubeTexture, EnvironmentMap, Texture},
};
use image::RgbaImage;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// Byte stride between per-draw uniforms in the dynamic buffer.
pub const DRAW_UNIFORM_STRIDE: u64 = 256;
/// Draw slots available per frame; extra draws are dropped with a warning.
pub const MAX_DRAWS_PER_FRAME: u64 = 4096;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.2,
    b: 0.3,
    a: 1.0,
};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to find a suitable GPU adapter")]
    NoAdapter,

    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("shader compilation failed: {0}")]
    ShaderCompilation(String),

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// What fills the frame behind the meshes.
#[derive(Clone, Copy)]
pub enum Background<'a> {
    /// Flat ground colour below `horizon_px` (from the bottom edge), sky colour above.
    Gradient {
        ground: [f32; 3],
        sky: [f32; 3],
        horizon_px: f32,
    },
    Skybox(&'a EnvironmentMap),
}

pub struct Renderer {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    depth_texture: Texture,

    frame_uniform: FrameUniform,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    /// Next free draw slot this frame.
    frame_draw_offset: u64,

    texture_bind_group_layout: wgpu::BindGroupLayout,
    environment_bind_group_layout: wgpu::BindGroupLayout,
    default_texture: BoundTexture,
    default_environment: EnvironmentMap,

    mesh_pipeline: wgpu::RenderPipeline,
    background_pipeline: wgpu::RenderPipeline,
    skybox_pipeline: wgpu::RenderPipeline,
}

impl Renderer {
    /// Create a new renderer for the given window.
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

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

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            Texture::create_depth_texture(&device, config.width, config.height, "Depth Texture");

        let frame_bind_group_layout = create_frame_bind_group_layout(&device);
        let draw_bind_group_layout = create_draw_bind_group_layout(&device);
        let texture_bind_group_layout = create_texture_bind_group_layout(&device);
        let environment_bind_group_layout = create_environment_bind_group_layout(&device);

        // Shader and pipeline errors surface through the validation scope, not a panic.
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mesh_pipeline = create_mesh_pipeline(
            &device,
            config.format,
            &frame_bind_group_layout,
            &draw_bind_group_layout,
            &texture_bind_group_layout,
            &environment_bind_group_layout,
        );
        let background_pipeline =
            create_background_pipeline(&device, config.format, &frame_bind_group_layout);
        let skybox_pipeline = create_skybox_pipeline(
            &device,
            config.format,
            &frame_bind_group_layout,
            &environment_bind_group_layout,
        );
        if let Some(error) = device.pop_error_scope().await {
            return Err(RenderError::ShaderCompilation(error.to_string()));
        }

        let frame_uniform = FrameUniform::new();
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Buffer"),
            contents: bytemuck::cast_slice(&[frame_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let draw_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniform Buffer"),
            size: DRAW_UNIFORM_STRIDE * MAX_DRAWS_PER_FRAME,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let draw_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Bind Group"),
            layout: &draw_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &draw_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniform>() as u64),
                }),
            }],
        });

        let default_texture = bind_texture_with(
            &device,
            &texture_bind_group_layout,
            Texture::white_pixel(&device, &queue),
            "Default Texture Bind Group",
        );
        let default_environment = bind_environment_with(
            &device,
            &environment_bind_group_layout,
            CubeTexture::solid(&device, &queue, [0, 0, 0, 255]),
            "Default Environment Bind Group",
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            depth_texture,
            frame_uniform,
            frame_buffer,
            frame_bind_group,
            draw_buffer,
            draw_bind_group,
            frame_draw_offset: 0,
            texture_bind_group_layout,
            environment_bind_group_layout,
            default_texture,
            default_environment,
            mesh_pipeline,
            background_pipeline,
            skybox_pipeline,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = Texture::create_depth_texture(
                &self.device,
                self.config.width,
                self.config.height,
                "Depth Texture",
            );
        }
    }

    /// Reconfigure the surface at its current size (after `Lost` / `Outdated`).
    pub fn reconfigure(&mut self) {
        self.resize(self.size);
    }

    /// Upload a decoded image and bind it for mesh drawing.
    pub fn upload_texture(&self, image: &RgbaImage, label: &str) -> BoundTexture {
        let texture = Texture::from_image(&self.device, &self.queue, image, label);
        bind_texture_with(&self.device, &self.texture_bind_group_layout, texture, label)
    }

    /// Upload six cube faces and bind them for skybox drawing and reflections.
    pub fn upload_environment(&self, faces: &CubeFaces, label: &str) -> EnvironmentMap {
        let cube = CubeTexture::from_faces(&self.device, &self.queue, faces, label);
        bind_environment_with(&self.device, &self.environment_bind_group_layout, cube, label)
    }

    pub fn upload_mesh(&self, data: &MeshData) -> Mesh {
        data.upload(&self.device)
    }

    /// Write the per-frame camera constants.
    pub fn update_camera(&mut self, camera: &Camera) {
        self.frame_uniform
            .update(camera, self.config.width, self.config.height);
        self.write_frame_uniform();
    }

    fn write_frame_uniform(&self) {
        self.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::cast_slice(&[self.frame_uniform]),
        );
    }

    /// Begin a new frame, returns the command encoder and output view.
    pub fn begin_frame(&mut self) -> Result<(wgpu::SurfaceTexture, wgpu::CommandEncoder), RenderError> {
        self.frame_draw_offset = 0;
        let output = self.surface.get_current_texture()?;
        let encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        Ok((output, encoder))
    }

    /// Clear colour and depth, then fill the background. Call first in the frame.
    pub fn render_background(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        background: Background<'_>,
    ) {
        if let Background::Gradient {
            ground,
            sky,
            horizon_px,
        } = background
        {
            self.frame_uniform.viewport[2] = horizon_px;
            self.frame_uniform.ground_color = [ground[0], ground[1], ground[2], 1.0];
            self.frame_uniform.sky_color = [sky[0], sky[1], sky[2], 1.0];
            self.write_frame_uniform();
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Background Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        match background {
            Background::Gradient { .. } => {
                render_pass.set_pipeline(&self.background_pipeline);
                render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            }
            Background::Skybox(environment) => {
                render_pass.set_pipeline(&self.skybox_pipeline);
                render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
                render_pass.set_bind_group(1, &environment.bind_group, &[]);
            }
        }
        render_pass.draw(0..3, 0..1);
    }

    /// Draw recorded mesh commands on top of the existing frame content.
    pub fn render_meshes(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        commands: &[DrawCommand<'_>],
    ) {
        if commands.is_empty() {
            return;
        }

        // Allocate unique uniform slots for this batch.
        let first = self.frame_draw_offset;
        let remaining = MAX_DRAWS_PER_FRAME.saturating_sub(first) as usize;
        let count = commands.len().min(remaining);
        if count < commands.len() {
            log::warn!(
                "Draw limit reached: dropping {} of {} draws",
                commands.len() - count,
                commands.len()
            );
        }
        if count == 0 {
            return;
        }

        let stride = DRAW_UNIFORM_STRIDE as usize;
        let mut staging = vec![0u8; count * stride];
        for (slot, command) in staging.chunks_exact_mut(stride).zip(commands) {
            let uniform = DrawUniform::from_command(command);
            let bytes = bytemuck::bytes_of(&uniform);
            slot[..bytes.len()].copy_from_slice(bytes);
        }
        self.queue
            .write_buffer(&self.draw_buffer, first * DRAW_UNIFORM_STRIDE, &staging);
        self.frame_draw_offset = first + count as u64;

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Mesh Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.mesh_pipeline);
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
        for (i, command) in commands[..count].iter().enumerate() {
            let offset = ((first + i as u64) * DRAW_UNIFORM_STRIDE) as u32;
            let texture = command.texture.unwrap_or(&self.default_texture);
            let environment = match command.material {
                Material::Reflective { environment } => environment,
                _ => &self.default_environment,
            };
            render_pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
            render_pass.set_bind_group(2, &texture.bind_group, &[]);
            render_pass.set_bind_group(3, &environment.bind_group, &[]);
            render_pass.set_vertex_buffer(0, command.mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(
                command.mesh.index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            render_pass.draw_indexed(0..command.mesh.num_indices, 0, 0..1);
        }
    }

    /// End frame and present.
    pub fn end_frame(&self, output: wgpu::SurfaceTexture, encoder: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.size
    }
}

fn bind_texture_with(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: Texture,
    label: &str,
) -> BoundTexture {
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    });
    BoundTexture {
        texture,
        bind_group,
    }
}

fn bind_environment_with(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    cube: CubeTexture,
    label: &str,
) -> EnvironmentMap {
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&cube.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&cube.sampler),
            },
        ],
    });
    EnvironmentMap { cube, bind_group }
}
