use thiserror::Error;

use crate::renderer::scene_buffers::{SceneBuffers, position_layout, uv_layout};

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("no compatible graphics adapter found")]
    AdapterUnavailable,
    #[error("failed to create rendering surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("failed to acquire graphics device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceUniform {
    pub mvp: [[f32; 4]; 4],
    pub marker_uv: [f32; 2],
    pub tex_angle: f32,
    pub _pad: f32,
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MarkerUniform {
    pub mvp: [[f32; 4]; 4],
    pub offset: [f32; 3],
    pub _pad: f32,
    pub color: [f32; 4],
}

pub struct GpuState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,

    // One pipeline per color write mask: full color for the plain view,
    // red / green+blue pairs for the anaglyph eyes.
    surface_pipeline: wgpu::RenderPipeline,
    surface_pipeline_left: wgpu::RenderPipeline,
    surface_pipeline_right: wgpu::RenderPipeline,
    marker_pipeline: wgpu::RenderPipeline,
    marker_pipeline_left: wgpu::RenderPipeline,
    marker_pipeline_right: wgpu::RenderPipeline,

    // Per-eye uniform slots; the plain view uses slot 0.
    surface_uniform_buffers: [wgpu::Buffer; 2],
    marker_uniform_buffers: [wgpu::Buffer; 2],
    surface_bind_group_layout: wgpu::BindGroupLayout,
    surface_bind_groups: [wgpu::BindGroup; 2],
    marker_bind_groups: [wgpu::BindGroup; 2],

    texture: wgpu::Texture,
    sampler: wgpu::Sampler,

    pub scene_buffers: SceneBuffers,
    depth_texture: wgpu::TextureView,
}

impl GpuState {
    pub async fn new(window: std::sync::Arc<winit::window::Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::AdapterUnavailable)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let surface_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Surface Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("surface.wgsl").into()),
        });
        let marker_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Marker Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("marker.wgsl").into()),
        });

        let surface_uniform_buffers = std::array::from_fn(|_| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Surface Uniform Buffer"),
                size: std::mem::size_of::<SurfaceUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });
        let marker_uniform_buffers = std::array::from_fn(|_| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Marker Uniform Buffer"),
                size: std::mem::size_of::<MarkerUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        let surface_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Surface Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let marker_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Marker Bind Group Layout"),
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

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let texture = create_checkerboard_texture(&device, &queue);
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let surface_bind_groups = std::array::from_fn(|i| {
            surface_bind_group(
                &device,
                &surface_bind_group_layout,
                &surface_uniform_buffers[i],
                &texture_view,
                &sampler,
            )
        });

        let marker_bind_groups = std::array::from_fn(|i| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Marker Bind Group"),
                layout: &marker_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: marker_uniform_buffers[i].as_entire_binding(),
                }],
            })
        });

        let surface_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Surface Pipeline Layout"),
                bind_group_layouts: &[&surface_bind_group_layout],
                push_constant_ranges: &[],
            });
        let marker_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Marker Pipeline Layout"),
                bind_group_layouts: &[&marker_bind_group_layout],
                push_constant_ranges: &[],
            });

        let surface_pipeline_for = |mask: wgpu::ColorWrites, label: &str| {
            build_pipeline(
                &device,
                &surface_pipeline_layout,
                &surface_shader,
                config.format,
                &[position_layout(), uv_layout()],
                wgpu::PrimitiveTopology::TriangleList,
                mask,
                label,
            )
        };
        let marker_pipeline_for = |mask: wgpu::ColorWrites, label: &str| {
            build_pipeline(
                &device,
                &marker_pipeline_layout,
                &marker_shader,
                config.format,
                &[position_layout()],
                wgpu::PrimitiveTopology::LineStrip,
                mask,
                label,
            )
        };

        let surface_pipeline = surface_pipeline_for(wgpu::ColorWrites::ALL, "Surface Pipeline");
        let surface_pipeline_left =
            surface_pipeline_for(wgpu::ColorWrites::RED, "Surface Pipeline (Left Eye)");
        let surface_pipeline_right = surface_pipeline_for(
            wgpu::ColorWrites::GREEN | wgpu::ColorWrites::BLUE,
            "Surface Pipeline (Right Eye)",
        );
        let marker_pipeline = marker_pipeline_for(wgpu::ColorWrites::ALL, "Marker Pipeline");
        let marker_pipeline_left =
            marker_pipeline_for(wgpu::ColorWrites::RED, "Marker Pipeline (Left Eye)");
        let marker_pipeline_right = marker_pipeline_for(
            wgpu::ColorWrites::GREEN | wgpu::ColorWrites::BLUE,
            "Marker Pipeline (Right Eye)",
        );

        let scene_buffers = SceneBuffers::new(&device);
        let depth_texture = create_depth_texture(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            surface_pipeline,
            surface_pipeline_left,
            surface_pipeline_right,
            marker_pipeline,
            marker_pipeline_left,
            marker_pipeline_right,
            surface_uniform_buffers,
            marker_uniform_buffers,
            surface_bind_group_layout,
            surface_bind_groups,
            marker_bind_groups,
            texture,
            sampler,
            scene_buffers,
            depth_texture,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    pub fn set_vsync(&mut self, enabled: bool) {
        self.config.present_mode = if enabled {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        self.surface.configure(&self.device, &self.config);
    }

    pub fn write_frame_uniforms(
        &self,
        slot: usize,
        surface: &SurfaceUniform,
        marker: &MarkerUniform,
    ) {
        self.queue.write_buffer(
            &self.surface_uniform_buffers[slot],
            0,
            bytemuck::cast_slice(std::slice::from_ref(surface)),
        );
        self.queue.write_buffer(
            &self.marker_uniform_buffers[slot],
            0,
            bytemuck::cast_slice(std::slice::from_ref(marker)),
        );
    }

    /// Swaps the bound texture for a freshly decoded image, downscaling
    /// first if it exceeds the device's 2D texture limit.
    pub fn install_texture(&mut self, img: image::RgbaImage) {
        let max_dim = self.device.limits().max_texture_dimension_2d;
        let (src_w, src_h) = img.dimensions();

        let img = if src_w > max_dim || src_h > max_dim {
            let scale = max_dim as f32 / src_w.max(src_h) as f32;
            let new_w = ((src_w as f32 * scale) as u32).max(1);
            let new_h = ((src_h as f32 * scale) as u32).max(1);
            log::warn!(
                "texture {src_w}x{src_h} exceeds device limit {max_dim}, scaling to {new_w}x{new_h}"
            );
            image::DynamicImage::ImageRgba8(img)
                .resize(new_w, new_h, image::imageops::FilterType::Lanczos3)
                .to_rgba8()
        } else {
            img
        };

        let (width, height) = img.dimensions();
        let texture_size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        self.texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Surface Texture"),
            size: texture_size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &img,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            texture_size,
        );

        let texture_view = self
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.surface_bind_groups = std::array::from_fn(|i| {
            surface_bind_group(
                &self.device,
                &self.surface_bind_group_layout,
                &self.surface_uniform_buffers[i],
                &texture_view,
                &self.sampler,
            )
        });
    }

    /// Single full-color pass for the plain display mode; reads slot 0.
    pub fn render_plain(
        &self,
        view: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
        show_marker: bool,
    ) {
        let mut render_pass = self.begin_scene_pass(view, encoder, true, "Scene Render Pass");
        self.draw_scene(
            &mut render_pass,
            0,
            &self.surface_pipeline,
            &self.marker_pipeline,
            show_marker,
        );
    }

    /// Two masked passes for the anaglyph mode: left eye through the red
    /// channel, right eye through green+blue, depth cleared between eyes.
    pub fn render_anaglyph(
        &self,
        view: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
        show_marker: bool,
    ) {
        {
            let mut render_pass =
                self.begin_scene_pass(view, encoder, true, "Left Eye Render Pass");
            self.draw_scene(
                &mut render_pass,
                0,
                &self.surface_pipeline_left,
                &self.marker_pipeline_left,
                show_marker,
            );
        }
        {
            let mut render_pass =
                self.begin_scene_pass(view, encoder, false, "Right Eye Render Pass");
            self.draw_scene(
                &mut render_pass,
                1,
                &self.surface_pipeline_right,
                &self.marker_pipeline_right,
                show_marker,
            );
        }
    }

    fn begin_scene_pass<'e>(
        &self,
        view: &wgpu::TextureView,
        encoder: &'e mut wgpu::CommandEncoder,
        clear_color: bool,
        label: &'static str,
    ) -> wgpu::RenderPass<'e> {
        let load = if clear_color {
            wgpu::LoadOp::Clear(wgpu::Color::BLACK)
        } else {
            wgpu::LoadOp::Load
        };

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }

    fn draw_scene(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        slot: usize,
        surface_pipeline: &wgpu::RenderPipeline,
        marker_pipeline: &wgpu::RenderPipeline,
        show_marker: bool,
    ) {
        render_pass.set_pipeline(surface_pipeline);
        render_pass.set_bind_group(0, &self.surface_bind_groups[slot], &[]);
        render_pass.set_vertex_buffer(0, self.scene_buffers.surface_position_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.scene_buffers.surface_uv_buffer.slice(..));
        render_pass.draw(0..self.scene_buffers.surface_vertex_count, 0..1);

        if show_marker && self.scene_buffers.marker_vertex_count > 0 {
            render_pass.set_pipeline(marker_pipeline);
            render_pass.set_bind_group(0, &self.marker_bind_groups[slot], &[]);
            render_pass.set_vertex_buffer(0, self.scene_buffers.marker_vertex_buffer.slice(..));
            render_pass.draw(0..self.scene_buffers.marker_vertex_count, 0..1);
        }
    }
}

fn surface_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform: &wgpu::Buffer,
    texture_view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Surface Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(texture_view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

#[allow(clippy::too_many_arguments)]
fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    topology: wgpu::PrimitiveTopology,
    write_mask: wgpu::ColorWrites,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: config.width.max(1),
        height: config.height.max(1),
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

// Placeholder bound until an image arrives, and kept when decoding fails.
fn create_checkerboard_texture(device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::Texture {
    let texture_size = wgpu::Extent3d {
        width: 2,
        height: 2,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Fallback Texture"),
        size: texture_size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &[
            60, 60, 60, 255, 200, 200, 200, 255, //
            200, 200, 200, 255, 60, 60, 60, 255,
        ],
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(8),
            rows_per_image: Some(2),
        },
        texture_size,
    );

    texture
}
