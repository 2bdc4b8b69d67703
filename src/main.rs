use std::f64::consts::{PI, TAU};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use glam::{DVec3, Mat4, Vec2};

mod geometry;
mod renderer;
mod texture;
mod ui;

use geometry::{SurfaceParams, generate_sphere, map_linear, surface_point, tessellate};
use renderer::camera::{self, Eye, StereoCamera, Trackball};
use renderer::{GpuState, MarkerUniform, SurfaceUniform};
use texture::TextureLoader;
use ui::state::DisplayMode;
use ui::{Interaction, UiActions, UiState, apply_theme, draw_help_overlay, draw_side_panel};

const DEFAULT_TEXTURE_PATH: &str = "texture.png";
const MARKER_COLOR: [f32; 4] = [1.0, 0.85, 0.25, 1.0];
const MARKER_SLICES: u32 = 24;
const MARKER_STACKS: u32 = 12;

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    egui_ctx: egui::Context,

    trackball: Trackball,
    ui_state: UiState,
    interaction: Interaction,
    texture_loader: TextureLoader,

    mouse_pressed: bool,
    last_cursor: Option<PhysicalPosition<f64>>,

    last_vsync_state: bool,

    frame_count: u32,
    fps_timer: Instant,
    fps: f32,
}

impl App {
    fn new() -> Self {
        Self {
            window: None,
            gpu: None,
            egui_state: None,
            egui_renderer: None,
            egui_ctx: egui::Context::default(),

            trackball: Trackball::default(),
            ui_state: UiState::default(),
            interaction: Interaction::default(),
            texture_loader: TextureLoader::new(),

            mouse_pressed: false,
            last_cursor: None,

            last_vsync_state: true,

            frame_count: 0,
            fps_timer: Instant::now(),
            fps: 0.0,
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>, event_loop: &ActiveEventLoop) {
        let gpu = match pollster::block_on(GpuState::new(window.clone())) {
            Ok(gpu) => gpu,
            Err(e) => {
                log::error!("graphics initialisation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            self.egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );

        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);

        apply_theme(&self.egui_ctx);

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);

        self.rebuild_meshes();

        if Path::new(DEFAULT_TEXTURE_PATH).exists() {
            self.texture_loader.load(DEFAULT_TEXTURE_PATH.into());
        } else {
            log::info!("no {DEFAULT_TEXTURE_PATH} found, using the fallback texture");
        }
    }

    fn rebuild_meshes(&mut self) {
        let Some(gpu) = &mut self.gpu else { return };

        let started = Instant::now();
        let params = SurfaceParams::with_scale(self.ui_state.scale as f64);
        let mesh = tessellate(&params, self.ui_state.step as f64);
        let marker = generate_sphere(params.scale, MARKER_SLICES, MARKER_STACKS, DVec3::ZERO);

        gpu.scene_buffers.upload_surface(&gpu.queue, &mesh);
        gpu.scene_buffers.upload_marker(&gpu.queue, &marker);
        self.ui_state.mesh_needs_rebuild = false;

        log::info!(
            "tessellated {} surface vertices and {} marker vertices in {:.1?}",
            mesh.vertex_count(),
            marker.len() / 3,
            started.elapsed()
        );
    }

    fn update(&mut self) {
        self.frame_count += 1;
        if self.fps_timer.elapsed().as_secs_f32() >= 1.0 {
            self.fps = self.frame_count as f32 / self.fps_timer.elapsed().as_secs_f32();
            self.frame_count = 0;
            self.fps_timer = Instant::now();
        }

        if let Some(img) = self.texture_loader.try_recv() {
            if let Some(gpu) = &mut self.gpu {
                gpu.install_texture(img);
            }
        }

        if self.ui_state.vsync_enabled != self.last_vsync_state {
            if let Some(gpu) = &mut self.gpu {
                gpu.set_vsync(self.ui_state.vsync_enabled);
            }
            self.last_vsync_state = self.ui_state.vsync_enabled;
        }
    }

    fn render(&mut self) {
        let (Some(window), Some(egui_state)) = (&self.window, &mut self.egui_state) else {
            return;
        };

        let raw_input = egui_state.take_egui_input(window);
        let texture_error = self.texture_loader.last_error();

        let mut ui_actions = UiActions::default();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            ui_actions = draw_side_panel(ctx, &mut self.ui_state, &texture_error);
            if self.ui_state.show_help {
                draw_help_overlay(ctx, &self.interaction, self.fps);
            }
        });

        self.handle_ui_actions(ui_actions);

        let Some(gpu) = &mut self.gpu else { return };
        let Some(window) = &self.window else { return };
        let Some(egui_state) = &mut self.egui_state else {
            return;
        };
        let Some(egui_renderer) = &mut self.egui_renderer else {
            return;
        };

        egui_state.handle_platform_output(window, full_output.platform_output);

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.resize(gpu.size);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                panic!("Out of GPU memory");
            }
            Err(wgpu::SurfaceError::Timeout) => {
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // One projection for the plain view, one per eye for anaglyph; the
        // whole frame is skipped on an invalid camera configuration.
        let camera = StereoCamera {
            eye_separation: self.ui_state.eye_separation,
            convergence: self.ui_state.convergence,
            aspect: gpu.aspect(),
            fov: self.ui_state.fov_deg.to_radians(),
            near: self.ui_state.near,
            far: self.ui_state.far,
        };

        let projections = match self.ui_state.display_mode {
            DisplayMode::Plain => camera.perspective().map(|p| vec![p]),
            DisplayMode::Anaglyph => camera
                .frustum(Eye::Left)
                .and_then(|left| camera.frustum(Eye::Right).map(|right| vec![left, right])),
        };
        let projections = match projections {
            Ok(p) => p,
            Err(e) => {
                log::warn!("invalid camera configuration: {e}");
                return;
            }
        };

        let rotation = self.trackball.matrix();
        let object_rotation = if self.ui_state.orientation_enabled {
            let [x, y, z] = self.ui_state.orientation_deg;
            camera::orientation_matrix(x.to_radians(), y.to_radians(), z.to_radians())
        } else {
            Mat4::IDENTITY
        };

        let params = SurfaceParams::with_scale(self.ui_state.scale as f64);
        let (mx, my) = self.interaction.marker_coord;
        let marker_world = surface_point(
            &params,
            map_linear(mx, 0.0, 1.0, 0.0, TAU),
            map_linear(my, 0.0, 1.0, 0.0, TAU),
        )
        .as_vec3();

        for (slot, projection) in projections.iter().enumerate() {
            let surface_uniform = SurfaceUniform {
                mvp: camera::compose(rotation, *projection).to_cols_array_2d(),
                marker_uv: [mx as f32, my as f32],
                tex_angle: self.interaction.texture_angle,
                _pad: 0.0,
            };
            let marker_uniform = MarkerUniform {
                mvp: camera::compose_object(rotation, object_rotation, *projection)
                    .to_cols_array_2d(),
                offset: marker_world.to_array(),
                _pad: 0.0,
                color: MARKER_COLOR,
            };
            gpu.write_frame_uniforms(slot, &surface_uniform, &marker_uniform);
        }

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in full_output.textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, id, &delta);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Encoder"),
            });

        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        match self.ui_state.display_mode {
            DisplayMode::Plain => {
                gpu.render_plain(&view, &mut encoder, self.ui_state.show_marker)
            }
            DisplayMode::Anaglyph => {
                gpu.render_anaglyph(&view, &mut encoder, self.ui_state.show_marker)
            }
        }

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in full_output.textures_delta.free {
            egui_renderer.free_texture(&id);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        window.request_redraw();
    }

    fn handle_ui_actions(&mut self, actions: UiActions) {
        if actions.rebuild_mesh {
            self.rebuild_meshes();
        }

        if actions.reset_view {
            self.trackball.reset();
        }

        if actions.open_texture {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Images", &["png", "jpg", "jpeg", "bmp"])
                .pick_file()
            {
                self.texture_loader.load(path);
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if !pressed {
            return;
        }

        match key {
            KeyCode::KeyW => self.interaction.nudge_marker(-0.01, 0.0),
            KeyCode::KeyS => self.interaction.nudge_marker(0.01, 0.0),
            KeyCode::KeyA => self.interaction.nudge_marker(0.0, 0.01),
            KeyCode::KeyD => self.interaction.nudge_marker(0.0, -0.01),
            KeyCode::KeyR => self.trackball.reset(),
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window_attrs = Window::default_attributes()
            .with_title("Parametric Surface Viewer")
            .with_inner_size(PhysicalSize::new(1280, 900));

        let window = Arc::new(event_loop.create_window(window_attrs).unwrap());
        self.init_gpu(window, event_loop);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(egui_state) = &mut self.egui_state {
            if let Some(window) = &self.window {
                let response = egui_state.on_window_event(window, &event);
                if response.consumed {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.texture_loader.stop();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.handle_key(key, event.state == ElementState::Pressed);
                }
            }

            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.mouse_pressed = state == ElementState::Pressed;
                if !self.mouse_pressed {
                    self.last_cursor = None;
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                // The horizontal pointer position always drives the texture
                // rotation angle; a left-drag also orbits the view.
                let width = self
                    .window
                    .as_ref()
                    .map(|w| w.inner_size().width as f64)
                    .unwrap_or(1.0)
                    .max(1.0);
                self.interaction.texture_angle =
                    map_linear(position.x, 0.0, width, 0.0, PI) as f32;

                if self.mouse_pressed {
                    if let Some(last) = self.last_cursor {
                        let delta = Vec2::new(
                            (position.x - last.x) as f32,
                            (position.y - last.y) as f32,
                        );
                        self.trackball.drag(delta);
                    }
                    self.last_cursor = Some(position);
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    winit::event::MouseScrollDelta::LineDelta(_, y) => y,
                    winit::event::MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.ui_state.fov_deg = (self.ui_state.fov_deg - scroll * 2.5).clamp(5.0, 120.0);
            }

            WindowEvent::DroppedFile(path) => {
                self.texture_loader.load(path);
            }

            WindowEvent::RedrawRequested => {
                self.update();
                self.render();
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    env_logger::init();

    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app).unwrap();
}
