//! Interactive Particle Field
//!
//! A cloud of drifting points that scatter away from the cursor, or get
//! captured into orbits around it.

mod controls;
mod gui;
mod palette;

use controls::Action;
use field_renderer::{begin_scene_pass, Camera, GpuContext, KnotRenderer, PointCloudRenderer};
use field_simulation::{ConfigChange, FieldConfig, FieldSimulation, FrameLoop, Preset};
use glam::Vec2;
use gui::{Gui, UiState};
use std::collections::VecDeque;
use std::error::Error;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

const FRAME_WINDOW: usize = 60;
const POINT_SIZE: f32 = 0.045;

struct GpuState {
    window: Arc<Window>,
    context: GpuContext,
    renderer: PointCloudRenderer,
    knot: KnotRenderer,
    camera: Camera,
    simulation: FieldSimulation,
    frame_loop: FrameLoop,

    // GUI
    gui: Gui,
    ui_state: UiState,

    // Frame timing
    last_frame_time: Instant,
    frame_times: VecDeque<f32>,
    last_stats_log: Instant,
}

impl GpuState {
    async fn new(window: Arc<Window>) -> Result<Self, Box<dyn Error>> {
        let size = window.inner_size();
        let context = GpuContext::new(window.clone()).await?;

        let preset = Preset::Starfield;
        let config = palette::themed(preset);
        let mut camera = Camera::new(size.width, size.height);
        camera.fovy = config.fov_y;

        let seed: u64 = rand::random();
        let simulation = FieldSimulation::new(config, &camera.view(), seed);
        log::info!(
            "✓ Simulation initialized: {} particles (seed {})",
            simulation.particle_count(),
            seed
        );

        let mut renderer =
            PointCloudRenderer::new(&context.device, &context.config, simulation.particle_count());
        renderer.set_point_size(POINT_SIZE);
        renderer.set_clear_color(palette::clear_color(preset));
        let knot = KnotRenderer::new(&context.device, context.format());
        log::info!("✓ Renderer initialized");

        let gui = Gui::new(&context.device, context.format(), &window);
        let mut ui_state = UiState {
            adapter: context.adapter_name().to_string(),
            preset,
            show_knot: shows_knot(preset),
            ..UiState::default()
        };
        ui_state.sync(simulation.config());
        log::info!("✓ GUI initialized");

        let mut frame_loop = FrameLoop::new();
        frame_loop.start();

        let now = Instant::now();
        Ok(Self {
            window,
            context,
            renderer,
            knot,
            camera,
            simulation,
            frame_loop,
            gui,
            ui_state,
            last_frame_time: now,
            frame_times: VecDeque::with_capacity(FRAME_WINDOW),
            last_stats_log: now,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if self.context.resize(new_size.width, new_size.height) {
            self.camera.resize(new_size.width, new_size.height);
            self.renderer
                .resize(&self.context.device, new_size.width, new_size.height);
        }
    }

    fn set_pointer(&mut self, position: winit::dpi::PhysicalPosition<f64>) {
        let w = self.context.config.width.max(1) as f64;
        let h = self.context.config.height.max(1) as f64;
        let ndc = Vec2::new(
            (position.x / w * 2.0 - 1.0) as f32,
            (1.0 - position.y / h * 2.0) as f32,
        );
        self.simulation.set_pointer(Some(ndc));
    }

    fn select_preset(&mut self, preset: Preset) {
        self.ui_state.preset = preset;
        self.ui_state.show_knot = shows_knot(preset);
        let config = palette::themed(preset);
        self.camera.fovy = config.fov_y;
        self.simulation.set_config(config, &self.camera.view());
        self.renderer.set_clear_color(palette::clear_color(preset));
        log::info!(
            "Preset: {} ({} particles)",
            preset.name(),
            self.simulation.particle_count()
        );
    }

    fn apply_config(&mut self, config: FieldConfig) {
        let (count, repulse, damping) = (config.count, config.repulse_strength, config.damping);
        match self.simulation.set_config(config, &self.camera.view()) {
            ConfigChange::Rebuilt => log::info!("Rebuilt with {} particles", count),
            ConfigChange::Live => log::debug!("repulse {:.2}, damping {:.3}", repulse, damping),
        }
    }

    /// Returns false when the app should quit
    fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Preset(preset) => self.select_preset(preset),
            Action::TogglePause => {
                self.frame_loop.toggle_pause();
                log::info!("{}", if self.frame_loop.is_paused() { "Paused" } else { "Resumed" });
            }
            Action::ToggleCapture => {
                let enabled = self.simulation.toggle_capture();
                log::info!("Capture {}", if enabled { "on" } else { "off" });
            }
            Action::ToggleKnot => self.ui_state.show_knot = !self.ui_state.show_knot,
            Action::Step => self.frame_loop.request_step(),
            Action::Rebuild => {
                self.simulation.rebuild(&self.camera.view());
                log::info!("Rebuilt {} particles", self.simulation.particle_count());
            }
            Action::ResetCamera => self.camera.reset(),
            Action::Quit => {
                self.frame_loop.stop();
                return false;
            }
            tuning => {
                if let Some(config) = controls::apply(tuning, self.simulation.config()) {
                    self.apply_config(config);
                }
            }
        }
        true
    }

    /// Button presses and slider edits from the last GUI frame.
    /// Returns false when the app should quit.
    fn apply_ui(&mut self) -> bool {
        let mut keep_running = true;
        for action in self.ui_state.take_actions() {
            keep_running &= self.handle_action(action);
        }
        if let Some(config) = self.ui_state.edited_config(self.simulation.config()) {
            self.apply_config(config);
        }
        keep_running
    }

    /// Advance and draw one frame. Returns average FPS and frame time in ms.
    fn render(&mut self) -> Result<(f32, f32), wgpu::SurfaceError> {
        let now = Instant::now();
        let frame_dt = (now - self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        if self.frame_times.len() == FRAME_WINDOW {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_dt);
        let avg_frame_time =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32;
        let fps = if avg_frame_time > 0.0 {
            1.0 / avg_frame_time
        } else {
            0.0
        };

        if let Some(dt) = self.frame_loop.tick(frame_dt) {
            let stats = self.simulation.step(dt, &self.camera.view());
            self.ui_state.stats = stats;

            if now.duration_since(self.last_stats_log).as_secs_f32() >= 1.0 {
                self.last_stats_log = now;
                log::debug!(
                    "{:.0} FPS | {} particles | influenced {} captured {} bounced {} wrapped {} respawned {} skipped {} | max speed {:.3}",
                    fps,
                    self.simulation.particle_count(),
                    stats.influenced,
                    stats.captured,
                    stats.bounced,
                    stats.wrapped,
                    stats.respawned,
                    stats.skipped,
                    self.simulation.field().max_speed(),
                );
            }
        }

        self.renderer.upload(
            &self.context.device,
            &self.context.queue,
            self.simulation.field(),
        );

        // Update UI state
        self.ui_state.fps = fps;
        self.ui_state.frame_time = avg_frame_time * 1000.0;
        self.ui_state.particle_count = self.simulation.particle_count();
        self.ui_state.generation = self.simulation.generation();
        self.ui_state.capacity = self.renderer.capacity();
        self.ui_state.instance_count = self.renderer.instance_count();
        self.ui_state.paused = self.frame_loop.is_paused();
        self.ui_state.capture_enabled = self.simulation.capture_enabled();
        self.ui_state.sync(self.simulation.config());

        // Render
        let output = self.context.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let time = self.simulation.elapsed();
        self.renderer
            .prepare(&self.context.queue, &self.camera, time);
        if self.ui_state.show_knot {
            self.knot.prepare(&self.context.queue, &self.camera, time);
        }

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });

        {
            let mut render_pass = begin_scene_pass(
                &mut encoder,
                &view,
                &self.renderer.depth_texture,
                self.renderer.clear_color,
            );
            if self.ui_state.show_knot {
                self.knot.draw(&mut render_pass);
            }
            self.renderer.draw(&mut render_pass);
        }

        // Render GUI
        let gui_buffers = self.gui.render(
            &self.context.device,
            &self.context.queue,
            &mut encoder,
            &self.window,
            &view,
            &mut self.ui_state,
        );

        self.context
            .queue
            .submit(gui_buffers.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        Ok((fps, avg_frame_time * 1000.0))
    }

    fn title(&self, fps: f32, frame_time_ms: f32) -> String {
        let mut title = format!(
            "Particle Field - {} - {:.0} FPS ({:.2}ms) - {} particles",
            self.ui_state.preset.name(),
            fps,
            frame_time_ms,
            self.simulation.particle_count()
        );
        if self.simulation.capture_enabled() {
            title.push_str(" - capture");
        }
        if self.frame_loop.is_paused() {
            title.push_str(" - paused");
        }
        title
    }
}

/// The knot is the starfield's centerpiece
fn shows_knot(preset: Preset) -> bool {
    preset == Preset::Starfield
}

#[derive(Default)]
struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    error: Option<Box<dyn Error>>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("Particle Field")
            .with_inner_size(winit::dpi::LogicalSize::new(1600, 900));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                self.error = Some(e.into());
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(GpuState::new(window.clone())) {
            Ok(gpu_state) => {
                self.window = Some(window);
                self.gpu_state = Some(gpu_state);
            }
            Err(e) => {
                log::error!("GPU setup failed: {}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu_state) = &mut self.gpu_state else {
            return;
        };

        // Handle GUI events
        if gpu_state.gui.handle_event(&gpu_state.window, &event) {
            gpu_state.window.request_redraw();
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(physical_size) => gpu_state.resize(physical_size),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if let Some(action) = controls::action_for(key_code) {
                    if !gpu_state.handle_action(action) {
                        event_loop.exit();
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Right {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }

                if button == MouseButton::Left && state == ElementState::Pressed {
                    gpu_state.handle_action(Action::ToggleCapture);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                gpu_state.set_pointer(position);

                if self.mouse_pressed {
                    if let Some(last_pos) = self.last_mouse_pos {
                        let delta_x = (position.x - last_pos.0) as f32;
                        let delta_y = (position.y - last_pos.1) as f32;
                        gpu_state.camera.rotate(-delta_x * 0.005, delta_y * 0.005);
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }

            WindowEvent::CursorLeft { .. } => gpu_state.simulation.set_pointer(None),

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_x, y) => y * 10.0,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                let distance = gpu_state.camera.distance;
                gpu_state.camera.zoom(-scroll * distance / 100.0);
            }

            WindowEvent::RedrawRequested => match gpu_state.render() {
                Ok((fps, frame_time)) => {
                    gpu_state.window.set_title(&gpu_state.title(fps, frame_time));
                    if !gpu_state.apply_ui() {
                        event_loop.exit();
                    }
                }
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    gpu_state.context.reconfigure()
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Surface out of memory");
                    event_loop.exit();
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            },

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger (RUST_LOG=debug for per-second statistics)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting particle field...");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::default();
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
