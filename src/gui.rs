use crate::controls::{Action, DAMPING_MAX, DAMPING_MIN, MAX_COUNT, REPULSE_MAX};
use egui::Context;
use egui_wgpu::Renderer;
use egui_winit::State;
use field_simulation::{FieldConfig, Preset, StepStats};
use wgpu::{Device, TextureFormat};
use winit::{event::WindowEvent, window::Window};

pub struct UiState {
    pub fps: f32,
    pub frame_time: f32,
    pub adapter: String,

    pub preset: Preset,
    pub particle_count: usize,
    pub capacity: usize,
    pub instance_count: u32,
    pub generation: u32,
    pub stats: StepStats,

    pub paused: bool,
    pub capture_enabled: bool,
    pub show_knot: bool,

    /// Editable copy of the running config
    pub draft: FieldConfig,
    /// Count slider; floored through `FieldConfig::coerce_count`
    pub count: f32,
    /// Buttons pressed this frame
    pub actions: Vec<Action>,
}

impl Default for UiState {
    fn default() -> Self {
        let draft = FieldConfig::default();
        Self {
            fps: 0.0,
            frame_time: 0.0,
            adapter: String::new(),
            preset: Preset::Starfield,
            particle_count: draft.count,
            capacity: 0,
            instance_count: 0,
            generation: 0,
            stats: StepStats::default(),
            paused: false,
            capture_enabled: false,
            show_knot: true,
            count: draft.count as f32,
            draft,
            actions: Vec::new(),
        }
    }
}

impl UiState {
    /// Reset the sliders to the running config
    pub fn sync(&mut self, config: &FieldConfig) {
        self.draft = config.clone();
        self.count = config.count as f32;
    }

    /// The slider values as a config, if they differ from `current`
    pub fn edited_config(&self, current: &FieldConfig) -> Option<FieldConfig> {
        let mut config = self.draft.clone();
        config.count = FieldConfig::coerce_count(self.count);
        (config != *current).then_some(config)
    }

    pub fn take_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }
}

pub struct Gui {
    context: Context,
    state: State,
    renderer: Renderer,
}

impl Gui {
    pub fn new(device: &Device, output_color_format: TextureFormat, window: &Window) -> Self {
        let context = Context::default();
        let id = context.viewport_id();

        let state = State::new(
            context.clone(),
            id,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(device.limits().max_texture_dimension_2d as usize),
        );

        let renderer = Renderer::new(
            device,
            output_color_format,
            egui_wgpu::RendererOptions::default(),
        );

        Self {
            context,
            state,
            renderer,
        }
    }

    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        response.consumed
    }

    /// Run the panels and record their draw into `encoder` on top of `view`.
    /// Returns command buffers that must be submitted before the encoder.
    pub fn render(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &Window,
        view: &wgpu::TextureView,
        ui_state: &mut UiState,
    ) -> Vec<wgpu::CommandBuffer> {
        let raw_input = self.state.take_egui_input(window);

        let full_output = self.context.run(raw_input, |ctx| {
            Self::ui(ctx, ui_state);
        });

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let clipped_primitives = self
            .context
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let size = window.inner_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(device, queue, *id, image_delta);
        }

        let command_buffers = self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer.render(
                &mut render_pass.forget_lifetime(),
                &clipped_primitives,
                &screen_descriptor,
            );
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }

        command_buffers
    }

    fn ui(ctx: &Context, state: &mut UiState) {
        // Diagnostics Panel (Top Left)
        egui::Window::new("Diagnostics")
            .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.label(format!("FPS: {:.1}", state.fps));
                ui.label(format!("Frame Time: {:.2} ms", state.frame_time));
                ui.label(format!("Adapter: {}", state.adapter));
            });

        // Statistics Panel (Top Right)
        egui::Window::new("Statistics")
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.heading("Particles");
                ui.label(format!("Total: {}", state.particle_count));
                ui.label(format!("Generation: {}", state.generation));
                ui.label(format!("Influenced: {}", state.stats.influenced));
                ui.label(format!("Captured: {}", state.stats.captured));
                ui.label(format!(
                    "Bounced / wrapped / respawned: {} / {} / {}",
                    state.stats.bounced, state.stats.wrapped, state.stats.respawned
                ));
                if state.stats.skipped > 0 {
                    ui.label(format!("Skipped terms: {}", state.stats.skipped));
                }
                ui.separator();
                ui.heading("Rendering");
                ui.label(format!(
                    "Instances: {} / {}",
                    state.instance_count, state.capacity
                ));
                ui.checkbox(&mut state.show_knot, "Show Knot");
            });

        // Field Controls (Bottom Left)
        egui::Window::new("Field Controls")
            .anchor(egui::Align2::LEFT_BOTTOM, [10.0, -10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                let mut preset = state.preset;
                egui::ComboBox::from_label("Preset")
                    .selected_text(preset.name())
                    .show_ui(ui, |ui| {
                        for option in Preset::ALL {
                            ui.selectable_value(&mut preset, option, option.name());
                        }
                    });
                if preset != state.preset {
                    state.actions.push(Action::Preset(preset));
                }

                ui.horizontal(|ui| {
                    let label = if state.paused { "Resume" } else { "Pause" };
                    if ui.button(label).clicked() {
                        state.actions.push(Action::TogglePause);
                    }
                    if ui.button("Step").clicked() {
                        state.actions.push(Action::Step);
                    }
                    if ui.button("Rebuild").clicked() {
                        state.actions.push(Action::Rebuild);
                    }
                    if ui.button("Reset Camera").clicked() {
                        state.actions.push(Action::ResetCamera);
                    }
                });

                let mut capture = state.capture_enabled;
                if ui.checkbox(&mut capture, "Capture").changed() {
                    state.actions.push(Action::ToggleCapture);
                }

                ui.separator();
                ui.heading("Population");
                ui.add(
                    egui::Slider::new(&mut state.count, 1.0..=MAX_COUNT as f32)
                        .text("Count")
                        .logarithmic(true)
                        .integer(),
                );

                let draft = &mut state.draft;
                ui.separator();
                ui.heading("Motion");
                ui.add(egui::Slider::new(&mut draft.damping, DAMPING_MIN..=DAMPING_MAX).text("Damping"));
                ui.add(egui::Slider::new(&mut draft.drift, 0.0..=0.2).text("Drift"));
                ui.add(egui::Slider::new(&mut draft.flow, -0.5..=0.5).text("Flow"));
                ui.add(
                    egui::Slider::new(&mut draft.max_dt, 0.005..=0.1)
                        .text("Max dt")
                        .logarithmic(true),
                );

                ui.separator();
                ui.heading("Pointer");
                ui.add(
                    egui::Slider::new(&mut draft.influence_radius, 0.0..=5.0)
                        .text("Influence Radius"),
                );
                ui.add(
                    egui::Slider::new(&mut draft.repulse_strength, 0.0..=REPULSE_MAX)
                        .text("Repulse Strength"),
                );

                ui.separator();
                ui.heading("Capture");
                ui.add(
                    egui::Slider::new(&mut draft.capture_radius, 0.0..=5.0)
                        .text("Capture Radius"),
                );
                ui.add(egui::Slider::new(&mut draft.capture_rate, 0.0..=5.0).text("Capture Rate"));
                ui.add(egui::Slider::new(&mut draft.release_rate, 0.0..=5.0).text("Release Rate"));
                ui.add(egui::Slider::new(&mut draft.orbit_pull, 0.0..=10.0).text("Orbit Pull"));
                ui.add(
                    egui::Slider::new(&mut draft.orbit_strength, 0.0..=1.0)
                        .text("Orbit Strength"),
                );

                ui.separator();
                ui.heading("Color");
                ui.add(
                    egui::Slider::new(&mut draft.color_smooth_rate, 0.0..=20.0)
                        .text("Smoothing Rate"),
                );
                ui.add(
                    egui::Slider::new(&mut draft.capture_boost, 0.0..=3.0).text("Capture Boost"),
                );
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untouched_sliders_change_nothing() {
        let config = Preset::Atom.config();
        let mut state = UiState::default();
        state.sync(&config);
        assert_eq!(state.edited_config(&config), None);
    }

    #[test]
    fn test_slider_edit_yields_config() {
        let config = Preset::Starfield.config();
        let mut state = UiState::default();
        state.sync(&config);
        state.draft.repulse_strength = 2.5;

        let edited = state.edited_config(&config).unwrap();
        assert_eq!(edited.repulse_strength, 2.5);
        assert!(!config.requires_rebuild(&edited));
    }

    #[test]
    fn test_count_slider_is_floored() {
        let config = Preset::Starfield.config();
        let mut state = UiState::default();
        state.sync(&config);

        state.count = 1234.9;
        let edited = state.edited_config(&config).unwrap();
        assert_eq!(edited.count, 1234);
        assert!(config.requires_rebuild(&edited));

        state.count = 0.3;
        assert_eq!(state.edited_config(&config).unwrap().count, 1);
    }

    #[test]
    fn test_take_actions_drains() {
        let mut state = UiState::default();
        state.actions.push(Action::Step);
        state.actions.push(Action::ToggleCapture);
        assert_eq!(state.take_actions(), vec![Action::Step, Action::ToggleCapture]);
        assert!(state.take_actions().is_empty());
    }
}
