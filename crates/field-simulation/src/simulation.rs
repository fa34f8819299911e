//! CPU particle field simulation
//!
//! One synchronous pass per step. Particles only interact with the pointer,
//! never with each other, so each one is read, advanced and written back
//! independently:
//!
//! 1. drift (+ flow toward the camera)
//! 2. pointer repulsion, smoothstep falloff on the distance within the pointer plane
//! 3. capture strength and orbit force (when capture mode is on)
//! 4. damping
//! 5. position += velocity
//! 6. boundary (bounce or wrap)
//! 7. color smoothing toward the mode's target color
//!
//! Input handlers only set the pointer NDC and the capture toggle; the
//! particle arrays are touched by `step` and `rebuild` alone.

use crate::camera::CameraView;
use crate::config::{BoundaryPolicy, ColorMode, DriftMode, FieldConfig};
use crate::initializer::initialize;
use crate::pointer::PointerMapper;
use crate::volume::{SpawnVolume, WrapOutcome};
use field_physics::{
    approach_capture, bounce_component, drift_noise, orbit_acceleration, pointer_repulsion,
    smooth_toward, OrbitParams, Particle, ParticleField,
};
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// How a configuration change was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    /// Picked up by the next step
    Live,
    /// Particle arrays were discarded and rebuilt
    Rebuilt,
}

/// Per-step counters, mostly for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Particles inside the pointer influence radius
    pub influenced: usize,
    /// Particles with non-zero capture strength
    pub captured: usize,
    /// Particles that received a bounce nudge
    pub bounced: usize,
    /// Particles wrapped laterally
    pub wrapped: usize,
    /// Particles re-sampled after leaving the depth range
    pub respawned: usize,
    /// Force terms dropped because they were not finite
    pub skipped: usize,
}

pub struct FieldSimulation {
    config: FieldConfig,
    field: ParticleField,
    rng: StdRng,

    pointer: PointerMapper,
    pointer_ndc: Option<Vec2>,
    capture_enabled: bool,

    elapsed: f32,
    steps: u64,
    generation: u32,
}

impl FieldSimulation {
    pub fn new(config: FieldConfig, camera: &CameraView, seed: u64) -> Self {
        let config = config.sanitized();
        let mut rng = StdRng::seed_from_u64(seed);
        let field = initialize(&config, camera, &mut rng);
        log::info!(
            "✓ Field initialized: {} particles, {:?} boundary, {:?} colors",
            field.len(),
            config.boundary,
            config.color_mode
        );

        Self {
            pointer: PointerMapper::new(config.pointer_plane),
            config,
            field,
            rng,
            pointer_ndc: None,
            capture_enabled: false,
            elapsed: 0.0,
            steps: 0,
            generation: 0,
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn particle_count(&self) -> usize {
        self.field.len()
    }

    /// Incremented on every rebuild, so buffer owners know to reallocate
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Simulated seconds since start
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Swap in a new configuration, rebuilding the arrays only when the
    /// population (count or distribution) changed
    pub fn set_config(&mut self, config: FieldConfig, camera: &CameraView) -> ConfigChange {
        let config = config.sanitized();
        let rebuild = self.config.requires_rebuild(&config);
        let recolor = self.config.base_color != config.base_color;

        self.pointer.set_plane(config.pointer_plane);
        self.config = config;

        if rebuild {
            self.rebuild(camera);
            ConfigChange::Rebuilt
        } else {
            if recolor {
                self.field.fill_base_color(self.config.base_color);
            }
            ConfigChange::Live
        }
    }

    /// Discard every particle and build a fresh set from the current config
    pub fn rebuild(&mut self, camera: &CameraView) {
        self.field = initialize(&self.config, camera, &mut self.rng);
        self.generation = self.generation.wrapping_add(1);
        log::info!(
            "Rebuilt field: {} particles (generation {})",
            self.field.len(),
            self.generation
        );
    }

    /// Pointer position in NDC, or `None` when the pointer left the viewport
    pub fn set_pointer(&mut self, ndc: Option<Vec2>) {
        self.pointer_ndc = ndc;
    }

    pub fn pointer_ndc(&self) -> Option<Vec2> {
        self.pointer_ndc
    }

    /// World point the pointer mapped to on the last step
    pub fn pointer_world(&self) -> Option<Vec3> {
        self.pointer_ndc.map(|_| self.pointer.last_point())
    }

    pub fn capture_enabled(&self) -> bool {
        self.capture_enabled
    }

    pub fn set_capture_enabled(&mut self, enabled: bool) {
        self.capture_enabled = enabled;
    }

    pub fn toggle_capture(&mut self) -> bool {
        self.capture_enabled = !self.capture_enabled;
        self.capture_enabled
    }

    /// Advance every particle by `dt` seconds (clamped to `[0, max_dt]`)
    pub fn step(&mut self, dt: f32, camera: &CameraView) -> StepStats {
        let mut stats = StepStats::default();
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.max_dt)
        } else {
            0.0
        };
        self.elapsed += dt;
        self.steps += 1;

        let pointer = self.pointer_ndc.map(|ndc| self.pointer.map(ndc, camera));
        let plane_normal = self.pointer.plane_normal(camera);

        let config = &self.config;
        let volume = SpawnVolume::from_config(config);
        let orbit = OrbitParams {
            pull: config.orbit_pull,
            strength: config.orbit_strength,
        };
        let flow = -camera.forward * config.flow;

        for i in 0..self.field.len() {
            let mut p = self.field.get(i);

            // 1. Drift
            let noise = match config.drift_mode {
                DriftMode::Random => Vec3::new(
                    self.rng.random::<f32>() * 2.0 - 1.0,
                    self.rng.random::<f32>() * 2.0 - 1.0,
                    self.rng.random::<f32>() * 2.0 - 1.0,
                ),
                DriftMode::Noise => drift_noise(i as u32, self.elapsed),
            };
            let mut accel = noise * config.drift + flow;

            // 2. + 3. Pointer repulsion and capture/orbit
            let mut weight = 0.0;
            match pointer {
                Some(center) => {
                    let influence = pointer_repulsion(
                        p.position,
                        center,
                        plane_normal,
                        config.influence_radius,
                        config.repulse_strength,
                    );
                    if influence.weight > 0.0 {
                        stats.influenced += 1;
                    }
                    weight = influence.weight;

                    let inside = self.capture_enabled && influence.distance < config.capture_radius;
                    p.capture = approach_capture(
                        p.capture,
                        inside,
                        config.capture_rate,
                        config.release_rate,
                        dt,
                    );

                    // Captured particles stop being pushed away from what they orbit
                    accel += influence.acceleration * (1.0 - p.capture);
                    accel += orbit_acceleration(
                        p.position,
                        center,
                        camera.forward,
                        p.orbit_radius,
                        p.orbit_phase,
                        p.capture,
                        orbit,
                    );
                }
                None => {
                    p.capture = approach_capture(
                        p.capture,
                        false,
                        config.capture_rate,
                        config.release_rate,
                        dt,
                    );
                }
            }
            if p.capture > 0.0 {
                stats.captured += 1;
            }

            let velocity = p.velocity + accel * dt;
            if velocity.is_finite() {
                p.velocity = velocity;
            } else {
                stats.skipped += 1;
            }

            // 4. Damping
            p.velocity *= config.damping;

            // 5. Semi-implicit Euler: velocity is already per tick
            let position = p.position + p.velocity;
            if position.is_finite() {
                p.position = position;
            } else {
                p.velocity = Vec3::ZERO;
                stats.skipped += 1;
            }

            // 6. Boundary
            match config.boundary {
                BoundaryPolicy::Bounce { nudge } => {
                    let before = p.velocity;
                    p.velocity = Vec3::new(
                        bounce_component(p.position.x, p.velocity.x, config.spread.x, nudge),
                        bounce_component(p.position.y, p.velocity.y, config.spread.y, nudge),
                        bounce_component(p.position.z, p.velocity.z, config.spread.z, nudge),
                    );
                    if p.velocity != before {
                        stats.bounced += 1;
                    }
                }
                BoundaryPolicy::Wrap => match volume.wrap(camera, p.position, &mut self.rng) {
                    WrapOutcome::Inside => {}
                    WrapOutcome::Wrapped(position) => {
                        p.position = position;
                        stats.wrapped += 1;
                    }
                    WrapOutcome::Respawned(position) => {
                        p.position = position;
                        stats.respawned += 1;
                    }
                },
            }

            // 7. Color
            let target = target_color(config, &p, weight);
            p.color = smooth_toward(p.color, target, config.color_smooth_rate, dt);

            self.field.set(i, &p);
        }

        stats
    }
}

/// Color a particle is smoothed toward this step
pub fn target_color(config: &FieldConfig, particle: &Particle, pointer_weight: f32) -> Vec3 {
    match config.color_mode {
        ColorMode::Static => particle.base_color,
        ColorMode::PointerReactive => particle
            .base_color
            .lerp(config.highlight_color, pointer_weight),
        ColorMode::CaptureBoosted => {
            let boost = 1.0 + (config.capture_boost - 1.0) * particle.capture;
            (particle.base_color * boost).lerp(config.highlight_color, pointer_weight)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Preset, SpawnDistribution};

    fn quiet(config: FieldConfig) -> FieldConfig {
        FieldConfig {
            drift: 0.0,
            flow: 0.0,
            ..config
        }
    }

    #[test]
    fn test_arrays_stay_aligned_over_many_steps() {
        let cam = CameraView::default();
        for preset in Preset::ALL {
            let config = FieldConfig {
                count: 200,
                ..preset.config()
            };
            let mut sim = FieldSimulation::new(config, &cam, 1);
            sim.set_pointer(Some(Vec2::new(0.1, -0.2)));
            sim.set_capture_enabled(true);
            for _ in 0..120 {
                sim.step(0.016, &cam);
            }
            let field = sim.field();
            assert_eq!(field.len(), 200);
            assert_eq!(field.positions().len(), 200 * 3);
            assert_eq!(field.velocities().len(), 200 * 3);
            assert_eq!(field.colors().len(), 200 * 3);
            assert!(field.positions().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_damping_alone_decays_speed() {
        let cam = CameraView::default();
        let config = quiet(FieldConfig {
            count: 1,
            spread: Vec3::splat(1000.0),
            ..FieldConfig::default()
        });
        let mut sim = FieldSimulation::new(config, &cam, 2);
        let mut p = sim.field.get(0);
        p.velocity = Vec3::new(0.3, -0.2, 0.1);
        sim.field.set(0, &p);

        let mut last = sim.field.velocity(0).length();
        for _ in 0..200 {
            sim.step(0.016, &cam);
            let speed = sim.field.velocity(0).length();
            assert!(speed < last);
            last = speed;
        }
        assert!(last < 1e-3);
    }

    #[test]
    fn test_bounce_reduces_outward_velocity() {
        let cam = CameraView::default();
        let config = quiet(FieldConfig {
            count: 1,
            spread: Vec3::splat(5.0),
            boundary: BoundaryPolicy::Bounce { nudge: 0.01 },
            ..FieldConfig::default()
        });
        let mut sim = FieldSimulation::new(config, &cam, 3);
        let mut p = sim.field.get(0);
        p.position = Vec3::new(5.0 + 1e-3, 0.0, 0.0);
        p.velocity = Vec3::new(0.05, 0.0, 0.0);
        sim.field.set(0, &p);

        let stats = sim.step(0.016, &cam);
        assert_eq!(stats.bounced, 1);
        assert!(sim.field.velocity(0).x < 0.05);
    }

    #[test]
    fn test_bounce_keeps_particles_bounded() {
        let cam = CameraView::default();
        let config = FieldConfig {
            count: 64,
            spread: Vec3::splat(2.0),
            drift: 0.5,
            drift_mode: DriftMode::Random,
            ..FieldConfig::default()
        };
        let mut sim = FieldSimulation::new(config, &cam, 4);
        for _ in 0..5000 {
            sim.step(0.016, &cam);
        }
        for i in 0..sim.particle_count() {
            assert!(sim.field.position(i).abs().max_element() < 4.0);
        }
    }

    #[test]
    fn test_wrap_keeps_particles_in_view() {
        let cam = CameraView::default();
        let config = FieldConfig {
            count: 300,
            ..Preset::Tunnel.config()
        };
        let mut sim = FieldSimulation::new(config, &cam, 5);
        let mut respawned = 0;
        for _ in 0..600 {
            respawned += sim.step(0.016, &cam).respawned;
        }
        assert!(respawned > 0);

        let near = sim.config().depth_near;
        let far = sim.config().depth_far;
        for i in 0..sim.particle_count() {
            let local = cam.to_local(sim.field.position(i));
            assert!(local.z >= near - 1e-3 && local.z <= far + 1e-3);
            let half = cam.half_extents_at(local.z);
            assert!(local.x.abs() <= half.x + 1e-3);
            assert!(local.y.abs() <= half.y + 1e-3);
        }
    }

    #[test]
    fn test_capture_grows_and_releases_within_bounds() {
        let cam = CameraView::default();
        let config = quiet(FieldConfig {
            count: 50,
            spread: Vec3::splat(0.5),
            ..Preset::Atom.config()
        });
        let mut sim = FieldSimulation::new(config, &cam, 6);
        sim.set_pointer(Some(Vec2::ZERO));
        sim.set_capture_enabled(true);

        for _ in 0..120 {
            sim.step(0.016, &cam);
            assert!(sim.field.capture().iter().all(|c| (0.0..=1.0).contains(c)));
        }
        assert!(sim.field.capture().iter().any(|c| *c > 0.5));

        sim.set_capture_enabled(false);
        for _ in 0..600 {
            sim.step(0.016, &cam);
            assert!(sim.field.capture().iter().all(|c| (0.0..=1.0).contains(c)));
        }
        assert!(sim.field.capture().iter().all(|c| *c == 0.0));
    }

    #[test]
    fn test_captured_particles_orbit_the_pointer() {
        let cam = CameraView::default();
        let config = quiet(FieldConfig {
            count: 40,
            spread: Vec3::splat(0.6),
            distribution: SpawnDistribution::UniformBox,
            boundary: BoundaryPolicy::Wrap,
            ..Preset::Atom.config()
        });
        let mut sim = FieldSimulation::new(config, &cam, 12);
        sim.set_pointer(Some(Vec2::ZERO));
        sim.set_capture_enabled(true);

        for _ in 0..3000 {
            sim.step(1.0 / 60.0, &cam);
        }

        let center = sim.pointer_world().unwrap();
        for i in 0..sim.particle_count() {
            let p = sim.field.get(i);
            let offset = p.position - center;
            let radius = offset.length();
            let radial = offset / radius;
            let tangential = p.velocity - radial * p.velocity.dot(radial);

            assert_eq!(p.capture, 1.0, "particle {i}");
            assert!(
                radius > 0.75 * p.orbit_radius && radius < 1.4 * p.orbit_radius,
                "particle {i}: radius {radius} for target {}",
                p.orbit_radius
            );
            assert!(
                tangential.length() > 0.02 * p.orbit_radius,
                "particle {i} stalled (phase {})",
                p.orbit_phase
            );
        }
    }

    #[test]
    fn test_capture_decays_when_pointer_leaves() {
        let cam = CameraView::default();
        let config = quiet(FieldConfig {
            count: 10,
            spread: Vec3::splat(0.3),
            ..Preset::Atom.config()
        });
        let mut sim = FieldSimulation::new(config, &cam, 7);
        sim.set_pointer(Some(Vec2::ZERO));
        sim.set_capture_enabled(true);
        for _ in 0..60 {
            sim.step(0.016, &cam);
        }
        sim.set_pointer(None);
        assert_eq!(sim.pointer_world(), None);
        for _ in 0..600 {
            sim.step(0.016, &cam);
        }
        assert!(sim.field.capture().iter().all(|c| *c == 0.0));
    }

    #[test]
    fn test_color_converges_to_highlight_near_pointer() {
        let cam = CameraView::default();
        let config = quiet(FieldConfig {
            count: 1,
            color_mode: ColorMode::PointerReactive,
            repulse_strength: 0.0,
            ..FieldConfig::default()
        });
        let mut sim = FieldSimulation::new(config, &cam, 8);
        let mut p = sim.field.get(0);
        p.position = Vec3::ZERO;
        sim.field.set(0, &p);
        sim.set_pointer(Some(Vec2::ZERO));

        for _ in 0..300 {
            sim.step(0.016, &cam);
        }
        let highlight = sim.config().highlight_color;
        assert!((sim.field.color(0) - highlight).length() < 1e-3);
    }

    #[test]
    fn test_static_color_is_steady() {
        let cam = CameraView::default();
        let mut sim = FieldSimulation::new(FieldConfig::default(), &cam, 9);
        let before = sim.field.colors().to_vec();
        sim.set_pointer(Some(Vec2::ZERO));
        sim.step(0.016, &cam);
        for (a, b) in before.iter().zip(sim.field.colors()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_capture_boost_brightens() {
        let config = FieldConfig {
            color_mode: ColorMode::CaptureBoosted,
            capture_boost: 2.0,
            ..FieldConfig::default()
        };
        let mut p = Particle::at_rest(Vec3::ZERO, Vec3::splat(0.25));
        assert_eq!(target_color(&config, &p, 0.0), Vec3::splat(0.25));
        p.capture = 1.0;
        assert_eq!(target_color(&config, &p, 0.0), Vec3::splat(0.5));
    }

    #[test]
    fn test_live_change_keeps_particles() {
        let cam = CameraView::default();
        let mut sim = FieldSimulation::new(FieldConfig::default(), &cam, 10);
        let before = sim.field.positions().to_vec();

        let change = sim.set_config(
            FieldConfig {
                damping: 0.5,
                repulse_strength: 2.0,
                ..sim.config().clone()
            },
            &cam,
        );
        assert_eq!(change, ConfigChange::Live);
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.field.positions(), &before[..]);
    }

    #[test]
    fn test_count_change_rebuilds() {
        let cam = CameraView::default();
        let mut sim = FieldSimulation::new(FieldConfig::default(), &cam, 11);

        let change = sim.set_config(
            FieldConfig {
                count: 123,
                ..sim.config().clone()
            },
            &cam,
        );
        assert_eq!(change, ConfigChange::Rebuilt);
        assert_eq!(sim.generation(), 1);
        assert_eq!(sim.particle_count(), 123);
        assert!(sim.field().is_aligned());

        let change = sim.set_config(
            FieldConfig {
                distribution: SpawnDistribution::Cluster { sigma: 0.2 },
                ..sim.config().clone()
            },
            &cam,
        );
        assert_eq!(change, ConfigChange::Rebuilt);
        assert_eq!(sim.generation(), 2);
    }

    #[test]
    fn test_non_finite_dt_is_ignored() {
        let cam = CameraView::default();
        let mut sim = FieldSimulation::new(FieldConfig::default(), &cam, 12);
        sim.step(f32::NAN, &cam);
        sim.step(f32::INFINITY, &cam);
        assert!(sim.field.positions().iter().all(|v| v.is_finite()));
        assert!(sim.elapsed() <= sim.config().max_dt);
    }

    #[test]
    fn test_toggle_capture() {
        let cam = CameraView::default();
        let mut sim = FieldSimulation::new(FieldConfig::default(), &cam, 13);
        assert!(!sim.capture_enabled());
        assert!(sim.toggle_capture());
        assert!(!sim.toggle_capture());
    }
}
