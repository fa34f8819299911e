//! Simulation parameters for runtime tuning
//!
//! Every field may change while the simulation runs. `count` and
//! `distribution` only take effect through a full rebuild of the particle
//! arrays; everything else applies on the next step.

use crate::pointer::PointerPlane;
use field_physics::constants::*;
use glam::Vec3;

/// Where particles are placed when the arrays are (re)built
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnDistribution {
    /// Uniform in `[-spread, spread]` on each axis
    UniformBox,
    /// Normal around the origin, standard deviation `spread * sigma` per axis
    Cluster { sigma: f32 },
    /// Uniform inside the camera frustum between `depth_near` and `depth_far`
    Frustum,
}

/// What happens when a particle leaves its volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryPolicy {
    /// Decrement the outward velocity component by `nudge` every tick it is outside `spread`
    Bounce { nudge: f32 },
    /// Wrap across the visible frustum at the particle's depth
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Static,
    /// Blend toward the highlight color near the pointer
    PointerReactive,
    /// Pointer-reactive, and brightened by capture strength
    CaptureBoosted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftMode {
    /// Fresh random acceleration every tick
    Random,
    /// Smooth deterministic noise of (index, time)
    Noise,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    // Population
    pub count: usize,
    pub spread: Vec3,
    pub distribution: SpawnDistribution,

    // Motion
    pub damping: f32,
    pub drift: f32,
    pub drift_mode: DriftMode,
    /// Acceleration toward the camera (along -forward), used by scrolling variants
    pub flow: f32,
    pub max_dt: f32,
    pub boundary: BoundaryPolicy,

    // Pointer
    pub pointer_plane: PointerPlane,
    pub influence_radius: f32,
    pub repulse_strength: f32,

    // Capture / orbit
    pub capture_radius: f32,
    pub capture_rate: f32,
    pub release_rate: f32,
    pub orbit_pull: f32,
    pub orbit_strength: f32,
    pub orbit_radius_range: [f32; 2],

    // Color
    pub color_mode: ColorMode,
    pub base_color: Vec3,
    pub highlight_color: Vec3,
    pub capture_boost: f32,
    pub color_smooth_rate: f32,

    // Camera
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub depth_near: f32,
    pub depth_far: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Preset::Starfield.config()
    }
}

impl FieldConfig {
    /// Floor a slider value to a particle count of at least one
    pub fn coerce_count(value: f32) -> usize {
        if value.is_nan() || value < 1.0 {
            1
        } else {
            value.floor() as usize
        }
    }

    /// True when switching from `self` to `other` needs new particle arrays
    pub fn requires_rebuild(&self, other: &FieldConfig) -> bool {
        self.count != other.count || self.distribution != other.distribution
    }

    /// Clamp every parameter into a range the integrator can use
    pub fn sanitized(mut self) -> Self {
        self.count = self.count.max(1);
        self.spread = self.spread.abs();
        if let SpawnDistribution::Cluster { sigma } = &mut self.distribution {
            *sigma = finite_or(*sigma, 1.0).abs();
        }

        self.damping = finite_or(self.damping, DAMPING).clamp(0.0, 0.9999);
        self.drift = finite_or(self.drift, 0.0).max(0.0);
        self.flow = finite_or(self.flow, 0.0);
        self.max_dt = finite_or(self.max_dt, MAX_DT).max(1.0e-4);
        if let BoundaryPolicy::Bounce { nudge } = &mut self.boundary {
            *nudge = finite_or(*nudge, BOUNCE_NUDGE).max(0.0);
        }

        self.influence_radius = finite_or(self.influence_radius, 0.0).max(0.0);
        self.repulse_strength = finite_or(self.repulse_strength, 0.0);
        self.capture_radius = finite_or(self.capture_radius, 0.0).max(0.0);
        self.capture_rate = finite_or(self.capture_rate, 0.0).max(0.0);
        self.release_rate = finite_or(self.release_rate, 0.0).max(0.0);
        self.orbit_pull = finite_or(self.orbit_pull, 0.0).max(0.0);
        self.orbit_strength = finite_or(self.orbit_strength, 0.0);
        let [a, b] = self.orbit_radius_range;
        let (a, b) = (finite_or(a, 0.0).max(0.0), finite_or(b, 0.0).max(0.0));
        self.orbit_radius_range = [a.min(b), a.max(b)];

        self.capture_boost = finite_or(self.capture_boost, 1.0).max(0.0);
        self.color_smooth_rate = finite_or(self.color_smooth_rate, 0.0).max(0.0);

        self.fov_y = finite_or(self.fov_y, 45f32.to_radians()).clamp(0.01, 3.1);
        self.depth_near = finite_or(self.depth_near, 1.0).max(1.0e-3);
        self.depth_far = finite_or(self.depth_far, self.depth_near).max(self.depth_near);
        self
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// The recognised variants of the demo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Static star box around the scene
    Starfield,
    /// Uniform cloud that scatters away from the pointer
    DriftCloud,
    /// Gaussian cluster near the center
    Cluster,
    /// Camera-relative field that scrolls toward the viewer and wraps
    Tunnel,
    /// Cluster with the capture/orbit mode tuned in
    Atom,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Starfield,
        Preset::DriftCloud,
        Preset::Cluster,
        Preset::Tunnel,
        Preset::Atom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Starfield => "starfield",
            Preset::DriftCloud => "drift cloud",
            Preset::Cluster => "cluster",
            Preset::Tunnel => "tunnel",
            Preset::Atom => "atom",
        }
    }

    pub fn next(self) -> Preset {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn config(self) -> FieldConfig {
        let base = FieldConfig {
            count: 900,
            spread: Vec3::new(9.0, 5.0, 9.0),
            distribution: SpawnDistribution::UniformBox,

            damping: DAMPING,
            drift: DRIFT,
            drift_mode: DriftMode::Noise,
            flow: 0.0,
            max_dt: MAX_DT,
            boundary: BoundaryPolicy::Bounce {
                nudge: BOUNCE_NUDGE,
            },

            pointer_plane: PointerPlane::CameraFacing { depth: 6.0 },
            influence_radius: INFLUENCE_RADIUS,
            repulse_strength: REPULSE_STRENGTH,

            capture_radius: CAPTURE_RADIUS,
            capture_rate: CAPTURE_RATE,
            release_rate: RELEASE_RATE,
            orbit_pull: ORBIT_PULL,
            orbit_strength: ORBIT_STRENGTH,
            orbit_radius_range: [ORBIT_RADIUS_MIN, ORBIT_RADIUS_MAX],

            color_mode: ColorMode::Static,
            base_color: Vec3::new(0.85, 0.88, 0.95),
            highlight_color: Vec3::new(1.0, 0.62, 0.35),
            capture_boost: CAPTURE_BOOST,
            color_smooth_rate: COLOR_SMOOTH_RATE,

            fov_y: 45f32.to_radians(),
            depth_near: 2.0,
            depth_far: 14.0,
        };

        match self {
            Preset::Starfield => FieldConfig {
                drift: DRIFT * 0.25,
                ..base
            },
            Preset::DriftCloud => FieldConfig {
                count: 4000,
                spread: Vec3::new(4.0, 2.5, 4.0),
                color_mode: ColorMode::PointerReactive,
                base_color: Vec3::new(0.45, 0.75, 0.95),
                ..base
            },
            Preset::Cluster => FieldConfig {
                count: 6000,
                spread: Vec3::new(3.0, 2.0, 3.0),
                distribution: SpawnDistribution::Cluster { sigma: 0.35 },
                drift_mode: DriftMode::Random,
                color_mode: ColorMode::PointerReactive,
                base_color: Vec3::new(0.7, 0.55, 0.95),
                ..base
            },
            Preset::Tunnel => FieldConfig {
                count: 5000,
                distribution: SpawnDistribution::Frustum,
                boundary: BoundaryPolicy::Wrap,
                flow: 0.25,
                color_mode: ColorMode::PointerReactive,
                base_color: Vec3::new(0.6, 0.85, 0.8),
                ..base
            },
            Preset::Atom => FieldConfig {
                count: 3000,
                spread: Vec3::new(3.0, 2.0, 3.0),
                distribution: SpawnDistribution::Cluster { sigma: 0.5 },
                influence_radius: 1.0,
                repulse_strength: REPULSE_STRENGTH * 0.5,
                color_mode: ColorMode::CaptureBoosted,
                base_color: Vec3::new(0.35, 0.55, 0.9),
                ..base
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_count() {
        assert_eq!(FieldConfig::coerce_count(0.0), 1);
        assert_eq!(FieldConfig::coerce_count(-5.0), 1);
        assert_eq!(FieldConfig::coerce_count(f32::NAN), 1);
        assert_eq!(FieldConfig::coerce_count(0.7), 1);
        assert_eq!(FieldConfig::coerce_count(1500.9), 1500);
    }

    #[test]
    fn test_requires_rebuild_only_for_population_changes() {
        let a = FieldConfig::default();

        let live = FieldConfig {
            damping: 0.5,
            repulse_strength: 3.0,
            color_mode: ColorMode::CaptureBoosted,
            ..a.clone()
        };
        assert!(!a.requires_rebuild(&live));

        let recount = FieldConfig {
            count: a.count + 1,
            ..a.clone()
        };
        assert!(a.requires_rebuild(&recount));

        let redistribute = FieldConfig {
            distribution: SpawnDistribution::Frustum,
            ..a.clone()
        };
        assert!(a.requires_rebuild(&redistribute));
    }

    #[test]
    fn test_sanitized_clamps_ranges() {
        let config = FieldConfig {
            count: 0,
            damping: 1.5,
            max_dt: f32::NAN,
            influence_radius: -1.0,
            orbit_radius_range: [2.0, 0.5],
            depth_near: 5.0,
            depth_far: 1.0,
            ..FieldConfig::default()
        }
        .sanitized();

        assert_eq!(config.count, 1);
        assert!(config.damping < 1.0);
        assert_eq!(config.max_dt, MAX_DT);
        assert_eq!(config.influence_radius, 0.0);
        assert_eq!(config.orbit_radius_range, [0.5, 2.0]);
        assert!(config.depth_far >= config.depth_near);
    }

    #[test]
    fn test_presets_are_already_sane() {
        for preset in Preset::ALL {
            let config = preset.config();
            assert_eq!(config.clone().sanitized(), config, "{}", preset.name());
        }
    }

    #[test]
    fn test_preset_cycle_visits_all() {
        let mut p = Preset::Starfield;
        for _ in 0..Preset::ALL.len() {
            p = p.next();
        }
        assert_eq!(p, Preset::Starfield);
    }
}
