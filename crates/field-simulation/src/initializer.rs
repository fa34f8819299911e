//! Initial particle state

use crate::camera::CameraView;
use crate::config::{FieldConfig, SpawnDistribution};
use crate::volume::SpawnVolume;
use field_physics::{Particle, ParticleField};
use glam::Vec3;
use rand::Rng;

/// Build `config.count` particles (at least one) at rest in the configured distribution
///
/// Each particle gets the base color, zero capture, and a random orbit
/// radius and phase that stay fixed for its lifetime.
pub fn initialize<R: Rng + ?Sized>(
    config: &FieldConfig,
    camera: &CameraView,
    rng: &mut R,
) -> ParticleField {
    let count = config.count.max(1);
    let mut field = ParticleField::new(count);
    let volume = SpawnVolume::from_config(config);
    let [radius_min, radius_max] = config.orbit_radius_range;

    for i in 0..count {
        let position = match config.distribution {
            SpawnDistribution::UniformBox => Vec3::new(
                symmetric(rng) * config.spread.x,
                symmetric(rng) * config.spread.y,
                symmetric(rng) * config.spread.z,
            ),
            SpawnDistribution::Cluster { sigma } => gaussian3(rng) * config.spread * sigma,
            SpawnDistribution::Frustum => volume.sample(camera, rng),
        };

        let mut particle = Particle::at_rest(position, config.base_color);
        particle.orbit_radius = radius_min + rng.random::<f32>() * (radius_max - radius_min);
        particle.orbit_phase = rng.random::<f32>() * std::f32::consts::TAU;
        field.set(i, &particle);
    }

    log::debug!(
        "Initialized {} particles ({:?})",
        count,
        config.distribution
    );

    field
}

/// Pair of independent standard normal samples (Box–Muller)
pub fn box_muller<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    // 1 - [0, 1) keeps u1 away from zero so ln() stays finite
    let u1 = 1.0 - rng.random::<f32>();
    let u2 = rng.random::<f32>();
    let r = (-2.0 * u1.ln()).sqrt();
    let (sin, cos) = (std::f32::consts::TAU * u2).sin_cos();
    (r * cos, r * sin)
}

fn gaussian3<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let (x, y) = box_muller(rng);
    let (z, _) = box_muller(rng);
    Vec3::new(x, y, z)
}

fn symmetric<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random::<f32>() * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_box_respects_spread() {
        let config = FieldConfig {
            count: 300,
            spread: Vec3::new(2.0, 1.0, 3.0),
            distribution: SpawnDistribution::UniformBox,
            ..FieldConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let field = initialize(&config, &CameraView::default(), &mut rng);

        assert_eq!(field.len(), 300);
        assert!(field.is_aligned());
        for i in 0..field.len() {
            let p = field.position(i);
            assert!(p.x.abs() <= 2.0 && p.y.abs() <= 1.0 && p.z.abs() <= 3.0);
            assert_eq!(field.velocity(i), Vec3::ZERO);
            assert_eq!(field.color(i), config.base_color);
        }
    }

    #[test]
    fn test_cluster_is_centered() {
        let config = FieldConfig {
            count: 4000,
            spread: Vec3::ONE,
            distribution: SpawnDistribution::Cluster { sigma: 0.5 },
            ..FieldConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let field = initialize(&config, &CameraView::default(), &mut rng);

        let n = field.len() as f32;
        let mean = (0..field.len()).map(|i| field.position(i)).sum::<Vec3>() / n;
        let var_x = (0..field.len())
            .map(|i| (field.position(i).x - mean.x).powi(2))
            .sum::<f32>()
            / n;

        assert!(mean.length() < 0.05, "mean {mean:?}");
        // sigma 0.5 → variance 0.25
        assert!((var_x - 0.25).abs() < 0.03, "var {var_x}");
    }

    #[test]
    fn test_orbit_attributes_in_range() {
        let config = Preset::Atom.config();
        let mut rng = StdRng::seed_from_u64(9);
        let field = initialize(&config, &CameraView::default(), &mut rng);
        let [lo, hi] = config.orbit_radius_range;

        for i in 0..field.len() {
            let p = field.get(i);
            assert!(p.orbit_radius >= lo && p.orbit_radius <= hi);
            assert!(p.orbit_phase >= 0.0 && p.orbit_phase < std::f32::consts::TAU);
            assert_eq!(p.capture, 0.0);
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let config = Preset::Tunnel.config();
        let cam = CameraView::default();
        let a = initialize(&config, &cam, &mut StdRng::seed_from_u64(42));
        let b = initialize(&config, &cam, &mut StdRng::seed_from_u64(42));
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.colors(), b.colors());
    }

    #[test]
    fn test_zero_count_still_builds_one() {
        let config = FieldConfig {
            count: 0,
            ..FieldConfig::default()
        };
        let field = initialize(&config, &CameraView::default(), &mut StdRng::seed_from_u64(0));
        assert_eq!(field.len(), 1);
    }

    #[test]
    fn test_box_muller_is_finite() {
        let mut rng = StdRng::seed_from_u64(123);
        for _ in 0..10_000 {
            let (a, b) = box_muller(&mut rng);
            assert!(a.is_finite() && b.is_finite());
        }
    }
}
