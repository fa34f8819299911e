//! Camera-relative spawn and wrap volume
//!
//! The visible region between `depth_near` and `depth_far` in front of the
//! camera. At depth `z` the visible plane has half-height `z·tan(fov/2)` and
//! half-width `half-height·aspect`.

use crate::camera::CameraView;
use crate::config::FieldConfig;
use field_physics::forces::wrap_coordinate;
use glam::Vec3;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnVolume {
    depth_near: f32,
    depth_far: f32,
}

/// What `SpawnVolume::wrap` did to a particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WrapOutcome {
    /// Already inside, untouched
    Inside,
    /// Lateral coordinates shifted by whole spans
    Wrapped(Vec3),
    /// Left the depth range and was re-sampled at the opposite end
    Respawned(Vec3),
}

impl SpawnVolume {
    pub fn new(depth_near: f32, depth_far: f32) -> Self {
        let depth_near = depth_near.max(1.0e-3);
        Self {
            depth_near,
            depth_far: depth_far.max(depth_near),
        }
    }

    pub fn from_config(config: &FieldConfig) -> Self {
        Self::new(config.depth_near, config.depth_far)
    }

    pub fn depth_near(&self) -> f32 {
        self.depth_near
    }

    pub fn depth_far(&self) -> f32 {
        self.depth_far
    }

    /// Uniform depth in range, then a uniform point in the visible rectangle there
    pub fn sample<R: Rng + ?Sized>(&self, camera: &CameraView, rng: &mut R) -> Vec3 {
        let depth = self.depth_near + rng.random::<f32>() * (self.depth_far - self.depth_near);
        self.sample_at_depth(camera, depth, rng)
    }

    pub fn sample_at_depth<R: Rng + ?Sized>(
        &self,
        camera: &CameraView,
        depth: f32,
        rng: &mut R,
    ) -> Vec3 {
        let half = camera.half_extents_at(depth);
        let x = (rng.random::<f32>() * 2.0 - 1.0) * half.x;
        let y = (rng.random::<f32>() * 2.0 - 1.0) * half.y;
        camera.to_world(Vec3::new(x, y, depth))
    }

    /// Keep a world position inside the volume
    ///
    /// Depth leaving `[depth_near, depth_far]` re-samples the particle at the
    /// opposite end; otherwise x/y are wrapped across the visible span at the
    /// particle's own depth.
    pub fn wrap<R: Rng + ?Sized>(
        &self,
        camera: &CameraView,
        position: Vec3,
        rng: &mut R,
    ) -> WrapOutcome {
        let local = camera.to_local(position);
        if !local.is_finite() {
            return WrapOutcome::Respawned(self.sample(camera, rng));
        }

        if local.z < self.depth_near {
            return WrapOutcome::Respawned(self.sample_at_depth(camera, self.depth_far, rng));
        }
        if local.z > self.depth_far {
            return WrapOutcome::Respawned(self.sample_at_depth(camera, self.depth_near, rng));
        }

        let half = camera.half_extents_at(local.z);
        let x = wrap_coordinate(local.x, half.x);
        let y = wrap_coordinate(local.y, half.y);
        if x == local.x && y == local.y {
            WrapOutcome::Inside
        } else {
            WrapOutcome::Wrapped(camera.to_world(Vec3::new(x, y, local.z)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_samples_stay_in_frustum() {
        let cam = CameraView::default();
        let volume = SpawnVolume::new(2.0, 10.0);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let p = volume.sample(&cam, &mut rng);
            let local = cam.to_local(p);
            assert!(local.z >= 2.0 - 1e-4 && local.z <= 10.0 + 1e-4);
            let half = cam.half_extents_at(local.z);
            assert!(local.x.abs() <= half.x + 1e-4);
            assert!(local.y.abs() <= half.y + 1e-4);
        }
    }

    #[test]
    fn test_wrap_moves_by_one_span() {
        let cam = CameraView::default();
        let volume = SpawnVolume::new(2.0, 10.0);
        let mut rng = StdRng::seed_from_u64(1);

        let depth = 5.0;
        let half = cam.half_extents_at(depth);
        let outside = cam.to_world(Vec3::new(half.x + 0.1, 0.0, depth));

        match volume.wrap(&cam, outside, &mut rng) {
            WrapOutcome::Wrapped(p) => {
                let local = cam.to_local(p);
                assert!(local.x >= -half.x - 1e-4 && local.x <= half.x + 1e-4);
                let shift = (cam.to_local(outside).x - local.x) / (2.0 * half.x);
                assert!((shift - 1.0).abs() < 1e-4);
                assert!((local.z - depth).abs() < 1e-4);
            }
            other => panic!("expected wrap, got {other:?}"),
        }
    }

    #[test]
    fn test_inside_is_untouched() {
        let cam = CameraView::default();
        let volume = SpawnVolume::new(2.0, 10.0);
        let mut rng = StdRng::seed_from_u64(1);
        let p = cam.to_world(Vec3::new(0.1, -0.2, 4.0));
        assert_eq!(volume.wrap(&cam, p, &mut rng), WrapOutcome::Inside);
    }

    #[test]
    fn test_depth_exit_respawns_at_opposite_end() {
        let cam = CameraView::default();
        let volume = SpawnVolume::new(2.0, 10.0);
        let mut rng = StdRng::seed_from_u64(3);

        let too_close = cam.to_world(Vec3::new(0.0, 0.0, 1.0));
        match volume.wrap(&cam, too_close, &mut rng) {
            WrapOutcome::Respawned(p) => assert!((cam.to_local(p).z - 10.0).abs() < 1e-3),
            other => panic!("expected respawn, got {other:?}"),
        }

        let too_far = cam.to_world(Vec3::new(0.0, 0.0, 12.0));
        match volume.wrap(&cam, too_far, &mut rng) {
            WrapOutcome::Respawned(p) => assert!((cam.to_local(p).z - 2.0).abs() < 1e-3),
            other => panic!("expected respawn, got {other:?}"),
        }
    }

    #[test]
    fn test_inverted_depths_are_repaired() {
        let volume = SpawnVolume::new(5.0, 1.0);
        assert_eq!(volume.depth_near(), 5.0);
        assert_eq!(volume.depth_far(), 5.0);
    }
}
