//! Pointer → world mapping
//!
//! The pointer's normalized device coordinates are cast as a ray from the
//! camera and intersected with a plane. Pointer distances are then measured
//! within that plane (see `plane_normal`), in world units. The mapper
//! remembers the last good hit and returns it unchanged whenever the ray is
//! parallel to the plane or the hit lies behind the camera.

use crate::camera::CameraView;
use field_physics::constants::PARALLEL_EPSILON;
use glam::{Vec2, Vec3};

/// The plane pointer rays are intersected with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerPlane {
    /// Perpendicular to the view direction, `depth` units in front of the camera
    CameraFacing { depth: f32 },
    /// A fixed plane in world space
    World { point: Vec3, normal: Vec3 },
}

#[derive(Debug, Clone)]
pub struct PointerMapper {
    plane: PointerPlane,
    last: Vec3,
}

impl PointerMapper {
    pub fn new(plane: PointerPlane) -> Self {
        Self {
            plane,
            last: Vec3::ZERO,
        }
    }

    pub fn plane(&self) -> PointerPlane {
        self.plane
    }

    pub fn set_plane(&mut self, plane: PointerPlane) {
        self.plane = plane;
    }

    /// Last successfully mapped point
    pub fn last_point(&self) -> Vec3 {
        self.last
    }

    /// Unit normal of the pointer plane for this camera, or zero if degenerate
    pub fn plane_normal(&self, camera: &CameraView) -> Vec3 {
        match self.plane {
            PointerPlane::CameraFacing { .. } => camera.forward.normalize_or_zero(),
            PointerPlane::World { normal, .. } => normal.normalize_or_zero(),
        }
    }

    /// Map pointer NDC (each axis in [-1, 1]) to a world point on the plane
    pub fn map(&mut self, ndc: Vec2, camera: &CameraView) -> Vec3 {
        if !ndc.is_finite() {
            return self.last;
        }
        let ndc = ndc.clamp(Vec2::NEG_ONE, Vec2::ONE);

        let normal = self.plane_normal(camera);
        let origin = match self.plane {
            PointerPlane::CameraFacing { depth } => camera.position + camera.forward * depth,
            PointerPlane::World { point, .. } => point,
        };
        if normal == Vec3::ZERO {
            return self.last;
        }

        let dir = camera.ray_direction(ndc);
        let denom = dir.dot(normal);
        if denom.abs() < PARALLEL_EPSILON {
            return self.last;
        }

        let t = (origin - camera.position).dot(normal) / denom;
        if !t.is_finite() || t < 0.0 {
            return self.last;
        }

        let hit = camera.position + dir * t;
        if hit.is_finite() {
            self.last = hit;
        }
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_plane_depth() {
        let cam = CameraView::default();
        let mut mapper = PointerMapper::new(PointerPlane::CameraFacing { depth: 6.0 });
        let p = mapper.map(Vec2::ZERO, &cam);
        assert!(p.length() < 1e-5, "{p:?}");
    }

    #[test]
    fn test_corner_maps_to_visible_edge() {
        let cam = CameraView::default();
        let mut mapper = PointerMapper::new(PointerPlane::CameraFacing { depth: 6.0 });
        let p = mapper.map(Vec2::ONE, &cam);
        let half = cam.half_extents_at(6.0);
        assert!((p.x - half.x).abs() < 1e-4);
        assert!((p.y - half.y).abs() < 1e-4);
        assert!(p.z.abs() < 1e-4);
    }

    #[test]
    fn test_world_plane_hit() {
        let cam = CameraView::default();
        let mut mapper = PointerMapper::new(PointerPlane::World {
            point: Vec3::new(0.0, 0.0, -2.0),
            normal: Vec3::Z,
        });
        let p = mapper.map(Vec2::ZERO, &cam);
        assert!((p - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);
    }

    #[test]
    fn test_parallel_ray_keeps_previous_point() {
        let cam = CameraView::default();
        let mut mapper = PointerMapper::new(PointerPlane::World {
            point: Vec3::new(0.0, 0.0, -2.0),
            normal: Vec3::Z,
        });
        let first = mapper.map(Vec2::new(0.5, 0.5), &cam);

        // A plane containing the view direction: every center ray is parallel to it
        mapper.set_plane(PointerPlane::World {
            point: Vec3::ZERO,
            normal: Vec3::X,
        });
        let second = mapper.map(Vec2::ZERO, &cam);
        assert_eq!(first, second);
        assert!(second.is_finite());
    }

    #[test]
    fn test_plane_behind_camera_keeps_previous_point() {
        let cam = CameraView::default();
        let mut mapper = PointerMapper::new(PointerPlane::World {
            point: Vec3::new(0.0, 0.0, 10.0),
            normal: Vec3::Z,
        });
        assert_eq!(mapper.map(Vec2::ZERO, &cam), Vec3::ZERO);
    }

    #[test]
    fn test_plane_normal_follows_plane_kind() {
        let cam = CameraView::default();
        let facing = PointerMapper::new(PointerPlane::CameraFacing { depth: 6.0 });
        assert!((facing.plane_normal(&cam) - cam.forward).length() < 1e-6);

        let world = PointerMapper::new(PointerPlane::World {
            point: Vec3::ZERO,
            normal: Vec3::new(0.0, 3.0, 0.0),
        });
        assert_eq!(world.plane_normal(&cam), Vec3::Y);
    }

    #[test]
    fn test_non_finite_input_is_ignored() {
        let cam = CameraView::default();
        let mut mapper = PointerMapper::new(PointerPlane::CameraFacing { depth: 6.0 });
        let good = mapper.map(Vec2::new(0.2, -0.4), &cam);
        assert_eq!(mapper.map(Vec2::new(f32::NAN, 0.0), &cam), good);
        assert_eq!(mapper.last_point(), good);
    }
}
