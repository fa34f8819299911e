//! Read-only view of the render camera
//!
//! The camera itself belongs to the renderer; each frame it hands the
//! simulation a `CameraView` snapshot, which is all the pointer mapper and
//! the frustum volume need.

use glam::{Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub position: Vec3,
    /// Unit view direction
    pub forward: Vec3,
    /// Unit screen-up direction, orthogonal to `forward`
    pub up: Vec3,
    /// Unit screen-right direction
    pub right: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Viewport width / height
    pub aspect: f32,
}

impl Default for CameraView {
    fn default() -> Self {
        Self::looking_at(
            Vec3::new(0.0, 0.0, 6.0),
            Vec3::ZERO,
            Vec3::Y,
            45f32.to_radians(),
            16.0 / 9.0,
        )
    }
}

impl CameraView {
    /// Build an orthonormal view basis. Falls back to sensible axes when the
    /// target coincides with the position or `up` is parallel to the view.
    pub fn looking_at(position: Vec3, target: Vec3, up: Vec3, fov_y: f32, aspect: f32) -> Self {
        let forward = (target - position).try_normalize().unwrap_or(Vec3::NEG_Z);
        let right = forward
            .cross(up)
            .try_normalize()
            .or_else(|| forward.cross(Vec3::Z).try_normalize())
            .unwrap_or(Vec3::X);
        let up = right.cross(forward);

        Self {
            position,
            forward,
            up,
            right,
            fov_y,
            aspect: if aspect.is_finite() && aspect > 0.0 {
                aspect
            } else {
                1.0
            },
        }
    }

    /// Half-width and half-height of the visible plane `depth` units in front of the camera
    pub fn half_extents_at(&self, depth: f32) -> Vec2 {
        let half_h = depth.max(0.0) * (self.fov_y * 0.5).tan();
        Vec2::new(half_h * self.aspect, half_h)
    }

    /// World → camera-relative coordinates (x right, y up, z depth along `forward`)
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        let d = world - self.position;
        Vec3::new(d.dot(self.right), d.dot(self.up), d.dot(self.forward))
    }

    /// Camera-relative → world coordinates
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.right * local.x + self.up * local.y + self.forward * local.z
    }

    /// Unit ray direction through a normalized device coordinate
    pub fn ray_direction(&self, ndc: Vec2) -> Vec3 {
        let half = self.half_extents_at(1.0);
        (self.forward + self.right * (ndc.x * half.x) + self.up * (ndc.y * half.y))
            .normalize_or_zero()
    }
}
