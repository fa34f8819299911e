//! Orbit camera for the particle field

use bytemuck::{Pod, Zeroable};
use field_simulation::CameraView;
use glam::{Mat4, Vec3};

/// Camera uniform for GPU
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// World-space screen right, for billboard expansion
    pub right: [f32; 3],
    pub point_size: f32,
    /// World-space screen up
    pub up: [f32; 3],
    pub time: f32,
}

/// Polar angle stays this far from either pole
const POLE_MARGIN: f32 = 0.05;

/// Camera orbiting `target` at `distance`
///
/// Spherical coordinates: `azimuth` turns around world +Y (0 puts the
/// camera on the +Z side), `polar` is measured down from +Y.
pub struct Camera {
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub azimuth: f32,
    pub polar: f32,
    pub target: Vec3,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            distance: 6.0,
            min_distance: 3.5,
            max_distance: 9.0,
            azimuth: 0.0,
            // Slightly above the equator
            polar: std::f32::consts::PI / 2.2,
            target: Vec3::ZERO,
            aspect: aspect_ratio(width, height),
            fovy: 45.0_f32.to_radians(),
            znear: 0.05,
            zfar: 500.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        self.target
            + Vec3::new(sin_polar * sin_azimuth, cos_polar, sin_polar * cos_azimuth) * self.distance
    }

    /// Drag by `delta_x` radians around the target and `delta_y` radians toward the poles
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.azimuth = (self.azimuth + delta_x).rem_euclid(std::f32::consts::TAU);
        self.polar = (self.polar - delta_y).clamp(POLE_MARGIN, std::f32::consts::PI - POLE_MARGIN);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(self.min_distance, self.max_distance);
    }

    /// Back to the initial orbit, keeping aspect and field of view
    pub fn reset(&mut self) {
        let fresh = Camera::new(1, 1);
        self.azimuth = fresh.azimuth;
        self.polar = fresh.polar;
        self.target = fresh.target;
        self.distance = fresh.distance.clamp(self.min_distance, self.max_distance);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn build_view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Snapshot handed to the simulation each frame
    pub fn view(&self) -> CameraView {
        CameraView::looking_at(self.position(), self.target, Vec3::Y, self.fovy, self.aspect)
    }

    pub fn to_uniform(&self, point_size: f32, time: f32) -> CameraUniform {
        let view = self.view();
        CameraUniform {
            view_proj: self.build_view_projection_matrix().to_cols_array_2d(),
            right: view.right.to_array(),
            point_size,
            up: view.up.to_array(),
            time,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
