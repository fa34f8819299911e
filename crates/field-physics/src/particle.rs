//! Particle storage
//!
//! A particle is an index into a set of parallel arrays, not an object. The
//! three-component arrays (position, velocity, base color, displayed color)
//! always hold exactly `len() * 3` floats and the scalar arrays `len()`
//! floats, so index `i` names the same particle everywhere. The flat `f32`
//! layout is what the renderer uploads each frame.

use glam::Vec3;

/// One particle's state, copied out of (and back into) a [`ParticleField`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub base_color: Vec3,
    /// Currently displayed color, smoothed toward a per-frame target
    pub color: Vec3,
    /// Capture strength in [0, 1]
    pub capture: f32,
    /// Target orbit radius while captured (fixed at creation)
    pub orbit_radius: f32,
    /// Orbit plane phase in [0, TAU) (fixed at creation)
    pub orbit_phase: f32,
}

impl Particle {
    pub fn at_rest(position: Vec3, color: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            base_color: color,
            color,
            capture: 0.0,
            orbit_radius: 0.0,
            orbit_phase: 0.0,
        }
    }
}

/// Parallel particle arrays
#[derive(Debug, Clone)]
pub struct ParticleField {
    positions: Vec<f32>,
    velocities: Vec<f32>,
    base_colors: Vec<f32>,
    colors: Vec<f32>,
    capture: Vec<f32>,
    orbit_radius: Vec<f32>,
    orbit_phase: Vec<f32>,
}

impl ParticleField {
    /// Allocate `count` particles at the origin, at rest and black.
    /// A zero count is raised to one.
    pub fn new(count: usize) -> Self {
        let count = count.max(1);
        Self {
            positions: vec![0.0; count * 3],
            velocities: vec![0.0; count * 3],
            base_colors: vec![0.0; count * 3],
            colors: vec![0.0; count * 3],
            capture: vec![0.0; count],
            orbit_radius: vec![0.0; count],
            orbit_phase: vec![0.0; count],
        }
    }

    pub fn len(&self) -> usize {
        self.capture.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capture.is_empty()
    }

    /// True when every array has the length implied by `len()`
    pub fn is_aligned(&self) -> bool {
        let n = self.len();
        self.positions.len() == n * 3
            && self.velocities.len() == n * 3
            && self.base_colors.len() == n * 3
            && self.colors.len() == n * 3
            && self.orbit_radius.len() == n
            && self.orbit_phase.len() == n
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn velocities(&self) -> &[f32] {
        &self.velocities
    }

    pub fn base_colors(&self) -> &[f32] {
        &self.base_colors
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn capture(&self) -> &[f32] {
        &self.capture
    }

    pub fn get(&self, index: usize) -> Particle {
        Particle {
            position: read3(&self.positions, index),
            velocity: read3(&self.velocities, index),
            base_color: read3(&self.base_colors, index),
            color: read3(&self.colors, index),
            capture: self.capture[index],
            orbit_radius: self.orbit_radius[index],
            orbit_phase: self.orbit_phase[index],
        }
    }

    /// Write a particle back. Capture strength is clamped to [0, 1].
    pub fn set(&mut self, index: usize, particle: &Particle) {
        write3(&mut self.positions, index, particle.position);
        write3(&mut self.velocities, index, particle.velocity);
        write3(&mut self.base_colors, index, particle.base_color);
        write3(&mut self.colors, index, particle.color);
        self.capture[index] = particle.capture.clamp(0.0, 1.0);
        self.orbit_radius[index] = particle.orbit_radius;
        self.orbit_phase[index] = particle.orbit_phase;
    }

    pub fn position(&self, index: usize) -> Vec3 {
        read3(&self.positions, index)
    }

    pub fn set_position(&mut self, index: usize, position: Vec3) {
        write3(&mut self.positions, index, position);
    }

    pub fn velocity(&self, index: usize) -> Vec3 {
        read3(&self.velocities, index)
    }

    pub fn set_velocity(&mut self, index: usize, velocity: Vec3) {
        write3(&mut self.velocities, index, velocity);
    }

    pub fn color(&self, index: usize) -> Vec3 {
        read3(&self.colors, index)
    }

    /// Set both the base and the displayed color of every particle
    pub fn fill_color(&mut self, color: Vec3) {
        for i in 0..self.len() {
            write3(&mut self.base_colors, i, color);
            write3(&mut self.colors, i, color);
        }
    }

    /// Set only the base color; displayed colors catch up through smoothing
    pub fn fill_base_color(&mut self, color: Vec3) {
        for i in 0..self.len() {
            write3(&mut self.base_colors, i, color);
        }
    }

    /// Largest particle speed (per-tick units)
    pub fn max_speed(&self) -> f32 {
        (0..self.len())
            .map(|i| self.velocity(i).length())
            .fold(0.0, f32::max)
    }
}

fn read3(values: &[f32], index: usize) -> Vec3 {
    Vec3::from_slice(&values[index * 3..index * 3 + 3])
}

fn write3(values: &mut [f32], index: usize, v: Vec3) {
    values[index * 3..index * 3 + 3].copy_from_slice(&v.to_array());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_count_is_raised_to_one() {
        let field = ParticleField::new(0);
        assert_eq!(field.len(), 1);
        assert!(field.is_aligned());
    }

    #[test]
    fn test_arrays_are_index_aligned() {
        let field = ParticleField::new(17);
        assert_eq!(field.positions().len(), 17 * 3);
        assert_eq!(field.velocities().len(), 17 * 3);
        assert_eq!(field.colors().len(), 17 * 3);
        assert_eq!(field.capture().len(), 17);
        assert!(field.is_aligned());
    }

    #[test]
    fn test_set_get_touches_only_one_index() {
        let mut field = ParticleField::new(3);
        let mut p = Particle::at_rest(Vec3::new(1.0, 2.0, 3.0), Vec3::ONE);
        p.velocity = Vec3::new(-1.0, 0.5, 0.0);
        p.capture = 0.25;
        field.set(1, &p);

        assert_eq!(field.get(1), p);
        assert_eq!(field.position(0), Vec3::ZERO);
        assert_eq!(field.position(2), Vec3::ZERO);
        assert_eq!(&field.positions()[3..6], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_capture_is_clamped_on_write() {
        let mut field = ParticleField::new(2);
        let mut p = field.get(0);
        p.capture = 3.0;
        field.set(0, &p);
        p.capture = -1.0;
        field.set(1, &p);

        assert_eq!(field.capture(), &[1.0, 0.0]);
    }

    #[test]
    fn test_fill_color() {
        let mut field = ParticleField::new(4);
        field.fill_color(Vec3::new(0.2, 0.4, 0.6));
        assert_eq!(field.color(3), Vec3::new(0.2, 0.4, 0.6));
        assert_eq!(field.get(3).base_color, Vec3::new(0.2, 0.4, 0.6));

        field.fill_base_color(Vec3::ONE);
        assert_eq!(field.get(2).base_color, Vec3::ONE);
        assert_eq!(field.color(2), Vec3::new(0.2, 0.4, 0.6));
    }
}
