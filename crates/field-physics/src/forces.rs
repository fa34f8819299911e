//! Force and falloff functions for the field integrator
//!
//! Everything here is a pure function of its arguments. Degenerate inputs
//! (zero-length offsets, non-positive radii, non-finite results) produce a
//! zero contribution instead of a NaN, since one bad value written into the
//! particle arrays would stick to that particle forever.

use crate::constants::{ORBIT_MAX_TILT, SOFTENING};
use glam::Vec3;

/// Cubic Hermite ramp from 0 at `edge0` to 1 at `edge1`
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Result of the pointer repulsion term for one particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInfluence {
    /// Repulsive acceleration (zero outside the radius)
    pub acceleration: Vec3,
    /// Falloff weight: 1 at the pointer, 0 at and beyond the radius
    pub weight: f32,
    /// Planar distance from the particle to the pointer
    pub distance: f32,
}

/// Push a particle away from the pointer within the pointer plane
///
/// The offset is projected onto the plane with unit `normal` first, so the
/// particle's depth along the normal does not matter. A zero normal keeps
/// the full 3D offset.
///
/// weight = 1 - smoothstep(0, radius, d), acceleration magnitude = weight × strength
pub fn pointer_repulsion(
    position: Vec3,
    pointer: Vec3,
    normal: Vec3,
    radius: f32,
    strength: f32,
) -> PointerInfluence {
    let offset = planar_offset(position - pointer, normal);
    let d2 = offset.length_squared();
    let distance = d2.sqrt();

    if radius <= 0.0 || d2.is_nan() || d2 >= radius * radius {
        return PointerInfluence {
            acceleration: Vec3::ZERO,
            weight: 0.0,
            distance,
        };
    }

    let weight = 1.0 - smoothstep(0.0, radius, distance);
    let direction = offset / (distance + SOFTENING);
    let acceleration = direction * (weight * strength);

    PointerInfluence {
        acceleration: finite_or_zero(acceleration),
        weight,
        distance,
    }
}

/// `offset` with its component along `normal` removed
pub fn planar_offset(offset: Vec3, normal: Vec3) -> Vec3 {
    offset - normal * offset.dot(normal)
}

/// Move a capture strength one step toward 1 (inside) or 0 (released)
///
/// The result is always within [0, 1].
pub fn approach_capture(
    current: f32,
    captured: bool,
    capture_rate: f32,
    release_rate: f32,
    dt: f32,
) -> f32 {
    let current = if current.is_finite() {
        current.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let next = if captured {
        current + capture_rate.max(0.0) * dt
    } else {
        current - release_rate.max(0.0) * dt
    };
    if next.is_nan() {
        current
    } else {
        next.clamp(0.0, 1.0)
    }
}

/// Parameters of the capture/orbit force
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitParams {
    /// Spring strength toward the orbit radius and the orbit plane
    pub pull: f32,
    /// Tangential acceleration per unit of target radius
    pub strength: f32,
}

/// Normal of a particle's orbit plane: `axis` leaned by at most
/// `ORBIT_MAX_TILT`, with `phase` choosing both lean direction and amount
pub fn orbit_axis(axis: Vec3, phase: f32) -> Vec3 {
    let axis = axis.try_normalize().unwrap_or(Vec3::Z);
    let (sin, cos) = phase.sin_cos();
    let u = axis.any_orthonormal_vector();
    let lean = u * cos + axis.cross(u) * sin;
    let (tilt_sin, tilt_cos) = (ORBIT_MAX_TILT * sin.abs()).sin_cos();
    axis * tilt_cos + lean * tilt_sin
}

/// Circular orbit around `center` for a captured particle
///
/// The orbit lies in the plane through `center` normal to
/// `orbit_axis(axis, phase)`. Three terms, all scaled by `capture`: a
/// spring toward `target_radius` within the plane, a spring back onto the
/// plane, and a swirl about the orbit normal. The swirl grows with the
/// target radius so every orbit turns at the same angular rate.
pub fn orbit_acceleration(
    position: Vec3,
    center: Vec3,
    axis: Vec3,
    target_radius: f32,
    phase: f32,
    capture: f32,
    params: OrbitParams,
) -> Vec3 {
    if capture <= 0.0 {
        return Vec3::ZERO;
    }

    let offset = position - center;
    if offset.length() < SOFTENING {
        return Vec3::ZERO;
    }

    let normal = orbit_axis(axis, phase);
    let height = offset.dot(normal);
    let planar = offset - normal * height;
    let radius = planar.length();
    // On the orbit normal itself any in-plane direction will do
    let radial = if radius < SOFTENING {
        normal.any_orthonormal_vector()
    } else {
        planar / radius
    };

    let spring = -radial * ((radius - target_radius) * params.pull);
    let flatten = -normal * (height * params.pull);
    let swirl = normal.cross(radial) * (params.strength * target_radius.max(0.0));

    finite_or_zero((spring + flatten + swirl) * capture)
}

/// Deterministic drift noise in [-1, 1]³ for particle `index` at time `t`
///
/// Each axis is a sum of two sines whose phases and frequencies are hashed
/// from the index, so neighbouring particles wander independently.
pub fn drift_noise(index: u32, t: f32) -> Vec3 {
    let h0 = hash01(index.wrapping_mul(3));
    let h1 = hash01(index.wrapping_mul(3).wrapping_add(1));
    let h2 = hash01(index.wrapping_mul(3).wrapping_add(2));

    let axis = |h: f32| {
        let phase = h * std::f32::consts::TAU;
        let freq = 0.35 + h * 0.9;
        0.5 * ((t * freq + phase).sin() + (t * freq * 1.7 - phase).cos())
    };

    Vec3::new(axis(h0), axis(h1), axis(h2))
}

/// Step a value exponentially toward `target`
///
/// value + (target - value) × (1 - exp(-rate × dt))
pub fn smooth_toward(value: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    let alpha = 1.0 - (-rate.max(0.0) * dt.max(0.0)).exp();
    let next = value + (target - value) * alpha;
    if next.is_finite() {
        next
    } else {
        value
    }
}

/// Nudge one velocity component back inward when its coordinate exceeds `extent`
pub fn bounce_component(position: f32, velocity: f32, extent: f32, nudge: f32) -> f32 {
    if position > extent {
        velocity - nudge
    } else if position < -extent {
        velocity + nudge
    } else {
        velocity
    }
}

/// Shift `value` by whole spans of `2 × half_extent` into [-half_extent, half_extent]
pub fn wrap_coordinate(value: f32, half_extent: f32) -> f32 {
    if half_extent.is_nan() || half_extent <= 0.0 || !value.is_finite() {
        return value;
    }
    let span = 2.0 * half_extent;
    let wrapped = if value > half_extent {
        value - span * ((value - half_extent) / span).ceil()
    } else if value < -half_extent {
        value + span * ((-half_extent - value) / span).ceil()
    } else {
        return value;
    };
    wrapped.clamp(-half_extent, half_extent)
}

fn finite_or_zero(v: Vec3) -> Vec3 {
    if v.is_finite() {
        v
    } else {
        Vec3::ZERO
    }
}

fn hash01(seed: u32) -> f32 {
    let mut x = seed.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    x ^= x >> 16;
    x = x.wrapping_mul(2_246_822_519);
    x ^= x >> 13;
    (x as f32) / (u32::MAX as f32)
}
