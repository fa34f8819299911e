//! Tuning constants for the particle field
//!
//! Defaults are chosen for a scene a few world units across, viewed from a
//! camera roughly 6 units away.

/// Softening added to distances before dividing, prevents singularities at r→0
pub const SOFTENING: f32 = 1.0e-4;

/// Below this magnitude a ray/plane denominator counts as parallel
pub const PARALLEL_EPSILON: f32 = 1.0e-6;

/// Per-tick velocity multiplier
pub const DAMPING: f32 = 0.96;

/// Drift acceleration magnitude (world units / s²)
pub const DRIFT: f32 = 0.02;

/// Radius around the pointer inside which particles are pushed away
pub const INFLUENCE_RADIUS: f32 = 1.5;

/// Peak repulsive acceleration right at the pointer
pub const REPULSE_STRENGTH: f32 = 0.6;

/// Radius around the pointer inside which capture mode grabs particles
pub const CAPTURE_RADIUS: f32 = 2.0;

/// Capture strength gained per second while inside the capture radius
pub const CAPTURE_RATE: f32 = 1.5;

/// Capture strength lost per second when released
pub const RELEASE_RATE: f32 = 0.8;

/// Spring strength pulling captured particles onto their orbit radius and plane
pub const ORBIT_PULL: f32 = 4.0;

/// Tangential acceleration of fully captured particles, per unit of orbit radius
pub const ORBIT_STRENGTH: f32 = 0.2;

/// Largest angle between an orbit's normal and the camera's view direction
pub const ORBIT_MAX_TILT: f32 = std::f32::consts::FRAC_PI_3;

/// Range of per-particle target orbit radii
pub const ORBIT_RADIUS_MIN: f32 = 0.35;
pub const ORBIT_RADIUS_MAX: f32 = 1.2;

/// Brightness multiplier reached at full capture
pub const CAPTURE_BOOST: f32 = 1.8;

/// Exponential color smoothing rate (1/s)
pub const COLOR_SMOOTH_RATE: f32 = 6.0;

/// Velocity decrement applied per tick while a particle sits outside the bounce box
pub const BOUNCE_NUDGE: f32 = 0.002;

/// Upper bound on a single integration timestep (seconds)
pub const MAX_DT: f32 = 1.0 / 15.0;
