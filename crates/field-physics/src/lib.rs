//! # Field Physics
//!
//! Particle storage and the pure force functions used by the field
//! integrator: drift noise, pointer repulsion, capture/orbit and the
//! boundary helpers. Nothing in here knows about cameras or rendering.

pub mod constants;
pub mod forces;
pub mod particle;

pub use constants::*;
pub use forces::*;
pub use particle::*;
