//! # Field Renderer
//!
//! Scene side of the particle field: the orbit camera the simulation reads
//! its `CameraView` from, the wgpu device/surface, the point-sprite
//! renderer that draws a `ParticleField`, and the lit knot at the centre
//! of the starfield.

pub mod camera;
pub mod context;
pub mod error;
pub mod knot;
pub mod renderer;

pub use camera::*;
pub use context::*;
pub use error::*;
pub use knot::*;
pub use renderer::*;
