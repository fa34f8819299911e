//! # Field Simulation
//!
//! CPU particle field: configuration and presets, camera-relative spawn and
//! wrap volumes, pointer mapping, the per-frame integrator and the frame loop
//! that drives it.

pub mod camera;
pub mod config;
pub mod frame_loop;
pub mod initializer;
pub mod pointer;
pub mod simulation;
pub mod volume;

pub use camera::*;
pub use config::*;
pub use frame_loop::*;
pub use initializer::*;
pub use pointer::*;
pub use simulation::*;
pub use volume::*;
