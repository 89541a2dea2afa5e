//! Movement, collision, ballistics and prediction for CROSSFIRE.
//!
//! The same integrator and weapon model run inside the client prediction
//! engine and the reference authority, and the engine keeps a hecs world of
//! remote entities for interpolation and event detection.

pub mod authority;
pub mod ballistics;
pub mod collision;
pub mod engine;
pub mod input_buffer;
pub mod movement;
pub mod systems;
pub mod weapon;
pub mod world_setup;

pub use crossfire_core as core;
pub use engine::{ClientConfig, ClientSimulation, ReconcileOutcome};

#[cfg(test)]
mod tests;
