//! Core types and definitions for the CROSSFIRE movement and prediction core.
//!
//! This crate defines the vocabulary shared by the simulation, the reference
//! authority and the tools: constants, geometry, input commands, snapshots,
//! events, ECS components and map data. It has no dependency on any runtime
//! framework or transport.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod events;
pub mod map;
pub mod state;
pub mod types;
