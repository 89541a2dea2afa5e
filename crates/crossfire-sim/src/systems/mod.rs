//! ECS systems that operate on the client's world of remote entities.
//!
//! Systems are pure functions that take `&mut World` (or `&World` for read-only).
//! They own no state; everything lives in components.

pub mod events;
pub mod interpolation;
pub mod net_sync;
pub mod snapshot;
