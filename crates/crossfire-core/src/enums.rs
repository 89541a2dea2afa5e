//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Material tag carried by static colliders. Only presentation collaborators
/// (impact decals, footstep sounds) read it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    #[default]
    Stone,
    Metal,
    Sand,
    Wood,
    Concrete,
    Dirt,
    Glass,
    Tile,
}

/// Team affiliation reported by the authority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    #[default]
    Attackers,
    Defenders,
}

/// Prediction state of the locally controlled entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionState {
    /// No snapshot has carried the local entity yet (or the last one omitted it).
    #[default]
    Unassigned,
    /// Local pose has been advanced by prediction since the last snapshot.
    UnconfirmedLocal,
    /// Local pose was just overwritten from a snapshot and replayed.
    Reconciled,
}
