//! One-shot events emitted by the client simulation for audio and effects.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::Team;

/// Events drained by presentation collaborators once per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// The local player fired a predicted shot.
    LocalShot {
        sequence: u32,
        origin: DVec3,
        direction: DVec3,
        spray_index: u32,
    },
    /// The local player completed a running stride.
    LocalFootstep { position: DVec3 },
    /// The local player started reloading.
    LocalReload { sequence: u32 },
    /// A remote entity's footstep counter advanced.
    RemoteFootstep { id: u32, team: Team, position: DVec3 },
    /// A remote entity's shot counter advanced.
    RemoteShot {
        id: u32,
        team: Team,
        position: DVec3,
        yaw: f64,
        pitch: f64,
    },
}
