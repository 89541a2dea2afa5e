//! Authoritative snapshots received from the server, and the read-only
//! debug view exported for smoke testing.

use std::collections::HashSet;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::{PredictionState, Team};
use crate::types::Pose;

/// State of one entity as simulated by the authority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub id: u32,
    pub team: Team,
    pub position: DVec3,
    pub velocity: DVec3,
    pub yaw: f64,
    pub pitch: f64,
    pub hp: u32,
    pub ammo: u32,
    pub alive: bool,
    /// Incremented once per footstep the authority emitted.
    pub footstep_seq: u32,
    /// Incremented once per shot the authority accepted.
    pub shot_seq: u32,
    /// Seconds until the weapon accepts its next shot.
    #[serde(default)]
    pub fire_cooldown: f64,
    /// Seconds left in the current reload, 0 when not reloading.
    #[serde(default)]
    pub reload_remaining: f64,
    /// Recoil pattern position of the next shot.
    #[serde(default)]
    pub spray_index: u32,
}

impl EntityState {
    /// The pose portion of this state.
    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            velocity: self.velocity,
            yaw: self.yaw,
            pitch: self.pitch,
            hp: self.hp,
            ammo: self.ammo,
            alive: self.alive,
        }
    }

    fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.yaw.is_finite()
            && self.pitch.is_finite()
            && self.fire_cooldown.is_finite()
            && self.reload_remaining.is_finite()
    }
}

/// Round wins per team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreView {
    pub attackers: u32,
    pub defenders: u32,
}

/// Periodic authoritative broadcast of every entity's simulated state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthoritativeSnapshot {
    pub server_tick: u64,
    /// Highest input sequence of the receiving client the authority has applied.
    pub last_processed_sequence: u32,
    pub entities: Vec<EntityState>,
    #[serde(default)]
    pub scores: ScoreView,
}

/// Reasons a snapshot is refused at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("entity {id} carries a non-finite value")]
    NonFinite { id: u32 },
    #[error("entity {id} appears more than once")]
    DuplicateEntity { id: u32 },
}

impl AuthoritativeSnapshot {
    /// Entry for entity `id`, if present.
    pub fn entity(&self, id: u32) -> Option<&EntityState> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Check every entry is finite and ids are unique.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::with_capacity(self.entities.len());
        for entity in &self.entities {
            if !entity.is_finite() {
                return Err(SnapshotError::NonFinite { id: entity.id });
            }
            if !seen.insert(entity.id) {
                return Err(SnapshotError::DuplicateEntity { id: entity.id });
            }
        }
        Ok(())
    }
}

/// Text-export view of the whole client state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebugView {
    pub tick: u64,
    pub server_tick: u64,
    pub state: PredictionState,
    pub local_entity_id: u32,
    pub player: Option<PlayerView>,
    pub pending_inputs: usize,
    pub last_acknowledged_sequence: u32,
    pub scores: ScoreView,
    pub entities: Vec<EntityView>,
}

/// Predicted local player for the text export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub speed: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub hp: u32,
    pub ammo: u32,
    pub alive: bool,
    pub reloading: bool,
    pub spray_index: u32,
}

/// Remote entity for the text export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityView {
    pub id: u32,
    pub team: Team,
    /// Smoothed presentation position.
    pub position: [f64; 3],
    /// Latest authoritative position.
    pub server_position: [f64; 3],
    pub yaw: f64,
    pub hp: u32,
    pub alive: bool,
}
