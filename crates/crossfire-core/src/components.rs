//! ECS components for the client's hecs world of remote entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::state::EntityState;

/// Authority-assigned entity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetId(pub u32);

/// Latest authoritative state of a remote entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NetState(pub EntityState);

/// Smoothed position used only for presentation.
/// Never read by collision or hit-scan.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RenderPosition(pub DVec3);

/// Last observed one-shot counters, so each advance fires exactly once.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SeenCounters {
    pub footstep_seq: u32,
    pub shot_seq: u32,
}
