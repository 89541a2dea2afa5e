//! Static map data: the collider list and spawn points.
//!
//! Loaded once per session and never mutated during simulation.

use std::fs;
use std::path::{Path, PathBuf};

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::AxisAlignedBox;

/// Errors raised while loading or validating a map.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse map data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("collider {index} is invalid: {reason}")]
    InvalidCollider { index: usize, reason: &'static str },
    #[error("spawn point {index} is not finite")]
    InvalidSpawn { index: usize },
    #[error("map has no spawn points")]
    NoSpawns,
}

/// Collision world and spawn layout of one map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub name: String,
    pub colliders: Vec<AxisAlignedBox>,
    pub spawns: Vec<DVec3>,
}

impl MapData {
    /// Parse and validate a map from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, MapError> {
        let map: MapData = serde_json::from_str(json)?;
        map.validate()?;
        Ok(map)
    }

    /// Read, parse and validate a map file.
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let json = fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, MapError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every collider satisfies `min <= max` with finite coordinates,
    /// and that at least one finite spawn exists.
    pub fn validate(&self) -> Result<(), MapError> {
        for (index, collider) in self.colliders.iter().enumerate() {
            if !collider.min.is_finite() || !collider.max.is_finite() {
                return Err(MapError::InvalidCollider {
                    index,
                    reason: "non-finite coordinate",
                });
            }
            if !collider.min.cmple(collider.max).all() {
                return Err(MapError::InvalidCollider {
                    index,
                    reason: "min exceeds max",
                });
            }
        }
        if self.spawns.is_empty() {
            return Err(MapError::NoSpawns);
        }
        if let Some(index) = self.spawns.iter().position(|s| !s.is_finite()) {
            return Err(MapError::InvalidSpawn { index });
        }
        Ok(())
    }

    /// Spawn point for the `n`th player, cycling through the list.
    pub fn spawn_for(&self, n: usize) -> DVec3 {
        if self.spawns.is_empty() {
            DVec3::ZERO
        } else {
            self.spawns[n % self.spawns.len()]
        }
    }
}
