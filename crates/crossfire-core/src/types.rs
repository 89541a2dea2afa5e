//! Fundamental geometric and simulation types.
//!
//! World axes: x = right-hand lateral, y = Up, z = forward at yaw 0.
//! Positions are feet positions in meters.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::{MAGAZINE_SIZE, PITCH_LIMIT, PLAYER_MAX_HP};
use crate::enums::SurfaceKind;

/// Axis-aligned box with `min <= max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisAlignedBox {
    pub min: DVec3,
    pub max: DVec3,
    #[serde(default)]
    pub surface: SurfaceKind,
}

impl AxisAlignedBox {
    /// Build a box from two opposite corners in any order.
    pub fn new(a: DVec3, b: DVec3, surface: SurfaceKind) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
            surface,
        }
    }

    /// Build a box from its center and half extents.
    pub fn from_center(center: DVec3, half_extents: DVec3, surface: SurfaceKind) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
            surface,
        }
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Whether `min <= max` holds on every axis and every coordinate is finite.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
    }
}

/// Mutable per-entity state advanced every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: DVec3,
    pub velocity: DVec3,
    /// Radians, 0 faces +Z.
    pub yaw: f64,
    /// Radians, positive looks up, clamped to ±PITCH_LIMIT.
    pub pitch: f64,
    pub hp: u32,
    pub ammo: u32,
    pub alive: bool,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            hp: PLAYER_MAX_HP,
            ammo: MAGAZINE_SIZE,
            alive: true,
        }
    }
}

impl Pose {
    /// A living pose standing still at `position`.
    pub fn spawned_at(position: DVec3, yaw: f64) -> Self {
        Self {
            position,
            yaw,
            ..Default::default()
        }
    }

    /// Horizontal speed (ignoring vertical component).
    pub fn horizontal_speed(&self) -> f64 {
        (self.velocity.x * self.velocity.x + self.velocity.z * self.velocity.z).sqrt()
    }

    /// Set the view angles, clamping pitch.
    pub fn set_view(&mut self, yaw: f64, pitch: f64) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }
}

/// One entry of the recoil pattern, cumulative offsets in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoilStep {
    pub yaw_deg: f64,
    pub pitch_deg: f64,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}
