//! Input commands produced once per tick by the local player.
//!
//! Device polling produces an `InputSample`; the sample is sanitized into an
//! immutable, sequenced `InputCommand` at the simulation boundary. The
//! integrator never sees non-finite or out-of-range values.

use serde::{Deserialize, Serialize};

use crate::constants::PITCH_LIMIT;

/// Raw per-tick input as sampled from a device or agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSample {
    /// Strafe axis, positive to the right.
    pub move_x: f64,
    /// Forward axis, positive forward.
    pub move_y: f64,
    /// Absolute view yaw (radians).
    pub yaw: f64,
    /// Absolute view pitch (radians).
    pub pitch: f64,
    pub fire: bool,
    pub walk: bool,
    pub reload: bool,
}

/// A sanitized, sequenced input for one simulation tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputCommand {
    /// Monotonically increasing per local entity, never reused.
    pub sequence: u32,
    /// Tick index at which the command was sampled.
    pub tick: u64,
    pub move_x: f64,
    pub move_y: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub fire: bool,
    pub walk: bool,
    #[serde(default)]
    pub reload: bool,
}

impl InputCommand {
    /// Build a command from a raw sample, clamping ranges and zeroing
    /// non-finite values.
    pub fn from_sample(sequence: u32, tick: u64, sample: &InputSample) -> Self {
        Self {
            sequence,
            tick,
            move_x: finite_or_zero(sample.move_x).clamp(-1.0, 1.0),
            move_y: finite_or_zero(sample.move_y).clamp(-1.0, 1.0),
            yaw: finite_or_zero(sample.yaw),
            pitch: finite_or_zero(sample.pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT),
            fire: sample.fire,
            walk: sample.walk,
            reload: sample.reload,
        }
    }

    /// Whether any field had to be altered to make `sample` valid.
    pub fn sample_needed_sanitizing(sample: &InputSample) -> bool {
        let fields = [sample.move_x, sample.move_y, sample.yaw, sample.pitch];
        fields.iter().any(|v| !v.is_finite())
            || sample.move_x.abs() > 1.0
            || sample.move_y.abs() > 1.0
            || sample.pitch.abs() > PITCH_LIMIT
    }

    /// Whether the command requests any horizontal movement.
    pub fn has_movement(&self) -> bool {
        self.move_x != 0.0 || self.move_y != 0.0
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
