//! Weapon timing: fire cadence, magazine, reload and spray counting.

use serde::{Deserialize, Serialize};

use crossfire_core::constants::{FIRE_INTERVAL_SECS, MAGAZINE_SIZE, RELOAD_TIME_SECS};
use crossfire_core::state::EntityState;

/// A shot accepted by `WeaponState::step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotFired {
    /// Spray index used for this shot's recoil.
    pub spray_index: u32,
    /// Value of the monotonic shot counter after this shot.
    pub shot_seq: u32,
}

/// Result of one weapon step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeaponStep {
    pub shot: Option<ShotFired>,
    pub reload_started: bool,
    /// A reload completed this step and the magazine is full again.
    pub reload_finished: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponState {
    pub ammo: u32,
    /// Seconds until the next shot may be accepted.
    pub cooldown: f64,
    /// Seconds left in the current reload, 0 when not reloading.
    pub reload_remaining: f64,
    /// Shots fired since the trigger was last released or the magazine refilled.
    pub spray_index: u32,
    /// Monotonic count of every accepted shot.
    pub shots_fired: u32,
}

impl Default for WeaponState {
    fn default() -> Self {
        Self {
            ammo: MAGAZINE_SIZE,
            cooldown: 0.0,
            reload_remaining: 0.0,
            spray_index: 0,
            shots_fired: 0,
        }
    }
}

impl WeaponState {
    /// Weapon as the authority reported it for `state`.
    pub fn from_entity(state: &EntityState) -> Self {
        Self {
            ammo: state.ammo.min(MAGAZINE_SIZE),
            cooldown: state.fire_cooldown.max(0.0),
            reload_remaining: state.reload_remaining.max(0.0),
            spray_index: state.spray_index,
            shots_fired: state.shot_seq,
        }
    }

    pub fn is_reloading(&self) -> bool {
        self.reload_remaining > 0.0
    }

    /// Advance timers by `dt` and evaluate the trigger.
    pub fn step(&mut self, fire: bool, reload: bool, dt: f64) -> WeaponStep {
        let mut result = WeaponStep::default();

        self.cooldown = (self.cooldown - dt).max(0.0);

        if self.is_reloading() {
            self.reload_remaining = (self.reload_remaining - dt).max(0.0);
            if !self.is_reloading() {
                self.ammo = MAGAZINE_SIZE;
                self.spray_index = 0;
                result.reload_finished = true;
            }
            return result;
        }

        if !fire {
            self.spray_index = 0;
        }

        let wants_reload = reload || (fire && self.ammo == 0);
        if wants_reload && self.ammo < MAGAZINE_SIZE {
            self.reload_remaining = RELOAD_TIME_SECS;
            self.spray_index = 0;
            result.reload_started = true;
            return result;
        }

        if fire && self.cooldown <= 0.0 && self.ammo > 0 {
            let spray_index = self.spray_index;
            self.ammo -= 1;
            self.cooldown = FIRE_INTERVAL_SECS;
            self.spray_index = self.spray_index.saturating_add(1);
            self.shots_fired = self.shots_fired.wrapping_add(1);
            result.shot = Some(ShotFired {
                spray_index,
                shot_seq: self.shots_fired,
            });
        }

        result
    }
}
