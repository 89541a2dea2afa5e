//! Per-tick movement integrator.
//!
//! Converts one input command plus the current velocity into a new position
//! and velocity against the static collider set. Client prediction, replay
//! and the authority all call `simulate_move`, so the function must stay
//! free of hidden state: identical inputs give bit-identical outputs.

use glam::DVec3;

use crossfire_core::commands::InputCommand;
use crossfire_core::constants::*;
use crossfire_core::types::{AxisAlignedBox, Pose};

use crate::collision::{intersects_strict, player_box};

/// What happened during one integration step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveReport {
    /// A collider stopped movement along X.
    pub blocked_x: bool,
    /// A collider stopped movement along Z.
    pub blocked_z: bool,
    /// Horizontal distance actually travelled (meters).
    pub distance: f64,
}

/// Accumulates running distance and reports a footstep every stride.
/// Walking is silent and does not accumulate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StrideCounter {
    travelled: f64,
}

impl StrideCounter {
    /// Feed one step's report. Returns true when a footstep lands.
    pub fn advance(&mut self, report: &MoveReport, walk: bool) -> bool {
        if walk || report.distance <= 0.0 {
            return false;
        }
        self.travelled += report.distance;
        if self.travelled >= FOOTSTEP_STRIDE {
            self.travelled -= FOOTSTEP_STRIDE;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.travelled = 0.0;
    }
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Z,
}

/// Unit forward vector on the ground plane. Yaw 0 faces +Z.
#[inline]
pub fn forward_vector(yaw: f64) -> DVec3 {
    DVec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Unit right vector on the ground plane (forward × up).
#[inline]
pub fn right_vector(yaw: f64) -> DVec3 {
    DVec3::new(-yaw.cos(), 0.0, yaw.sin())
}

/// Maximum horizontal speed for the given walk modifier.
#[inline]
pub fn max_speed(walk: bool) -> f64 {
    if walk {
        PLAYER_MAX_SPEED * WALK_SPEED_SCALE
    } else {
        PLAYER_MAX_SPEED
    }
}

/// Advance `pose` by one step of `dt` seconds under `command`.
///
/// The command's view angles are adopted first. Collisions are resolved per
/// axis, X then Z, against `colliders` in list order.
pub fn simulate_move(
    pose: &mut Pose,
    command: &InputCommand,
    colliders: &[AxisAlignedBox],
    dt: f64,
) -> MoveReport {
    pose.set_view(command.yaw, command.pitch);

    let move_x = command.move_x.clamp(-1.0, 1.0);
    let move_y = command.move_y.clamp(-1.0, 1.0);

    let forward = forward_vector(pose.yaw);
    let right = right_vector(pose.yaw);

    let mut wish = right * move_x + forward * move_y;
    let wish_len = wish.length();
    let has_wish = wish_len > WISH_EPSILON;
    if has_wish {
        wish /= wish_len;
    }

    let max_speed = max_speed(command.walk);
    let mut velocity = DVec3::new(pose.velocity.x, 0.0, pose.velocity.z);

    if has_wish {
        velocity = accelerate(velocity, wish * max_speed, dt);
    } else {
        velocity = apply_friction(velocity, dt);
    }

    let speed = velocity.length();
    if speed > max_speed {
        velocity *= max_speed / speed;
    }

    pose.velocity = velocity;

    let start = pose.position;
    let blocked_x = step_axis(pose, Axis::X, colliders, dt);
    let blocked_z = step_axis(pose, Axis::Z, colliders, dt);

    pose.position.y = GROUND_Y;
    pose.velocity.y = 0.0;

    let travelled = pose.position - start;
    MoveReport {
        blocked_x,
        blocked_z,
        distance: (travelled.x * travelled.x + travelled.z * travelled.z).sqrt(),
    }
}

/// Move `velocity` toward `desired`, capped at `rate * dt` per step.
/// Reversing against the current velocity uses the deceleration rate.
fn accelerate(velocity: DVec3, desired: DVec3, dt: f64) -> DVec3 {
    let rate = if velocity.dot(desired) < 0.0 {
        PLAYER_DECELERATION
    } else {
        PLAYER_ACCELERATION
    };
    let max_delta = rate * dt;
    let delta = desired - velocity;
    let delta_len = delta.length();
    if delta_len <= max_delta || delta_len == 0.0 {
        desired
    } else {
        velocity + delta * (max_delta / delta_len)
    }
}

/// Linear friction: lose `PLAYER_FRICTION * dt` of speed, stopping exactly at zero.
fn apply_friction(velocity: DVec3, dt: f64) -> DVec3 {
    let speed = velocity.length();
    let reduced = speed - PLAYER_FRICTION * dt;
    if reduced <= 0.0 {
        DVec3::ZERO
    } else {
        velocity * (reduced / speed)
    }
}

/// Apply one axis of velocity and push out of any collider now overlapped,
/// in list order. Returns whether a collider blocked the axis.
///
/// Colliders the body already overlapped before the move are ignored so an
/// entity placed inside geometry can walk out of it.
fn step_axis(pose: &mut Pose, axis: Axis, colliders: &[AxisAlignedBox], dt: f64) -> bool {
    let delta = match axis {
        Axis::X => pose.velocity.x * dt,
        Axis::Z => pose.velocity.z * dt,
    };
    if delta == 0.0 {
        return false;
    }

    let before = player_box(pose.position);
    let origin = axis_value(pose.position, axis);
    set_axis(&mut pose.position, axis, origin + delta);

    let mut blocked = false;
    for collider in colliders {
        if intersects_strict(&before, collider)
            || !intersects_strict(&player_box(pose.position), collider)
        {
            continue;
        }
        let corrected = if delta > 0.0 {
            axis_value(collider.min, axis) - PLAYER_HALF_WIDTH - COLLISION_SKIN
        } else {
            axis_value(collider.max, axis) + PLAYER_HALF_WIDTH + COLLISION_SKIN
        };
        set_axis(&mut pose.position, axis, corrected);
        set_axis(&mut pose.velocity, axis, 0.0);
        blocked = true;
    }
    blocked
}

#[inline]
fn axis_value(v: DVec3, axis: Axis) -> f64 {
    match axis {
        Axis::X => v.x,
        Axis::Z => v.z,
    }
}

#[inline]
fn set_axis(v: &mut DVec3, axis: Axis, value: f64) {
    match axis {
        Axis::X => v.x = value,
        Axis::Z => v.z = value,
    }
}
