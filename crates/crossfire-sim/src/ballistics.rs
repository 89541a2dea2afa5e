//! Recoil and movement-inaccuracy model producing hit-scan directions.
//!
//! Deterministic by construction: no random numbers are consumed, so client
//! and authority derive bit-identical shot directions from identical inputs.

use glam::DVec3;

use crossfire_core::constants::{
    MOVE_INACCURACY_FORWARD_DEG, MOVE_INACCURACY_LATERAL_DEG, PITCH_LIMIT, PLAYER_EYE_HEIGHT,
    PLAYER_MAX_SPEED, RECOIL_PATTERN,
};
use crossfire_core::types::{Pose, RecoilStep};

use crate::movement::{forward_vector, right_vector};

/// Cumulative recoil for `spray_index`, holding at the last entry past the end.
pub fn recoil_offset(spray_index: u32) -> RecoilStep {
    let index = (spray_index as usize).min(RECOIL_PATTERN.len() - 1);
    let (yaw_deg, pitch_deg) = RECOIL_PATTERN[index];
    RecoilStep { yaw_deg, pitch_deg }
}

/// Movement inaccuracy in degrees as (yaw, pitch) for a shooter moving at `velocity`.
pub fn movement_offset(yaw: f64, velocity: DVec3) -> RecoilStep {
    let horizontal = DVec3::new(velocity.x, 0.0, velocity.z);
    let speed_fraction = (horizontal.length() / PLAYER_MAX_SPEED).min(1.0);
    let lateral = horizontal.dot(right_vector(yaw)) / PLAYER_MAX_SPEED;
    let forward = horizontal.dot(forward_vector(yaw)) / PLAYER_MAX_SPEED;
    RecoilStep {
        yaw_deg: lateral * MOVE_INACCURACY_LATERAL_DEG * speed_fraction,
        pitch_deg: forward * MOVE_INACCURACY_FORWARD_DEG * speed_fraction,
    }
}

#[inline]
pub fn clamp_pitch(pitch: f64) -> f64 {
    pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT)
}

/// Unit view direction for a yaw/pitch pair, matching the movement yaw convention.
#[inline]
pub fn view_direction(yaw: f64, pitch: f64) -> DVec3 {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    DVec3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch)
}

/// Final shot direction after recoil and movement inaccuracy.
pub fn bullet_direction(yaw: f64, pitch: f64, spray_index: u32, velocity: DVec3) -> DVec3 {
    let recoil = recoil_offset(spray_index);
    let moving = movement_offset(yaw, velocity);
    let final_yaw = yaw + (recoil.yaw_deg + moving.yaw_deg).to_radians();
    let final_pitch = clamp_pitch(pitch + (recoil.pitch_deg + moving.pitch_deg).to_radians());
    view_direction(final_yaw, final_pitch)
}

/// Origin of hit-scan rays for a pose.
#[inline]
pub fn eye_position(pose: &Pose) -> DVec3 {
    pose.position + DVec3::new(0.0, PLAYER_EYE_HEIGHT, 0.0)
}
