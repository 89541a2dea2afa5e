//! Debug view system: builds the text-export view of the client state.
//!
//! Read-only: never modifies the world.

use hecs::World;

use crossfire_core::components::{NetState, RenderPosition};
use crossfire_core::enums::PredictionState;
use crossfire_core::state::{DebugView, EntityView, PlayerView, ScoreView};
use crossfire_core::types::{Pose, SimTime};

use crate::weapon::WeaponState;

/// Local-player inputs to the debug view.
pub struct LocalStatus<'a> {
    pub entity_id: u32,
    pub state: PredictionState,
    pub pose: Option<&'a Pose>,
    pub weapon: &'a WeaponState,
    pub pending_inputs: usize,
    pub last_acknowledged_sequence: u32,
}

/// Build a complete DebugView from the current client state.
pub fn build_debug_view(
    world: &World,
    time: &SimTime,
    server_tick: u64,
    local: &LocalStatus<'_>,
    scores: ScoreView,
) -> DebugView {
    DebugView {
        tick: time.tick,
        server_tick,
        state: local.state,
        local_entity_id: local.entity_id,
        player: local.pose.map(|pose| build_player(pose, local.weapon)),
        pending_inputs: local.pending_inputs,
        last_acknowledged_sequence: local.last_acknowledged_sequence,
        scores,
        entities: build_entities(world),
    }
}

fn build_player(pose: &Pose, weapon: &WeaponState) -> PlayerView {
    PlayerView {
        position: pose.position.to_array(),
        velocity: pose.velocity.to_array(),
        speed: pose.horizontal_speed(),
        yaw: pose.yaw,
        pitch: pose.pitch,
        hp: pose.hp,
        ammo: pose.ammo,
        alive: pose.alive,
        reloading: weapon.is_reloading(),
        spray_index: weapon.spray_index,
    }
}

/// Build EntityView list from every remote entity.
fn build_entities(world: &World) -> Vec<EntityView> {
    let mut entities: Vec<EntityView> = world
        .query::<(&NetState, &RenderPosition)>()
        .iter()
        .map(|(_, (net, render))| EntityView {
            id: net.0.id,
            team: net.0.team,
            position: render.0.to_array(),
            server_position: net.0.position.to_array(),
            yaw: net.0.yaw,
            hp: net.0.hp,
            alive: net.0.alive,
        })
        .collect();

    entities.sort_by_key(|e| e.id);
    entities
}
