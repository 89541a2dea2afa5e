//! Snapshot ingestion: mirrors the authoritative entity list into the world.
//!
//! A snapshot atomically replaces the authoritative view, so entities that
//! are absent from it are despawned. New entities start with their render
//! position at the server position and their event counters already seen.

use std::collections::{HashMap, HashSet};

use hecs::{Entity, World};
use tracing::trace;

use crossfire_core::components::{NetId, NetState, RenderPosition, SeenCounters};
use crossfire_core::state::AuthoritativeSnapshot;

/// Upsert every remote entity of `snapshot`, skipping `local_id`.
pub fn run(
    world: &mut World,
    index: &mut HashMap<u32, Entity>,
    snapshot: &AuthoritativeSnapshot,
    local_id: u32,
    despawn_buffer: &mut Vec<Entity>,
) {
    let mut present = HashSet::with_capacity(snapshot.entities.len());

    for state in snapshot.entities.iter().filter(|e| e.id != local_id) {
        present.insert(state.id);

        if let Some(&entity) = index.get(&state.id) {
            if world.insert_one(entity, NetState(*state)).is_ok() {
                continue;
            }
        }

        let entity = world.spawn((
            NetId(state.id),
            NetState(*state),
            RenderPosition(state.position),
            SeenCounters {
                footstep_seq: state.footstep_seq,
                shot_seq: state.shot_seq,
            },
        ));
        trace!(id = state.id, "remote entity spawned");
        index.insert(state.id, entity);
    }

    despawn_buffer.clear();
    for (entity, net_id) in world.query_mut::<&NetId>() {
        if !present.contains(&net_id.0) {
            despawn_buffer.push(entity);
        }
    }
    for entity in despawn_buffer.drain(..) {
        if let Ok(net_id) = world.get::<&NetId>(entity).map(|id| id.0) {
            index.remove(&net_id);
            trace!(id = net_id, "remote entity despawned");
        }
        let _ = world.despawn(entity);
    }
}
