//! One-shot event detection from monotonic per-entity counters.
//!
//! An event fires once when a counter advances past the last value seen for
//! that entity. Duplicate or repeated snapshots leave counters unchanged and
//! therefore fire nothing.

use hecs::World;

use crossfire_core::components::{NetState, SeenCounters};
use crossfire_core::events::GameEvent;

/// Compare each remote entity's counters with the last seen values.
pub fn run(world: &mut World, events: &mut Vec<GameEvent>) {
    let mut fired: Vec<(u32, GameEvent)> = Vec::new();

    for (_entity, (net, seen)) in world.query_mut::<(&NetState, &mut SeenCounters)>() {
        let state = &net.0;

        if state.footstep_seq > seen.footstep_seq {
            seen.footstep_seq = state.footstep_seq;
            fired.push((
                state.id,
                GameEvent::RemoteFootstep {
                    id: state.id,
                    team: state.team,
                    position: state.position,
                },
            ));
        }

        if state.shot_seq > seen.shot_seq {
            seen.shot_seq = state.shot_seq;
            fired.push((
                state.id,
                GameEvent::RemoteShot {
                    id: state.id,
                    team: state.team,
                    position: state.position,
                    yaw: state.yaw,
                    pitch: state.pitch,
                },
            ));
        }
    }

    // Stable order independent of archetype layout.
    fired.sort_by_key(|(id, _)| *id);
    events.extend(fired.into_iter().map(|(_, event)| event));
}
