//! Client simulation engine: prediction and reconciliation.
//!
//! `ClientSimulation` owns the locally controlled pose, the pending-input
//! buffer and a hecs world of remote entities. Every frame it turns one input
//! sample into a sequenced command and predicts it immediately. When an
//! authoritative snapshot arrives it rewinds the local pose to the server
//! state and replays every still-unacknowledged command through the same
//! integrator. Completely headless (no transport), enabling deterministic
//! testing.

use std::collections::HashMap;

use glam::DVec3;
use hecs::World;
use tracing::{debug, info, warn};

use crossfire_core::commands::{InputCommand, InputSample};
use crossfire_core::components::{NetState, RenderPosition};
use crossfire_core::constants::{DT, PENDING_INPUT_CAPACITY, REMOTE_INTERPOLATION_RATE};
use crossfire_core::enums::{PredictionState, Team};
use crossfire_core::events::GameEvent;
use crossfire_core::state::{
    AuthoritativeSnapshot, DebugView, EntityState, ScoreView, SnapshotError,
};
use crossfire_core::types::{AxisAlignedBox, Pose, SimTime};

use crate::ballistics::{bullet_direction, eye_position};
use crate::input_buffer::InputBuffer;
use crate::movement::{simulate_move, StrideCounter};
use crate::systems;
use crate::systems::snapshot::LocalStatus;
use crate::weapon::WeaponState;

/// Configuration for a client session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Authority-assigned id of the locally controlled entity.
    pub local_entity_id: u32,
    /// Maximum unacknowledged commands kept for replay.
    pub pending_capacity: usize,
    /// Exponential smoothing rate for remote entities (1/s).
    pub interpolation_rate: f64,
    /// Seconds simulated per command.
    pub dt: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            local_entity_id: 0,
            pending_capacity: PENDING_INPUT_CAPACITY,
            interpolation_rate: REMOTE_INTERPOLATION_RATE,
            dt: DT,
        }
    }
}

/// What `apply_snapshot` did with a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Local pose overwritten and pending commands replayed.
    Applied { acknowledged: usize, replayed: usize },
    /// The snapshot carried no entry for the local entity; it is now unassigned.
    LocalMissing { acknowledged: usize },
    /// Not newer than the last applied snapshot; ignored.
    Stale { server_tick: u64, last_server_tick: u64 },
    /// Failed validation; ignored.
    Rejected(SnapshotError),
}

/// The client simulation. Owns the local prediction and the remote-entity world.
pub struct ClientSimulation {
    config: ClientConfig,
    colliders: Vec<AxisAlignedBox>,
    time: SimTime,
    state: PredictionState,
    pose: Option<Pose>,
    team: Team,
    weapon: WeaponState,
    stride: StrideCounter,
    pending: InputBuffer,
    /// Sequences are u32. Once `u32::MAX` has been issued the counter stays
    /// there, and the authority drops every later command as stale. At 60 Hz
    /// that takes over two years of one continuous session.
    next_sequence: u32,
    sequence_exhausted: bool,
    last_acknowledged: u32,
    last_server_tick: Option<u64>,
    scores: ScoreView,
    world: World,
    entity_index: HashMap<u32, hecs::Entity>,
    despawn_buffer: Vec<hecs::Entity>,
    events: Vec<GameEvent>,
}

impl ClientSimulation {
    /// Create a client for a map's static colliders.
    pub fn new(colliders: Vec<AxisAlignedBox>, config: ClientConfig) -> Self {
        info!(
            local_entity_id = config.local_entity_id,
            colliders = colliders.len(),
            pending_capacity = config.pending_capacity,
            "client simulation created"
        );
        Self {
            pending: InputBuffer::new(config.pending_capacity),
            config,
            colliders,
            time: SimTime::default(),
            state: PredictionState::default(),
            pose: None,
            team: Team::default(),
            weapon: WeaponState::default(),
            stride: StrideCounter::default(),
            next_sequence: 1,
            sequence_exhausted: false,
            last_acknowledged: 0,
            last_server_tick: None,
            scores: ScoreView::default(),
            world: World::new(),
            entity_index: HashMap::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Sample one frame of input: sequence it, buffer it, predict it, and
    /// return the command for transmission.
    ///
    /// While unassigned the command is only buffered. Its movement and weapon
    /// effects appear at the first reconcile that replays it, without local
    /// events.
    pub fn predict(&mut self, sample: &InputSample) -> InputCommand {
        if InputCommand::sample_needed_sanitizing(sample) {
            debug!(tick = self.time.tick, "input sample clamped at boundary");
        }
        let command = InputCommand::from_sample(self.next_sequence, self.time.tick, sample);
        match self.next_sequence.checked_add(1) {
            Some(next) => self.next_sequence = next,
            None if !self.sequence_exhausted => {
                self.sequence_exhausted = true;
                warn!(
                    sequence = command.sequence,
                    "input sequence space exhausted, later commands will be dropped as stale"
                );
            }
            None => {}
        }

        self.predict_command(&command);
        self.pending.push(command);

        if self.pose.is_some() {
            self.state = PredictionState::UnconfirmedLocal;
        }
        self.time.advance(self.config.dt);
        command
    }

    /// Apply one command to the local pose, emitting local events.
    fn predict_command(&mut self, command: &InputCommand) {
        let dt = self.config.dt;
        let Some(pose) = self.pose.as_mut() else {
            return;
        };
        if !pose.alive {
            pose.set_view(command.yaw, command.pitch);
            return;
        }

        let report = simulate_move(pose, command, &self.colliders, dt);
        if self.stride.advance(&report, command.walk) {
            self.events.push(GameEvent::LocalFootstep {
                position: pose.position,
            });
        }

        let step = self.weapon.step(command.fire, command.reload, dt);
        pose.ammo = self.weapon.ammo;
        if step.reload_started {
            self.events.push(GameEvent::LocalReload {
                sequence: command.sequence,
            });
        }
        let Some(shot) = step.shot else {
            return;
        };
        let direction = bullet_direction(pose.yaw, pose.pitch, shot.spray_index, pose.velocity);
        self.events.push(GameEvent::LocalShot {
            sequence: command.sequence,
            origin: eye_position(pose),
            direction,
            spray_index: shot.spray_index,
        });
    }

    /// Reconcile against an authoritative snapshot.
    ///
    /// The local pose is overwritten from the snapshot, acknowledged commands
    /// are discarded, and the remaining ones are replayed in sequence order.
    /// Remote entities are mirrored into the world and one-shot events detected.
    pub fn apply_snapshot(&mut self, snapshot: &AuthoritativeSnapshot) -> ReconcileOutcome {
        if let Err(err) = snapshot.validate() {
            warn!(server_tick = snapshot.server_tick, %err, "snapshot rejected");
            return ReconcileOutcome::Rejected(err);
        }
        if let Some(last) = self.last_server_tick {
            if snapshot.server_tick <= last {
                debug!(
                    server_tick = snapshot.server_tick,
                    last_server_tick = last,
                    "stale snapshot ignored"
                );
                return ReconcileOutcome::Stale {
                    server_tick: snapshot.server_tick,
                    last_server_tick: last,
                };
            }
        }
        self.last_server_tick = Some(snapshot.server_tick);
        self.scores = snapshot.scores;

        let acknowledged = self.pending.acknowledge(snapshot.last_processed_sequence);
        self.last_acknowledged = self.last_acknowledged.max(snapshot.last_processed_sequence);

        let outcome = match snapshot.entity(self.config.local_entity_id) {
            Some(local) => {
                let replayed = self.rewind_and_replay(local);
                self.state = PredictionState::Reconciled;
                ReconcileOutcome::Applied {
                    acknowledged,
                    replayed,
                }
            }
            None => {
                if self.pose.is_some() {
                    debug!(
                        local_entity_id = self.config.local_entity_id,
                        "local entity missing from snapshot, unassigning"
                    );
                }
                self.pose = None;
                self.state = PredictionState::Unassigned;
                ReconcileOutcome::LocalMissing { acknowledged }
            }
        };

        systems::net_sync::run(
            &mut self.world,
            &mut self.entity_index,
            snapshot,
            self.config.local_entity_id,
            &mut self.despawn_buffer,
        );
        systems::events::run(&mut self.world, &mut self.events);

        debug!(
            server_tick = snapshot.server_tick,
            last_processed_sequence = snapshot.last_processed_sequence,
            acknowledged,
            pending = self.pending.len(),
            ?outcome,
            "snapshot applied"
        );
        outcome
    }

    /// Overwrite the local pose and weapon from `local` and replay pending
    /// commands through both. Returns the number of commands replayed.
    fn rewind_and_replay(&mut self, local: &EntityState) -> usize {
        let dt = self.config.dt;
        let mut pose = local.pose();
        let mut weapon = WeaponState::from_entity(local);
        self.team = local.team;

        let mut replayed = 0;
        if pose.alive {
            for command in self.pending.iter() {
                simulate_move(&mut pose, command, &self.colliders, dt);
                weapon.step(command.fire, command.reload, dt);
                replayed += 1;
            }
        } else {
            self.stride.reset();
        }

        pose.ammo = weapon.ammo;
        self.weapon = weapon;
        self.pose = Some(pose);
        replayed
    }

    /// Presentation step: smooth remote entities toward their server positions.
    /// Never affects collision, prediction or hit-scan.
    pub fn frame(&mut self, dt: f64) {
        let alpha = systems::interpolation::smoothing_alpha(self.config.interpolation_rate, dt);
        systems::interpolation::run(&mut self.world, alpha);
    }

    /// Take all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only view of the whole client state.
    pub fn debug_view(&self) -> DebugView {
        let local = LocalStatus {
            entity_id: self.config.local_entity_id,
            state: self.state,
            pose: self.pose.as_ref(),
            weapon: &self.weapon,
            pending_inputs: self.pending.len(),
            last_acknowledged_sequence: self.last_acknowledged,
        };
        systems::snapshot::build_debug_view(
            &self.world,
            &self.time,
            self.last_server_tick.unwrap_or(0),
            &local,
            self.scores,
        )
    }

    /// Debug view serialized as JSON, for automated smoke tests.
    pub fn render_game_to_text(&self) -> String {
        serde_json::to_string(&self.debug_view()).unwrap_or_else(|err| {
            warn!(%err, "debug view serialization failed");
            String::from("{}")
        })
    }

    /// Predicted local pose, if assigned.
    pub fn pose(&self) -> Option<&Pose> {
        self.pose.as_ref()
    }

    pub fn state(&self) -> PredictionState {
        self.state
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn weapon(&self) -> &WeaponState {
        &self.weapon
    }

    pub fn pending(&self) -> &InputBuffer {
        &self.pending
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Sequence the next predicted command will carry.
    pub fn next_sequence(&self) -> u32 {
        self.next_sequence
    }

    pub fn last_acknowledged(&self) -> u32 {
        self.last_acknowledged
    }

    pub fn last_server_tick(&self) -> Option<u64> {
        self.last_server_tick
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn colliders(&self) -> &[AxisAlignedBox] {
        &self.colliders
    }

    /// Get a read-only reference to the remote-entity world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Smoothed presentation position of remote entity `id`.
    pub fn remote_render_position(&self, id: u32) -> Option<DVec3> {
        let entity = *self.entity_index.get(&id)?;
        self.world
            .get::<&RenderPosition>(entity)
            .ok()
            .map(|render| render.0)
    }

    /// Latest authoritative state of remote entity `id`.
    pub fn remote_state(&self, id: u32) -> Option<EntityState> {
        let entity = *self.entity_index.get(&id)?;
        self.world.get::<&NetState>(entity).ok().map(|net| net.0)
    }

    pub fn remote_count(&self) -> usize {
        self.entity_index.len()
    }
}
