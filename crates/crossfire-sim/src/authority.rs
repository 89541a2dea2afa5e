//! Reference authoritative simulation.
//!
//! Applies each client's sequenced commands through the same integrator and
//! weapon model the client predicts with, and produces the snapshots clients
//! reconcile against. The network transport between the two is external.

use std::collections::BTreeMap;

use glam::DVec3;
use tracing::{debug, info};

use crossfire_core::commands::InputCommand;
use crossfire_core::constants::DT;
use crossfire_core::enums::Team;
use crossfire_core::map::MapData;
use crossfire_core::state::{AuthoritativeSnapshot, EntityState, ScoreView};
use crossfire_core::types::{Pose, SimTime};

use crate::movement::{simulate_move, StrideCounter};
use crate::weapon::WeaponState;

/// Configuration for the authority.
#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    /// Seconds simulated per applied command.
    pub dt: f64,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self { dt: DT }
    }
}

/// Authority-side record of one player.
#[derive(Debug, Clone)]
pub struct ServerPlayer {
    pub id: u32,
    pub team: Team,
    pub pose: Pose,
    pub weapon: WeaponState,
    pub last_processed_sequence: u32,
    pub footstep_seq: u32,
    /// Spawn point assigned at join, reused on every respawn.
    pub spawn_index: usize,
    stride: StrideCounter,
}

impl ServerPlayer {
    fn state(&self) -> EntityState {
        EntityState {
            id: self.id,
            team: self.team,
            position: self.pose.position,
            velocity: self.pose.velocity,
            yaw: self.pose.yaw,
            pitch: self.pose.pitch,
            hp: self.pose.hp,
            ammo: self.weapon.ammo,
            alive: self.pose.alive,
            footstep_seq: self.footstep_seq,
            shot_seq: self.weapon.shots_fired,
            fire_cooldown: self.weapon.cooldown,
            reload_remaining: self.weapon.reload_remaining,
            spray_index: self.weapon.spray_index,
        }
    }
}

/// Outcome of handing one command to the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Applied,
    /// Sequence at or below the last processed one.
    Stale,
    /// No player with that id.
    UnknownPlayer,
}

pub struct AuthoritySimulation {
    config: AuthorityConfig,
    map: MapData,
    players: BTreeMap<u32, ServerPlayer>,
    time: SimTime,
    scores: ScoreView,
}

impl AuthoritySimulation {
    pub fn new(map: MapData, config: AuthorityConfig) -> Self {
        Self {
            config,
            map,
            players: BTreeMap::new(),
            time: SimTime::default(),
            scores: ScoreView::default(),
        }
    }

    /// Add a player at the next spawn point. Returns its id.
    pub fn join(&mut self, id: u32, team: Team) -> u32 {
        let spawn_index = self.players.len();
        let spawn = self.map.spawn_for(spawn_index);
        info!(id, ?team, spawn_index, x = spawn.x, z = spawn.z, "player joined");
        self.players.insert(
            id,
            ServerPlayer {
                id,
                team,
                pose: Pose::spawned_at(spawn, 0.0),
                weapon: WeaponState::default(),
                last_processed_sequence: 0,
                footstep_seq: 0,
                spawn_index,
                stride: StrideCounter::default(),
            },
        );
        id
    }

    /// Apply one received command for player `id`.
    pub fn apply_input(&mut self, id: u32, command: &InputCommand) -> InputOutcome {
        let Some(player) = self.players.get_mut(&id) else {
            debug!(id, sequence = command.sequence, "input for unknown player");
            return InputOutcome::UnknownPlayer;
        };
        if command.sequence <= player.last_processed_sequence {
            debug!(
                id,
                sequence = command.sequence,
                last = player.last_processed_sequence,
                "stale input ignored"
            );
            return InputOutcome::Stale;
        }
        player.last_processed_sequence = command.sequence;

        if !player.pose.alive {
            player.pose.set_view(command.yaw, command.pitch);
            return InputOutcome::Applied;
        }

        let report = simulate_move(
            &mut player.pose,
            command,
            &self.map.colliders,
            self.config.dt,
        );
        if player.stride.advance(&report, command.walk) {
            player.footstep_seq = player.footstep_seq.wrapping_add(1);
        }
        player
            .weapon
            .step(command.fire, command.reload, self.config.dt);
        player.pose.ammo = player.weapon.ammo;
        InputOutcome::Applied
    }

    /// Advance the server clock by one tick.
    pub fn advance_tick(&mut self) {
        self.time.advance(self.config.dt);
    }

    /// Snapshot addressed to the client controlling `client_id`.
    pub fn snapshot_for(&self, client_id: u32) -> AuthoritativeSnapshot {
        AuthoritativeSnapshot {
            server_tick: self.time.tick,
            last_processed_sequence: self
                .players
                .get(&client_id)
                .map_or(0, |p| p.last_processed_sequence),
            entities: self.players.values().map(ServerPlayer::state).collect(),
            scores: self.scores,
        }
    }

    /// Mark a player dead; its commands are acknowledged but not integrated.
    pub fn kill(&mut self, id: u32) {
        if let Some(player) = self.players.get_mut(&id) {
            player.pose.alive = false;
            player.pose.hp = 0;
            player.pose.velocity = DVec3::ZERO;
            player.stride.reset();
        }
    }

    /// Bring a player back at the spawn it joined at, with full health and magazine.
    pub fn respawn(&mut self, id: u32) {
        if let Some(player) = self.players.get_mut(&id) {
            let yaw = player.pose.yaw;
            player.pose = Pose::spawned_at(self.map.spawn_for(player.spawn_index), yaw);
            // Fresh magazine and timers; the shot counter stays monotonic.
            player.weapon = WeaponState {
                shots_fired: player.weapon.shots_fired,
                ..Default::default()
            };
            player.stride.reset();
        }
    }

    /// Record a round win.
    pub fn award_round(&mut self, team: Team) {
        match team {
            Team::Attackers => self.scores.attackers += 1,
            Team::Defenders => self.scores.defenders += 1,
        }
    }

    /// Teleport a player (spawn correction, tests).
    pub fn set_position(&mut self, id: u32, position: DVec3) {
        if let Some(player) = self.players.get_mut(&id) {
            player.pose.position = position;
        }
    }

    pub fn player(&self, id: u32) -> Option<&ServerPlayer> {
        self.players.get(&id)
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn map(&self) -> &MapData {
        &self.map
    }
}
