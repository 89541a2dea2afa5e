//! Tests for the movement integrator, client prediction, reconciliation and
//! remote-entity systems.

use std::path::Path;

use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crossfire_core::commands::{InputCommand, InputSample};
use crossfire_core::constants::*;
use crossfire_core::enums::*;
use crossfire_core::events::GameEvent;
use crossfire_core::map::MapData;
use crossfire_core::state::{AuthoritativeSnapshot, EntityState, SnapshotError};
use crossfire_core::types::{AxisAlignedBox, Pose};

use crate::authority::{AuthorityConfig, AuthoritySimulation, InputOutcome};
use crate::ballistics::{eye_position, view_direction};
use crate::collision::{intersects_strict, player_box, raycast_world};
use crate::engine::{ClientConfig, ClientSimulation, ReconcileOutcome};
use crate::movement::{max_speed, simulate_move};
use crate::world_setup::{empty_field, training_yard};

const LOCAL_ID: u32 = 1;
const REMOTE_ID: u32 = 2;

fn command(sequence: u32, move_x: f64, move_y: f64, yaw: f64) -> InputCommand {
    InputCommand {
        sequence,
        move_x,
        move_y,
        yaw,
        ..Default::default()
    }
}

fn forward_sample() -> InputSample {
    InputSample {
        move_y: 1.0,
        ..Default::default()
    }
}

fn entity(id: u32, position: DVec3) -> EntityState {
    EntityState {
        id,
        position,
        hp: PLAYER_MAX_HP,
        ammo: MAGAZINE_SIZE,
        alive: true,
        ..Default::default()
    }
}

fn snapshot(
    server_tick: u64,
    last_processed_sequence: u32,
    entities: Vec<EntityState>,
) -> AuthoritativeSnapshot {
    AuthoritativeSnapshot {
        server_tick,
        last_processed_sequence,
        entities,
        ..Default::default()
    }
}

fn client(colliders: Vec<AxisAlignedBox>) -> ClientSimulation {
    ClientSimulation::new(
        colliders,
        ClientConfig {
            local_entity_id: LOCAL_ID,
            ..Default::default()
        },
    )
}

/// A client that has received its first snapshot with the local entity at the origin.
fn assigned_client() -> ClientSimulation {
    let mut sim = client(Vec::new());
    sim.apply_snapshot(&snapshot(1, 0, vec![entity(LOCAL_ID, DVec3::ZERO)]));
    sim
}

fn random_command(rng: &mut ChaCha8Rng, sequence: u32) -> InputCommand {
    InputCommand {
        sequence,
        move_x: rng.gen_range(-1.0..=1.0),
        move_y: rng.gen_range(-1.0..=1.0),
        yaw: rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI),
        walk: rng.gen_bool(0.2),
        ..Default::default()
    }
}

// ---- Movement integrator ----

#[test]
fn test_simulate_move_deterministic() {
    let colliders = training_yard().colliders;
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let commands: Vec<InputCommand> = (1..=400).map(|seq| random_command(&mut rng, seq)).collect();

    let start = Pose::spawned_at(DVec3::new(0.0, 0.0, -16.0), 0.0);
    let mut a = start;
    let mut b = start;
    for cmd in &commands {
        let report_a = simulate_move(&mut a, cmd, &colliders, DT);
        let report_b = simulate_move(&mut b, cmd, &colliders, DT);
        assert_eq!(a, b, "Poses diverged at sequence {}", cmd.sequence);
        assert_eq!(report_a, report_b);
    }
}

#[test]
fn test_acceleration_reaches_max_speed_within_one_second() {
    let mut pose = Pose::default();
    for seq in 1..=60 {
        simulate_move(&mut pose, &command(seq, 0.0, 1.0, 0.0), &[], DT);
    }
    assert!((pose.horizontal_speed() - PLAYER_MAX_SPEED).abs() < 1e-12);

    // Each tick gains 48/60 m/s and position uses the updated velocity, so
    // ticks 1..=7 ramp to 5.6 m/s, tick 8 hits the 6 m/s cap, and the other
    // 52 ticks cruise. The continuous ramp would give 5.625 m.
    let ramp: f64 = (1..=7).map(|k| k as f64 * PLAYER_ACCELERATION * DT).sum();
    let expected = (ramp + PLAYER_MAX_SPEED * 53.0) * DT;
    assert!((expected - 5.673_333).abs() < 1e-6);
    assert!(
        (pose.position.z - expected).abs() < 1e-9,
        "z = {}, expected {expected}",
        pose.position.z
    );
    assert!(pose.position.x.abs() < 1e-12);
    assert_eq!(pose.position.y, GROUND_Y);
}

#[test]
fn test_speed_never_exceeds_max() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut pose = Pose::default();
    for seq in 1..=2000 {
        let cmd = random_command(&mut rng, seq);
        simulate_move(&mut pose, &cmd, &[], DT);
        assert!(
            pose.horizontal_speed() <= max_speed(cmd.walk) + 1e-9,
            "speed {} exceeds cap at sequence {seq}",
            pose.horizontal_speed()
        );
        assert_eq!(pose.velocity.y, 0.0);
    }
}

#[test]
fn test_friction_stops_exactly() {
    let mut pose = Pose::default();
    for seq in 1..=60 {
        simulate_move(&mut pose, &command(seq, 0.0, 1.0, 0.0), &[], DT);
    }
    for seq in 61..=90 {
        simulate_move(&mut pose, &command(seq, 0.0, 0.0, 0.0), &[], DT);
    }
    assert_eq!(pose.velocity, DVec3::ZERO);

    let resting = pose.position;
    let report = simulate_move(&mut pose, &command(91, 0.0, 0.0, 0.0), &[], DT);
    assert_eq!(pose.position, resting);
    assert_eq!(report.distance, 0.0);
}

#[test]
fn test_wall_slide_keeps_tangential_motion() {
    // Wall face at x = 1, spanning well past the run along z.
    let wall = AxisAlignedBox::new(
        DVec3::new(1.0, 0.0, -10.0),
        DVec3::new(2.0, 3.0, 10.0),
        SurfaceKind::Concrete,
    );
    let mut pose = Pose::default();
    let mut blocked_x = false;
    // Yaw 0: right is -X, so move_x = -1 strafes toward +X.
    for seq in 1..=120 {
        let report = simulate_move(&mut pose, &command(seq, -1.0, 1.0, 0.0), &[wall], DT);
        blocked_x |= report.blocked_x;
        assert!(!report.blocked_z);
        assert!(!intersects_strict(&player_box(pose.position), &wall));
    }

    assert!(blocked_x);
    assert!(pose.position.x <= 1.0 - PLAYER_HALF_WIDTH);
    assert!(pose.position.x > 1.0 - PLAYER_HALF_WIDTH - 1e-3);
    assert_eq!(pose.velocity.x, 0.0);
    assert!(pose.velocity.z > 0.0);
    assert!(pose.position.z > 2.0, "Should slide along the wall, z = {}", pose.position.z);
}

#[test]
fn test_touching_collider_does_not_block() {
    // Player box spans z in [-0.32, 0.32]; this crate's face is exactly flush.
    let flush = AxisAlignedBox::new(
        DVec3::new(-1.0, 0.0, PLAYER_HALF_WIDTH),
        DVec3::new(1.0, 1.0, 2.0),
        SurfaceKind::Wood,
    );
    assert!(!intersects_strict(&player_box(DVec3::ZERO), &flush));

    // Strafing along the face is unobstructed.
    let mut pose = Pose::default();
    let report = simulate_move(&mut pose, &command(1, 1.0, 0.0, 0.0), &[flush], DT);
    assert!(!report.blocked_x);
    assert!(pose.position.x < 0.0);
}

#[test]
fn test_overlapping_colliders_resolve_in_list_order() {
    let near = AxisAlignedBox::new(
        DVec3::new(1.0, 0.0, -1.0),
        DVec3::new(2.0, 2.0, 1.0),
        SurfaceKind::Wood,
    );
    let far = AxisAlignedBox::new(
        DVec3::new(1.05, 0.0, -1.0),
        DVec3::new(2.0, 2.0, 1.0),
        SurfaceKind::Metal,
    );
    // One coarse step carries the body from x = 0.6 into both boxes.
    let dt = 0.05;
    let start = Pose {
        velocity: DVec3::new(PLAYER_MAX_SPEED, 0.0, 0.0),
        ..Pose::spawned_at(DVec3::new(0.6, 0.0, 0.0), 0.0)
    };
    let strafe = command(1, -1.0, 0.0, 0.0);

    // Near first: one push clears both. Far first: its push still overlaps
    // the near box, which pushes again.
    let mut results = Vec::new();
    for colliders in [[near, far], [far, near]] {
        let mut pose = start;
        let report = simulate_move(&mut pose, &strafe, &colliders, dt);
        assert!(report.blocked_x);
        assert_eq!(pose.velocity.x, 0.0);
        for collider in &colliders {
            assert!(!intersects_strict(&player_box(pose.position), collider));
        }
        results.push(pose.position.x);
    }

    let flush = 1.0 - PLAYER_HALF_WIDTH - COLLISION_SKIN;
    assert!((results[0] - flush).abs() < 1e-12);
    assert!((results[1] - flush).abs() < 1e-12);
}

#[test]
fn test_entity_inside_collider_can_walk_out() {
    let block = AxisAlignedBox::new(
        DVec3::new(0.0, 0.0, -1.0),
        DVec3::new(1.0, 2.0, 1.0),
        SurfaceKind::Stone,
    );
    // Body spans x in [0.78, 1.42]: already inside the block.
    let start = Pose::spawned_at(DVec3::new(1.1, 0.0, 0.0), 0.0);
    assert!(intersects_strict(&player_box(start.position), &block));

    // Strafe toward +X, away from the block.
    let mut away = start;
    for seq in 1..=120 {
        simulate_move(&mut away, &command(seq, -1.0, 0.0, 0.0), &[block], DT);
    }
    assert!(away.position.x > 1.0 + PLAYER_HALF_WIDTH, "x = {}", away.position.x);
    assert!(away.velocity.x > 0.0);
    assert!(!intersects_strict(&player_box(away.position), &block));

    // Run forward along +Z through the overlap.
    let mut along = start;
    for seq in 1..=120 {
        simulate_move(&mut along, &command(seq, 0.0, 1.0, 0.0), &[block], DT);
    }
    assert!(along.position.z > 1.0 + PLAYER_HALF_WIDTH, "z = {}", along.position.z);
    assert!(!intersects_strict(&player_box(along.position), &block));

    // Once clear, the block stops the way back in.
    for seq in 121..=420 {
        simulate_move(&mut away, &command(seq, 1.0, 0.0, 0.0), &[block], DT);
    }
    assert!(away.position.x >= 1.0 + PLAYER_HALF_WIDTH);
    assert!(away.position.x < 1.0 + PLAYER_HALF_WIDTH + 1e-3);
    assert!(!intersects_strict(&player_box(away.position), &block));
}

#[test]
fn test_no_penetration_random_layouts() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    for layout in 0..40 {
        let colliders: Vec<AxisAlignedBox> = (0..8)
            .map(|_| {
                let center = DVec3::new(rng.gen_range(-6.0..6.0), 1.0, rng.gen_range(-6.0..6.0));
                let half = DVec3::new(rng.gen_range(0.2..1.5), 1.0, rng.gen_range(0.2..1.5));
                AxisAlignedBox::from_center(center, half, SurfaceKind::Stone)
            })
            .collect();

        let start = loop {
            let candidate = DVec3::new(rng.gen_range(-8.0..8.0), 0.0, rng.gen_range(-8.0..8.0));
            let body = player_box(candidate);
            if colliders.iter().all(|c| !intersects_strict(&body, c)) {
                break candidate;
            }
        };

        let mut pose = Pose::spawned_at(start, 0.0);
        for seq in 1..=300 {
            let cmd = random_command(&mut rng, seq);
            simulate_move(&mut pose, &cmd, &colliders, DT);
            let body = player_box(pose.position);
            for (index, collider) in colliders.iter().enumerate() {
                assert!(
                    !intersects_strict(&body, collider),
                    "layout {layout} sequence {seq}: player at {:?} penetrates collider {index}",
                    pose.position
                );
            }
        }
    }
}

// ---- Maps and hit-scan ----

#[test]
fn test_training_yard_valid_and_spawns_clear() {
    let map = training_yard();
    assert!(map.validate().is_ok());
    for spawn in &map.spawns {
        let body = player_box(*spawn);
        assert!(
            map.colliders.iter().all(|c| !intersects_strict(&body, c)),
            "spawn {spawn:?} overlaps a collider"
        );
    }
    assert!(empty_field().validate().is_ok());
}

#[test]
fn test_bundled_map_loads_and_spawns_clear() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../maps/warehouse.json");
    let map = MapData::load(&path).expect("bundled map should load");
    assert_eq!(map.name, "warehouse");
    assert_eq!(map.spawns.len(), 4);
    // Surface defaults when omitted.
    assert_eq!(map.colliders.last().map(|c| c.surface), Some(SurfaceKind::Stone));
    for spawn in &map.spawns {
        let body = player_box(*spawn);
        assert!(map.colliders.iter().all(|c| !intersects_strict(&body, c)));
    }
}

#[test]
fn test_hitscan_from_spawn_hits_metal_cover() {
    let map = training_yard();
    let pose = Pose::spawned_at(map.spawns[0], 0.0);
    let hit = raycast_world(
        eye_position(&pose),
        view_direction(0.0, 0.0),
        &map.colliders,
        HITSCAN_RANGE,
    )
    .expect("cover should be hit");

    assert!((hit.distance - 3.5).abs() < 1e-9);
    assert_eq!(hit.surface, SurfaceKind::Metal);
}

// ---- Client prediction ----

#[test]
fn test_client_starts_unassigned() {
    let mut sim = client(Vec::new());
    assert_eq!(sim.state(), PredictionState::Unassigned);
    assert!(sim.pose().is_none());

    // Commands are still sequenced and buffered before assignment.
    let first = sim.predict(&forward_sample());
    let second = sim.predict(&forward_sample());
    assert_eq!(first.sequence, 1);
    assert_eq!(second.sequence, 2);
    assert_eq!(sim.pending_len(), 2);
    assert_eq!(sim.state(), PredictionState::Unassigned);
    assert!(sim.drain_events().is_empty());
}

#[test]
fn test_predict_sanitizes_and_moves() {
    let mut sim = assigned_client();
    assert_eq!(sim.state(), PredictionState::Reconciled);

    let cmd = sim.predict(&InputSample {
        move_y: 5.0,
        pitch: f64::NAN,
        ..Default::default()
    });
    assert_eq!(cmd.move_y, 1.0);
    assert_eq!(cmd.pitch, 0.0);
    assert_eq!(sim.state(), PredictionState::UnconfirmedLocal);

    let pose = sim.pose().expect("assigned");
    assert!(pose.position.z > 0.0);
    assert_eq!(sim.time().tick, 1);
}

#[test]
fn test_local_shot_event_and_predicted_ammo() {
    let mut sim = assigned_client();
    sim.drain_events();

    let cmd = sim.predict(&InputSample {
        fire: true,
        ..Default::default()
    });
    let events = sim.drain_events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        GameEvent::LocalShot {
            sequence,
            origin,
            direction,
            spray_index,
        } => {
            assert_eq!(*sequence, cmd.sequence);
            assert_eq!(*spray_index, 0);
            assert!((origin.y - PLAYER_EYE_HEIGHT).abs() < 1e-12);
            assert!((*direction - view_direction(0.0, 0.0)).length() < 1e-12);
        }
        other => panic!("Expected LocalShot, got {other:?}"),
    }
    assert_eq!(sim.weapon().ammo, MAGAZINE_SIZE - 1);

    // Authority has not processed the shot yet: predicted ammo keeps it.
    let outcome = sim.apply_snapshot(&snapshot(2, 0, vec![entity(LOCAL_ID, DVec3::ZERO)]));
    assert_eq!(
        outcome,
        ReconcileOutcome::Applied {
            acknowledged: 0,
            replayed: 1
        }
    );
    assert_eq!(sim.pose().map(|p| p.ammo), Some(MAGAZINE_SIZE - 1));

    // Once acknowledged, ammo comes straight from the authority.
    let mut confirmed = entity(LOCAL_ID, DVec3::ZERO);
    confirmed.ammo = MAGAZINE_SIZE - 1;
    sim.apply_snapshot(&snapshot(3, cmd.sequence, vec![confirmed]));
    assert_eq!(sim.pending_len(), 0);
    assert_eq!(sim.pose().map(|p| p.ammo), Some(MAGAZINE_SIZE - 1));
}

#[test]
fn test_footsteps_only_when_running() {
    let mut running = assigned_client();
    for _ in 0..120 {
        running.predict(&forward_sample());
    }
    let steps = running
        .drain_events()
        .iter()
        .filter(|e| matches!(e, GameEvent::LocalFootstep { .. }))
        .count();
    assert!(steps >= 2, "Expected footsteps while running, got {steps}");

    let mut walking = assigned_client();
    for _ in 0..120 {
        walking.predict(&InputSample {
            walk: true,
            ..forward_sample()
        });
    }
    assert!(walking.drain_events().is_empty());
}

#[test]
fn test_pending_overflow_drops_oldest() {
    let mut sim = ClientSimulation::new(
        Vec::new(),
        ClientConfig {
            local_entity_id: LOCAL_ID,
            pending_capacity: 8,
            ..Default::default()
        },
    );
    for _ in 0..20 {
        sim.predict(&forward_sample());
    }
    assert_eq!(sim.pending_len(), 8);
    assert_eq!(sim.pending().oldest_sequence(), Some(13));
    assert_eq!(sim.pending().newest_sequence(), Some(20));
    assert_eq!(sim.pending().dropped(), 12);
    assert_eq!(sim.next_sequence(), 21);
}

// ---- Reconciliation ----

#[test]
fn test_reconcile_idempotent_when_all_acknowledged() {
    let mut sim = assigned_client();
    for _ in 0..10 {
        sim.predict(&forward_sample());
    }

    let mut server = entity(LOCAL_ID, DVec3::new(0.5, 0.0, 2.0));
    server.velocity = DVec3::new(0.0, 0.0, 3.0);
    server.yaw = 0.25;

    let outcome = sim.apply_snapshot(&snapshot(2, 10, vec![server]));
    assert_eq!(
        outcome,
        ReconcileOutcome::Applied {
            acknowledged: 10,
            replayed: 0
        }
    );
    assert_eq!(sim.pending_len(), 0);
    assert_eq!(sim.pose(), Some(&server.pose()));

    // The same content again changes nothing.
    sim.apply_snapshot(&snapshot(3, 10, vec![server]));
    assert_eq!(sim.pose(), Some(&server.pose()));
    assert_eq!(sim.state(), PredictionState::Reconciled);
}

#[test]
fn test_replay_matches_uninterrupted_prediction() {
    let map = training_yard();
    let mut authority = AuthoritySimulation::new(map.clone(), AuthorityConfig::default());
    authority.join(LOCAL_ID, Team::Attackers);

    let mut sim = client(map.colliders.clone());
    sim.apply_snapshot(&authority.snapshot_for(LOCAL_ID));

    let mut sent = Vec::new();
    for i in 0..30 {
        sent.push(sim.predict(&InputSample {
            move_x: if i % 7 < 3 { 0.5 } else { -0.5 },
            move_y: 1.0,
            yaw: 0.02 * i as f64,
            fire: i % 4 != 3,
            ..Default::default()
        }));
    }
    let predicted = *sim.pose().expect("assigned");

    for cmd in &sent[..12] {
        assert_eq!(authority.apply_input(LOCAL_ID, cmd), InputOutcome::Applied);
        authority.advance_tick();
    }
    let outcome = sim.apply_snapshot(&authority.snapshot_for(LOCAL_ID));
    assert_eq!(
        outcome,
        ReconcileOutcome::Applied {
            acknowledged: 12,
            replayed: 18
        }
    );
    assert_eq!(sim.pose(), Some(&predicted));
    assert_eq!(sim.last_acknowledged(), 12);
}

#[test]
fn test_correction_moves_replayed_pose() {
    let mut sim = assigned_client();
    for _ in 0..5 {
        sim.predict(&forward_sample());
    }
    let before = *sim.pose().expect("assigned");

    // Authority places the player 3 m to the side and has processed nothing.
    sim.apply_snapshot(&snapshot(2, 0, vec![entity(LOCAL_ID, DVec3::new(3.0, 0.0, 0.0))]));
    let after = *sim.pose().expect("assigned");
    assert!((after.position.x - 3.0).abs() < 1e-12);
    assert!((after.position.z - before.position.z).abs() < 1e-12);
}

#[test]
fn test_stale_snapshot_ignored() {
    let mut sim = assigned_client();
    sim.apply_snapshot(&snapshot(5, 0, vec![entity(LOCAL_ID, DVec3::new(1.0, 0.0, 0.0))]));

    let moved = vec![entity(LOCAL_ID, DVec3::new(9.0, 0.0, 0.0))];
    let repeat = sim.apply_snapshot(&snapshot(5, 0, moved.clone()));
    assert_eq!(
        repeat,
        ReconcileOutcome::Stale {
            server_tick: 5,
            last_server_tick: 5
        }
    );
    let older = sim.apply_snapshot(&snapshot(3, 0, moved));
    assert!(matches!(older, ReconcileOutcome::Stale { .. }));

    assert_eq!(sim.pose().map(|p| p.position.x), Some(1.0));
    assert_eq!(sim.last_server_tick(), Some(5));
}

#[test]
fn test_invalid_snapshots_rejected() {
    let mut sim = assigned_client();
    for _ in 0..3 {
        sim.predict(&forward_sample());
    }
    let before = *sim.pose().expect("assigned");

    let duplicate = snapshot(
        2,
        3,
        vec![entity(LOCAL_ID, DVec3::ZERO), entity(LOCAL_ID, DVec3::ONE)],
    );
    assert_eq!(
        sim.apply_snapshot(&duplicate),
        ReconcileOutcome::Rejected(SnapshotError::DuplicateEntity { id: LOCAL_ID })
    );

    let mut broken = entity(REMOTE_ID, DVec3::ZERO);
    broken.position.x = f64::NAN;
    let non_finite = snapshot(2, 3, vec![entity(LOCAL_ID, DVec3::ZERO), broken]);
    assert_eq!(
        sim.apply_snapshot(&non_finite),
        ReconcileOutcome::Rejected(SnapshotError::NonFinite { id: REMOTE_ID })
    );

    assert_eq!(sim.pose(), Some(&before));
    assert_eq!(sim.pending_len(), 3);
    assert_eq!(sim.remote_count(), 0);
}

#[test]
fn test_missing_local_entity_unassigns() {
    let mut sim = assigned_client();
    sim.predict(&forward_sample());

    let outcome = sim.apply_snapshot(&snapshot(2, 1, vec![entity(REMOTE_ID, DVec3::ONE)]));
    assert_eq!(outcome, ReconcileOutcome::LocalMissing { acknowledged: 1 });
    assert_eq!(sim.state(), PredictionState::Unassigned);
    assert!(sim.pose().is_none());
    assert_eq!(sim.remote_count(), 1);
}

#[test]
fn test_dead_pose_not_integrated() {
    let mut sim = client(Vec::new());
    let mut dead = entity(LOCAL_ID, DVec3::new(2.0, 0.0, 2.0));
    dead.alive = false;
    dead.hp = 0;
    sim.apply_snapshot(&snapshot(1, 0, vec![dead]));

    for _ in 0..30 {
        sim.predict(&InputSample {
            yaw: 1.0,
            fire: true,
            ..forward_sample()
        });
    }
    let pose = sim.pose().expect("assigned");
    assert_eq!(pose.position, dead.position);
    assert_eq!(pose.yaw, 1.0);
    assert!(sim.drain_events().is_empty());
    assert_eq!(sim.pending_len(), 30);

    let outcome = sim.apply_snapshot(&snapshot(2, 10, vec![dead]));
    assert_eq!(
        outcome,
        ReconcileOutcome::Applied {
            acknowledged: 10,
            replayed: 0
        }
    );
    assert_eq!(sim.pose().map(|p| p.position), Some(dead.position));
}

/// Client and authority in lockstep: every command is applied and
/// acknowledged before the next one is predicted. Returns local shots.
fn run_lockstep(
    sim: &mut ClientSimulation,
    authority: &mut AuthoritySimulation,
    sample: &InputSample,
    ticks: usize,
) -> usize {
    let mut shots = 0;
    for _ in 0..ticks {
        let cmd = sim.predict(sample);
        assert_eq!(authority.apply_input(LOCAL_ID, &cmd), InputOutcome::Applied);
        authority.advance_tick();
        sim.apply_snapshot(&authority.snapshot_for(LOCAL_ID));
        shots += sim
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::LocalShot { .. }))
            .count();
    }
    shots
}

#[test]
fn test_respawn_resets_predicted_weapon() {
    let map = empty_field();
    let mut authority = AuthoritySimulation::new(map.clone(), AuthorityConfig::default());
    authority.join(LOCAL_ID, Team::Attackers);
    let mut sim = client(map.colliders.clone());
    sim.apply_snapshot(&authority.snapshot_for(LOCAL_ID));

    let trigger = InputSample {
        fire: true,
        ..Default::default()
    };
    let reload = InputSample {
        reload: true,
        ..Default::default()
    };
    assert!(run_lockstep(&mut sim, &mut authority, &trigger, 20) > 0);
    run_lockstep(&mut sim, &mut authority, &reload, 1);
    assert!(sim.weapon().is_reloading());
    let shots_before = authority.player(LOCAL_ID).map_or(0, |p| p.weapon.shots_fired);

    // Killed and back before any snapshot showed the death.
    authority.kill(LOCAL_ID);
    authority.respawn(LOCAL_ID);
    authority.advance_tick();
    sim.apply_snapshot(&authority.snapshot_for(LOCAL_ID));
    assert!(!sim.weapon().is_reloading());
    assert_eq!(sim.weapon().ammo, MAGAZINE_SIZE);
    assert_eq!(Some(*sim.weapon()), authority.player(LOCAL_ID).map(|p| p.weapon));

    let predicted = run_lockstep(&mut sim, &mut authority, &trigger, 30);
    let server = authority.player(LOCAL_ID).map(|p| p.weapon).expect("joined");
    assert_eq!(predicted as u32, server.shots_fired - shots_before);
    assert!(predicted >= 4, "Expected a fresh spray after respawn, got {predicted}");
    assert_eq!(*sim.weapon(), server);
}

#[test]
fn test_commands_before_assignment_reach_the_weapon() {
    let map = empty_field();
    let mut authority = AuthoritySimulation::new(map.clone(), AuthorityConfig::default());
    authority.join(LOCAL_ID, Team::Defenders);
    let mut sim = client(map.colliders.clone());

    let early: Vec<InputCommand> = (0..12)
        .map(|_| {
            sim.predict(&InputSample {
                fire: true,
                ..forward_sample()
            })
        })
        .collect();
    assert!(sim.drain_events().is_empty());
    assert_eq!(sim.weapon().ammo, MAGAZINE_SIZE);

    // First snapshot acknowledges a third of them; the rest are replayed.
    for cmd in &early[..4] {
        authority.apply_input(LOCAL_ID, cmd);
        authority.advance_tick();
    }
    let outcome = sim.apply_snapshot(&authority.snapshot_for(LOCAL_ID));
    assert_eq!(
        outcome,
        ReconcileOutcome::Applied {
            acknowledged: 4,
            replayed: 8
        }
    );

    for cmd in &early[4..] {
        authority.apply_input(LOCAL_ID, cmd);
    }
    let server = authority.player(LOCAL_ID).expect("joined");
    assert!(server.weapon.ammo < MAGAZINE_SIZE);
    assert_eq!(*sim.weapon(), server.weapon);
    assert_eq!(sim.pose(), Some(&server.pose));
}

// ---- Remote entities ----

#[test]
fn test_remote_events_fire_once() {
    let mut sim = assigned_client();

    let mut remote = entity(REMOTE_ID, DVec3::new(5.0, 0.0, 5.0));
    remote.footstep_seq = 3;
    remote.shot_seq = 7;
    sim.apply_snapshot(&snapshot(2, 0, vec![entity(LOCAL_ID, DVec3::ZERO), remote]));
    // Counters seen on spawn do not replay history.
    assert!(sim.drain_events().is_empty());

    remote.footstep_seq = 4;
    sim.apply_snapshot(&snapshot(3, 0, vec![entity(LOCAL_ID, DVec3::ZERO), remote]));
    let events = sim.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        GameEvent::RemoteFootstep { id: REMOTE_ID, .. }
    ));

    // Same counters in a newer snapshot fire nothing.
    sim.apply_snapshot(&snapshot(4, 0, vec![entity(LOCAL_ID, DVec3::ZERO), remote]));
    assert!(sim.drain_events().is_empty());

    remote.shot_seq = 8;
    sim.apply_snapshot(&snapshot(5, 0, vec![entity(LOCAL_ID, DVec3::ZERO), remote]));
    let events = sim.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], GameEvent::RemoteShot { id: REMOTE_ID, .. }));
}

#[test]
fn test_interpolation_converges_and_snaps() {
    let mut sim = assigned_client();
    sim.apply_snapshot(&snapshot(
        2,
        0,
        vec![entity(LOCAL_ID, DVec3::ZERO), entity(REMOTE_ID, DVec3::ZERO)],
    ));
    assert_eq!(sim.remote_render_position(REMOTE_ID), Some(DVec3::ZERO));

    sim.apply_snapshot(&snapshot(
        3,
        0,
        vec![entity(LOCAL_ID, DVec3::ZERO), entity(REMOTE_ID, DVec3::new(1.0, 0.0, 0.0))],
    ));
    // Render position only moves on frames.
    assert_eq!(sim.remote_render_position(REMOTE_ID), Some(DVec3::ZERO));

    sim.frame(DT);
    let first = sim.remote_render_position(REMOTE_ID).expect("remote");
    assert!(first.x > 0.0 && first.x < 1.0);

    for _ in 0..120 {
        sim.frame(DT);
    }
    let settled = sim.remote_render_position(REMOTE_ID).expect("remote");
    assert!((settled.x - 1.0).abs() < 1e-6);

    // A jump beyond the snap distance is not smoothed.
    let far = DVec3::new(1.0 + TELEPORT_SNAP_DISTANCE * 2.0, 0.0, 0.0);
    sim.apply_snapshot(&snapshot(
        4,
        0,
        vec![entity(LOCAL_ID, DVec3::ZERO), entity(REMOTE_ID, far)],
    ));
    sim.frame(DT);
    assert_eq!(sim.remote_render_position(REMOTE_ID), Some(far));

    // Frames never touch the local pose.
    assert_eq!(sim.pose().map(|p| p.position), Some(DVec3::ZERO));
}

#[test]
fn test_remote_despawned_when_absent() {
    let mut sim = assigned_client();
    sim.apply_snapshot(&snapshot(
        2,
        0,
        vec![entity(LOCAL_ID, DVec3::ZERO), entity(REMOTE_ID, DVec3::ONE)],
    ));
    assert_eq!(sim.remote_count(), 1);
    assert!(sim.remote_state(REMOTE_ID).is_some());

    sim.apply_snapshot(&snapshot(3, 0, vec![entity(LOCAL_ID, DVec3::ZERO)]));
    assert_eq!(sim.remote_count(), 0);
    assert!(sim.remote_state(REMOTE_ID).is_none());
    assert!(sim.remote_render_position(REMOTE_ID).is_none());
}

// ---- Authority ----

#[test]
fn test_authority_input_ordering() {
    let mut authority = AuthoritySimulation::new(empty_field(), AuthorityConfig::default());
    authority.join(LOCAL_ID, Team::Defenders);

    assert_eq!(authority.apply_input(LOCAL_ID, &command(1, 0.0, 1.0, 0.0)), InputOutcome::Applied);
    assert_eq!(authority.apply_input(LOCAL_ID, &command(1, 0.0, 1.0, 0.0)), InputOutcome::Stale);
    assert_eq!(authority.apply_input(99, &command(2, 0.0, 1.0, 0.0)), InputOutcome::UnknownPlayer);

    authority.kill(LOCAL_ID);
    let dead_at = authority.player(LOCAL_ID).map(|p| p.pose.position);
    assert_eq!(authority.apply_input(LOCAL_ID, &command(2, 0.0, 1.0, 0.0)), InputOutcome::Applied);
    assert_eq!(authority.player(LOCAL_ID).map(|p| p.pose.position), dead_at);

    let snap = authority.snapshot_for(LOCAL_ID);
    assert_eq!(snap.last_processed_sequence, 2);
    assert_eq!(snap.entity(LOCAL_ID).map(|e| e.alive), Some(false));

    authority.respawn(LOCAL_ID);
    authority.award_round(Team::Defenders);
    let snap = authority.snapshot_for(LOCAL_ID);
    assert_eq!(snap.entity(LOCAL_ID).map(|e| e.hp), Some(PLAYER_MAX_HP));
    assert_eq!(snap.scores.defenders, 1);
}

#[test]
fn test_respawn_returns_to_join_spawn() {
    let map = training_yard();
    let mut authority = AuthoritySimulation::new(map.clone(), AuthorityConfig::default());
    // Ids joining out of key order.
    authority.join(5, Team::Attackers);
    authority.join(2, Team::Defenders);
    assert_eq!(authority.player(5).map(|p| p.spawn_index), Some(0));
    assert_eq!(authority.player(2).map(|p| p.spawn_index), Some(1));

    for id in [5, 2] {
        let joined = authority.player(id).map(|p| p.pose.position);
        authority.set_position(id, DVec3::new(3.0, 0.0, 3.0));
        authority.kill(id);
        authority.respawn(id);
        assert_eq!(authority.player(id).map(|p| p.pose.position), joined);
    }
    assert_eq!(authority.player(2).map(|p| p.pose.position), Some(map.spawns[1]));
}

// ---- Text export ----

#[test]
fn test_render_game_to_text_json() {
    let unassigned = client(Vec::new());
    let json: serde_json::Value =
        serde_json::from_str(&unassigned.render_game_to_text()).expect("valid JSON");
    assert_eq!(json["state"], "Unassigned");
    assert!(json["player"].is_null());

    let mut sim = assigned_client();
    sim.apply_snapshot(&snapshot(
        2,
        0,
        vec![entity(LOCAL_ID, DVec3::ZERO), entity(REMOTE_ID, DVec3::ONE)],
    ));
    sim.predict(&forward_sample());

    let json: serde_json::Value =
        serde_json::from_str(&sim.render_game_to_text()).expect("valid JSON");
    assert_eq!(json["state"], "UnconfirmedLocal");
    assert_eq!(json["local_entity_id"], LOCAL_ID);
    assert_eq!(json["server_tick"], 2);
    assert_eq!(json["pending_inputs"], 1);
    assert_eq!(json["player"]["ammo"], MAGAZINE_SIZE);
    assert_eq!(json["player"]["position"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["entities"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["entities"][0]["id"], REMOTE_ID);
}
