//! crossfire-smoke: headless prediction smoke harness.
//!
//! Usage:
//!   crossfire-smoke run --ticks 600 --latency 6 --snapshot-interval 3 [--map maps/warehouse.json]
//!   crossfire-smoke export-map --output maps/training_yard.json

use std::collections::VecDeque;
use std::path::PathBuf;
use std::process;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crossfire_core::commands::{InputCommand, InputSample};
use crossfire_core::constants::DT;
use crossfire_core::enums::Team;
use crossfire_core::events::GameEvent;
use crossfire_core::map::MapData;
use crossfire_core::state::AuthoritativeSnapshot;
use crossfire_sim::authority::{AuthorityConfig, AuthoritySimulation};
use crossfire_sim::world_setup::training_yard;
use crossfire_sim::{ClientConfig, ClientSimulation, ReconcileOutcome};

const LOCAL_ID: u32 = 1;
const BOT_ID: u32 = 2;

fn main() {
    init_tracing("info");
    let args: Vec<String> = std::env::args().collect();

    let command = args.get(1).map(String::as_str).unwrap_or("run");
    let rest: &[String] = args.get(2..).unwrap_or(&[]);
    match command {
        "run" => cmd_run(rest),
        "export-map" => cmd_export_map(rest),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_usage() {
    eprintln!(
        "crossfire-smoke: CROSSFIRE prediction smoke harness\n\
         \n\
         Commands:\n\
         \n\
         run         Drive a scripted client against an in-process authority\n\
         \n\
           --ticks <N>              Client frames to simulate (default: 600)\n\
           --latency <N>            One-way latency in ticks (default: 6)\n\
           --snapshot-interval <N>  Ticks between snapshots (default: 3)\n\
           --map <path>             Map JSON (default: built-in training yard)\n\
         \n\
         export-map  Write the built-in training yard as map JSON\n\
         \n\
           --output <path>          Output file path\n\
         \n\
         The final text export is printed to stdout. Set RUST_LOG=debug for\n\
         per-snapshot reconciliation logs.\n"
    );
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_u64(args: &[String], name: &str, default: u64) -> u64 {
    match flag_value(args, name) {
        Some(raw) => match raw.parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("Error: {name} expects a non-negative integer, got {raw}");
                process::exit(1);
            }
        },
        None => default,
    }
}

fn load_map(args: &[String]) -> MapData {
    let Some(path) = flag_value(args, "--map") else {
        return training_yard();
    };
    match MapData::load(&PathBuf::from(path)) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("Error loading map {path}: {e}");
            process::exit(1);
        }
    }
}

// --- Scripted inputs ---

fn local_input(t: u64) -> InputSample {
    let phase = t % 240;
    InputSample {
        move_x: match phase {
            0..=119 => 0.0,
            120..=179 => 1.0,
            _ => -1.0,
        },
        move_y: if phase < 200 { 1.0 } else { -0.6 },
        yaw: (t as f64 * 0.013).sin() * 0.8,
        pitch: (t as f64 * 0.021).cos() * 0.2,
        fire: (t / 45) % 3 != 0,
        walk: (t / 100) % 4 == 3,
        reload: false,
    }
}

fn bot_input(sequence: u32) -> InputCommand {
    let t = sequence as f64;
    InputCommand {
        sequence,
        tick: sequence as u64,
        move_x: (t * 0.05).sin(),
        move_y: (t * 0.031).cos(),
        yaw: t * 0.01,
        fire: sequence % 90 < 30,
        ..Default::default()
    }
}

// --- Run command ---

#[derive(Default)]
struct RunStats {
    applied: u64,
    stale: u64,
    rejected: u64,
    max_pending: usize,
    local_shots: u64,
    remote_shots: u64,
    footsteps: u64,
}

fn cmd_run(args: &[String]) {
    let ticks = parse_u64(args, "--ticks", 600);
    let latency = parse_u64(args, "--latency", 6);
    let interval = parse_u64(args, "--snapshot-interval", 3).max(1);
    let map = load_map(args);
    if let Err(e) = map.validate() {
        eprintln!("Error: invalid map: {e}");
        process::exit(1);
    }

    info!(map = %map.name, ticks, latency, interval, "starting smoke run");

    let mut authority = AuthoritySimulation::new(map.clone(), AuthorityConfig::default());
    authority.join(LOCAL_ID, Team::Attackers);
    authority.join(BOT_ID, Team::Defenders);

    let mut client = ClientSimulation::new(
        map.colliders,
        ClientConfig {
            local_entity_id: LOCAL_ID,
            ..Default::default()
        },
    );
    client.apply_snapshot(&authority.snapshot_for(LOCAL_ID));

    let mut to_server: VecDeque<(u64, InputCommand)> = VecDeque::new();
    let mut to_client: VecDeque<(u64, AuthoritativeSnapshot)> = VecDeque::new();
    let mut stats = RunStats::default();

    for t in 0..ticks {
        let command = client.predict(&local_input(t));
        to_server.push_back((t + latency, command));

        while to_server.front().is_some_and(|(due, _)| *due <= t) {
            if let Some((_, cmd)) = to_server.pop_front() {
                authority.apply_input(LOCAL_ID, &cmd);
            }
        }
        authority.apply_input(BOT_ID, &bot_input(t as u32 + 1));
        authority.advance_tick();

        if t % interval == 0 {
            to_client.push_back((t + latency, authority.snapshot_for(LOCAL_ID)));
        }
        while to_client.front().is_some_and(|(due, _)| *due <= t) {
            if let Some((_, snapshot)) = to_client.pop_front() {
                match client.apply_snapshot(&snapshot) {
                    ReconcileOutcome::Applied { .. } | ReconcileOutcome::LocalMissing { .. } => {
                        stats.applied += 1
                    }
                    ReconcileOutcome::Stale { .. } => stats.stale += 1,
                    ReconcileOutcome::Rejected(_) => stats.rejected += 1,
                }
            }
        }

        client.frame(DT);
        stats.max_pending = stats.max_pending.max(client.pending_len());
        for event in client.drain_events() {
            match event {
                GameEvent::LocalShot { .. } => stats.local_shots += 1,
                GameEvent::RemoteShot { .. } => stats.remote_shots += 1,
                GameEvent::LocalFootstep { .. } | GameEvent::RemoteFootstep { .. } => {
                    stats.footsteps += 1
                }
                GameEvent::LocalReload { .. } => {}
            }
        }
    }

    info!(
        applied = stats.applied,
        stale = stats.stale,
        rejected = stats.rejected,
        max_pending = stats.max_pending,
        local_shots = stats.local_shots,
        remote_shots = stats.remote_shots,
        footsteps = stats.footsteps,
        "smoke run complete"
    );
    println!("{}", client.render_game_to_text());
}

// --- Export map command ---

fn cmd_export_map(args: &[String]) {
    let Some(output) = flag_value(args, "--output").map(PathBuf::from) else {
        eprintln!("Error: --output <path> is required");
        process::exit(1);
    };

    let json = match training_yard().to_json_pretty() {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing map: {e}");
            process::exit(1);
        }
    };
    if let Err(e) = std::fs::write(&output, json) {
        eprintln!("Error writing {}: {e}", output.display());
        process::exit(1);
    }
    eprintln!("Wrote {}", output.display());
}
