//! Railhop Simulation Runner
//!
//! Headless demo: plays a scripted match against the bots in the standard
//! arena, logs what happens, then replays the recorded intents and checks
//! that the final state hash matches.
//!
//! Usage: `railhop-sim [config.json]`

use anyhow::{bail, Context, Result};
use glam::Vec2;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use railhop::{
    TICK_DT, TICK_RATE, VERSION,
    game::{
        actor::ActorId,
        config::SimConfig,
        events::GameEventData,
        input::{InputTracker, IntentLog, RawInput},
        spawn::SpawnRegistry,
        state::MatchState,
        tick::{replay_match, tick},
        world::FlatArena,
    },
};

/// Demo length in seconds.
const DEMO_SECONDS: u32 = 30;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    info!("Railhop Simulation v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let config = SimConfig::load(&path).with_context(|| format!("loading config from {path}"))?;
            info!("Loaded config from {}", path);
            config
        }
        None => SimConfig::default(),
    };

    demo_match(&config)
}

/// Held buttons for tick `t` of the demo script.
fn scripted_input(t: u32) -> RawInput {
    let second = t / TICK_RATE;
    let phase = t % TICK_RATE;

    // Circle-strafe, hop continuously, double-tap sprint every 5 s and
    // click fire twice a second.
    let strafe = if (second / 3) % 2 == 0 { 1.0 } else { -1.0 };
    let double_tap = second % 5 == 4 && (phase < 3 || (6..9).contains(&phase));
    RawInput {
        move_axes: Vec2::new(strafe, 1.0),
        sprint_held: double_tap,
        jump_held: second % 4 != 3,
        fire_held: phase % 30 < 2,
        look_delta: Vec2::new(-strafe * 0.6, if phase < 30 { 0.05 } else { -0.05 }),
    }
}

/// Run a scripted match and verify it by replay.
fn demo_match(config: &SimConfig) -> Result<()> {
    info!("=== Starting Demo Match ===");

    let rng_seed = 12345u64;
    let mut arena = FlatArena::standard();
    let spawns = SpawnRegistry::from_positions(arena.spawn_points());
    let mut state = MatchState::new(rng_seed, spawns.clone(), config);
    state.populate(config, &mut arena);

    info!("RNG Seed: {}", rng_seed);
    info!("Spawn points: {}, bots: {}", spawns.len(), state.active_bot_count());

    let mut tracker = InputTracker::new();
    let mut log = IntentLog::new(rng_seed, TICK_DT);
    let mut total_events = state.take_events().len();
    let total_ticks = DEMO_SECONDS * TICK_RATE;

    info!("Running {} ticks...", total_ticks);

    for t in 0..total_ticks {
        let intent = tracker.update(scripted_input(t), state.now(), config.movement.double_tap_window);
        log.record(t, intent);

        let result = tick(&mut state, config, &mut arena, &intent, TICK_DT);
        total_events += result.events.len();

        // Log important events
        for event in &result.events {
            match &event.data {
                GameEventData::KillScored { killer, victim, kills } => {
                    info!("Tick {}: {} killed bot {} (kills: {})", result.tick, killer, victim, kills);
                }
                GameEventData::ActorDied { victim, killer } if *victim == ActorId::PLAYER => {
                    info!("Tick {}: player killed by {:?}", result.tick, killer);
                }
                GameEventData::ActorRespawned { actor, position } => {
                    info!("Tick {}: {} respawned at {:.1?}", result.tick, actor, position);
                }
                _ => {}
            }
        }

        // Report every 10 seconds
        if result.tick % (10 * TICK_RATE) == 0 {
            let player = &state.player.actor;
            info!(
                "Tick {}: speed {:.1}, {} bots alive, {} events so far",
                result.tick,
                player.velocity.length(),
                state.active_bot_count(),
                total_events
            );
        }
    }

    // Print final results
    info!("=== Match Results ===");
    let hash = state.compute_hash();
    info!("Kills: {}  Deaths: {}", state.kills, state.deaths);
    info!("Total events: {}", total_events);
    info!("Intent deltas: {} for {} ticks", log.delta_count(), total_ticks);
    info!("Final State Hash: {}", hex::encode(hash));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let mut replay_arena = FlatArena::standard();
    let (replay_final, _) = replay_match(&log, spawns, config, &mut replay_arena);
    let replay_hash = replay_final.compute_hash();

    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash != replay_hash {
        warn!("DETERMINISM FAILURE: Hashes differ!");
        bail!("replay hash mismatch");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}
