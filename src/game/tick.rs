//! Authoritative Simulation Tick
//!
//! The per-frame entry point. The caller owns the world and drives time;
//! every tick runs the same fixed sequence:
//!
//! 1. A non-positive `dt` (pause) changes nothing.
//! 2. The clock advances.
//! 3. The player (if alive): look, movement, railgun.
//! 4. Bots in id order: face, steer, and attack while the player lives.
//! 5. Due respawns fire.
//! 6. Pending events are drained into the result.

use tracing::trace;

use crate::game::actor::{ActorId, Combatant};
use crate::game::config::SimConfig;
use crate::game::events::GameEvent;
use crate::game::input::{Intent, IntentLog};
use crate::game::movement::{advance, apply_look};
use crate::game::spawn::SpawnRegistry;
use crate::game::state::MatchState;
use crate::game::world::World;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Tick counter after this call
    pub tick: u32,
    /// False when the call was a pause
    pub advanced: bool,
    /// Events generated this tick
    pub events: Vec<GameEvent>,
}

/// Run one simulation tick.
///
/// # Determinism
///
/// Same state, config, world and intent always produce the same result:
/// - Bots are visited in BTreeMap (id) order
/// - All randomness comes from `state.rng`
/// - Time comes only from `dt`
pub fn tick<W: World + ?Sized>(
    state: &mut MatchState,
    config: &SimConfig,
    world: &mut W,
    intent: &Intent,
    dt: f32,
) -> TickResult {
    if !state.clock.advance(dt) {
        return TickResult {
            tick: state.tick(),
            advanced: false,
            events: Vec::new(),
        };
    }

    // 1. Player
    update_player(state, config, world, intent, dt);

    // 2. Bots
    update_bots(state, config, world, dt);

    // 3. Respawns
    state.run_due_actions(config, world);

    #[cfg(feature = "debug-tracing")]
    trace!(
        tick = state.tick(),
        now = state.now(),
        player = ?state.player.position(),
        velocity = ?state.player.velocity(),
        bots = state.active_bot_count(),
        "tick"
    );

    TickResult {
        tick: state.tick(),
        advanced: true,
        events: state.take_events(),
    }
}

fn update_player<W: World + ?Sized>(
    state: &mut MatchState,
    config: &SimConfig,
    world: &mut W,
    intent: &Intent,
    dt: f32,
) {
    if !state.player.is_alive() {
        return;
    }
    let now = state.now();
    let tick = state.tick();

    let player = &mut state.player;
    apply_look(&mut player.actor, &config.look, intent.look_delta);
    advance(&mut player.actor, &config.movement, intent, world, dt);

    if !intent.fire_pressed {
        return;
    }

    let origin = player.actor.eye_position(config.look.eye_height);
    let direction = player.actor.orientation.look_direction();
    let Some(shot) = player.railgun.try_fire(
        &config.railgun,
        &mut player.actor,
        &config.movement,
        &*world,
        origin,
        direction,
        now,
    ) else {
        return;
    };

    state.push_event(GameEvent::beam_fired(
        tick,
        ActorId::PLAYER,
        shot.beam_start,
        shot.beam_end,
        config.railgun.beam_color,
        config.railgun.beam_duration,
        shot.hit.target,
    ));

    if let Some(victim) = shot.killed {
        state.apply_kill(victim, ActorId::PLAYER, config, world);
    }
}

fn update_bots<W: World + ?Sized>(state: &mut MatchState, config: &SimConfig, world: &mut W, dt: f32) {
    let now = state.now();
    let tick = state.tick();
    let ids: Vec<ActorId> = state.bots.keys().copied().collect();

    for id in ids {
        let Some(bot) = state.bots.get_mut(&id) else {
            continue;
        };
        let Some(shot) = bot.think(&state.player.actor, &config.enemy, world, &mut state.rng, now, dt) else {
            continue;
        };

        state.push_event(GameEvent::beam_fired(
            tick,
            id,
            shot.beam_start,
            shot.beam_end,
            config.enemy.beam_color,
            config.enemy.beam_duration,
            shot.hit.target,
        ));

        if let Some(victim) = shot.killed {
            trace!(tick, shooter = %id, victim = %victim, "bot shot landed");
            state.apply_kill(victim, id, config, world);
        }
    }
}

/// Replay a match from a recorded intent log.
///
/// Builds a fresh match from the log's seed, populates it in `world` and
/// runs every recorded tick. Returns the final state and all events,
/// including the initial spawns.
pub fn replay_match<W: World + ?Sized>(
    log: &IntentLog,
    spawns: SpawnRegistry,
    config: &SimConfig,
    world: &mut W,
) -> (MatchState, Vec<GameEvent>) {
    let mut state = MatchState::new(log.rng_seed, spawns, config);
    state.populate(config, world);
    let mut all_events = state.take_events();

    for (_, intent) in log.replay_iter() {
        let result = tick(&mut state, config, world, &intent, log.dt);
        all_events.extend(result.events);
    }

    (state, all_events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};
    use crate::game::events::GameEventData;
    use crate::game::world::FlatArena;

    const DT: f32 = 1.0 / 60.0;

    fn setup(seed: u64) -> (MatchState, SimConfig, FlatArena) {
        let config = SimConfig::default();
        let mut arena = FlatArena::standard();
        let spawns = SpawnRegistry::from_positions(arena.spawn_points());
        let mut state = MatchState::new(seed, spawns, &config);
        state.populate(&config, &mut arena);
        state.take_events();
        (state, config, arena)
    }

    /// Open floor, no spawn points, no bots.
    fn empty_match() -> (MatchState, SimConfig, FlatArena) {
        let mut config = SimConfig::default();
        config.spawn.max_enemies = 0;
        let mut arena = FlatArena::new(0.0);
        let mut state = MatchState::new(1, SpawnRegistry::new(), &config);
        state.populate(&config, &mut arena);
        (state, config, arena)
    }

    fn scripted(t: u32) -> Intent {
        let mut intent = Intent::with_movement(((t / 30) % 3) as f32 - 1.0, 1.0);
        intent.jump_pressed = t % 45 == 0;
        intent.jump_held = t % 90 < 40;
        intent.fire_pressed = t % 100 == 50;
        intent.look_delta = Vec2::new(0.5, 0.0);
        intent
    }

    #[test]
    fn test_pause_changes_nothing() {
        let (mut state, config, mut arena) = setup(1);
        let before = state.compute_hash();

        let result = tick(&mut state, &config, &mut arena, &Intent::with_movement(0.0, 1.0), 0.0);

        assert!(!result.advanced);
        assert_eq!(result.tick, 0);
        assert_eq!(state.compute_hash(), before);
    }

    #[test]
    fn test_tick_determinism() {
        let (mut a, config, mut arena_a) = setup(12345);
        let (mut b, _, mut arena_b) = setup(12345);

        for t in 0..600 {
            let intent = scripted(t);
            let ra = tick(&mut a, &config, &mut arena_a, &intent, DT);
            let rb = tick(&mut b, &config, &mut arena_b, &intent, DT);
            assert_eq!(ra.events, rb.events);
        }

        assert_eq!(a.tick(), 600);
        assert_eq!(a.compute_hash(), b.compute_hash());
        assert_eq!(a.kills, b.kills);
        assert_eq!(a.deaths, b.deaths);
    }

    #[test]
    fn test_player_moves_forward() {
        let (mut state, config, mut arena) = empty_match();
        let start = state.player.position();

        for _ in 0..30 {
            tick(&mut state, &config, &mut arena, &Intent::with_movement(0.0, 1.0), DT);
        }

        // Yaw 0 faces +Z
        assert!(state.player.position().z > start.z + 1.0);
    }

    #[test]
    fn test_player_shot_kills_bot() {
        let (mut state, mut config, mut arena) = empty_match();
        config.spawn.max_enemies = 1;

        // Stand on the floor so the eye line crosses the bot's body
        state.player.actor.position = Vec3::ZERO;
        arena.place_actor(&state.player.actor);

        // Bot straight ahead, out of its own attack range
        state.spawns.register(Vec3::new(0.0, 0.0, 30.0));
        let id = state.spawn_bot(&config, &mut arena).expect("bot spawned");
        state.take_events();

        let mut intent = Intent::IDLE;
        intent.fire_pressed = true;
        let result = tick(&mut state, &config, &mut arena, &intent, DT);

        assert_eq!(state.kills, 1);
        assert!(!state.get_bot(id).unwrap().is_alive());
        assert!(result.events.iter().any(|e| matches!(
            e.data,
            GameEventData::BeamFired { shooter: ActorId::PLAYER, hit: Some(hit), .. } if hit == id
        )));
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e.data, GameEventData::KillScored { victim, .. } if victim == id)));
    }

    #[test]
    fn test_dead_player_ignores_intent() {
        let (mut state, config, mut arena) = empty_match();
        state.kill_player(None, &config, &mut arena);
        state.take_events();
        let position = state.player.position();

        let mut intent = Intent::with_movement(0.0, 1.0);
        intent.fire_pressed = true;
        intent.jump_pressed = true;
        let result = tick(&mut state, &config, &mut arena, &intent, DT);

        assert_eq!(state.player.position(), position);
        assert_eq!(state.player.railgun.last_fire_time, None);
        assert!(result.events.is_empty());
    }

    #[test]
    fn test_player_respawns_through_tick() {
        let (mut state, config, mut arena) = empty_match();
        state.kill_player(None, &config, &mut arena);

        let mut respawned_at = None;
        for _ in 0..120 {
            let result = tick(&mut state, &config, &mut arena, &Intent::IDLE, DT);
            if result
                .events
                .iter()
                .any(|e| matches!(e.data, GameEventData::ActorRespawned { actor: ActorId::PLAYER, .. }))
            {
                respawned_at = Some(state.now());
                break;
            }
        }

        let at = respawned_at.expect("player respawned");
        assert!(at >= config.spawn.player_respawn_delay as f64);
        assert!(at < config.spawn.player_respawn_delay as f64 + 2.0 * DT as f64);
        assert_eq!(state.player.position(), config.spawn.fallback_player_spawn);
    }

    #[test]
    fn test_bots_keep_moving_while_player_dead() {
        let (mut state, mut config, mut arena) = empty_match();
        config.spawn.max_enemies = 1;
        state.player.actor.position = Vec3::ZERO;
        arena.place_actor(&state.player.actor);

        // Beyond max distance, so the bot walks in; airborne, so it falls
        state.spawns.register(Vec3::new(0.0, 3.0, 30.0));
        let id = state.spawn_bot(&config, &mut arena).expect("bot spawned");
        state.kill_player(None, &config, &mut arena);
        let before = state.get_bot(id).unwrap().position();

        for _ in 0..30 {
            let result = tick(&mut state, &config, &mut arena, &Intent::IDLE, DT);
            assert!(!result
                .events
                .iter()
                .any(|e| matches!(e.data, GameEventData::BeamFired { .. })));
        }

        let after = state.get_bot(id).unwrap().position();
        assert!(after.z < before.z);
        assert!(after.y < before.y);
        assert_eq!(state.get_bot(id).unwrap().brain.last_attack_time, None);
    }

    #[test]
    fn test_replay_reproduces_hash() {
        let config = SimConfig::default();
        let mut log = IntentLog::new(99999, DT);

        let mut arena = FlatArena::standard();
        let spawns = SpawnRegistry::from_positions(arena.spawn_points());
        let mut live = MatchState::new(log.rng_seed, spawns.clone(), &config);
        live.populate(&config, &mut arena);
        let mut live_events = live.take_events();

        for t in 0..300 {
            let intent = scripted(t);
            log.record(t, intent);
            live_events.extend(tick(&mut live, &config, &mut arena, &intent, DT).events);
        }

        let mut replay_arena = FlatArena::standard();
        let (replayed, replay_events) = replay_match(&log, spawns, &config, &mut replay_arena);

        assert_eq!(replayed.compute_hash(), live.compute_hash());
        assert_eq!(replay_events, live_events);
    }
}
