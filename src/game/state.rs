//! Match State
//!
//! Everything a match owns: clock, RNG, the player, the bots, the spawn
//! registry, the respawn schedule and the kill/death tallies.
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::clock::SimClock;
use crate::core::hash::{StateHash, compute_state_hash};
use crate::core::rng::DeterministicRng;
use crate::game::actor::{ActorId, Combatant};
use crate::game::config::SimConfig;
use crate::game::enemy::Bot;
use crate::game::events::{EventSink, GameEvent};
use crate::game::player::Player;
use crate::game::schedule::Scheduler;
use crate::game::spawn::SpawnRegistry;
use crate::game::world::World;

// =============================================================================
// SCHEDULED ACTIONS
// =============================================================================

/// Deferred work queued on the match scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledAction {
    /// Bring the player back at the safest spawn point
    RespawnPlayer,
    /// Bring this bot slot back at a random spawn point
    RespawnBot(ActorId),
}

impl ScheduledAction {
    fn hash_tag(&self) -> (u8, u32) {
        match self {
            ScheduledAction::RespawnPlayer => (0, 0),
            ScheduledAction::RespawnBot(id) => (1, id.0),
        }
    }
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// Complete match state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchState {
    /// RNG seed (for verification)
    pub rng_seed: u64,

    /// Simulated time and tick counter
    pub clock: SimClock,

    /// Deterministic RNG state
    pub rng: DeterministicRng,

    /// The local player
    pub player: Player,

    /// All bot slots (BTreeMap for deterministic iteration)
    pub bots: BTreeMap<ActorId, Bot>,

    /// Spawn points registered at arena build time
    pub spawns: SpawnRegistry,

    /// Pending respawns
    pub scheduler: Scheduler<ScheduledAction>,

    /// Id handed to the next spawned bot (monotonic)
    pub next_bot_id: ActorId,

    /// Bots killed
    pub kills: u32,

    /// Player deaths
    pub deaths: u32,

    /// Events generated this tick (drained by the tick)
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl MatchState {
    /// Create a new match with the player at the safest registered point.
    ///
    /// Nothing is placed in a world yet; call [`MatchState::populate`].
    pub fn new(rng_seed: u64, spawns: SpawnRegistry, config: &SimConfig) -> Self {
        let start = spawns.player_spawn(std::iter::empty(), config.spawn.fallback_player_spawn);
        Self {
            rng_seed,
            clock: SimClock::new(),
            rng: DeterministicRng::new(rng_seed),
            player: Player::new(start),
            bots: BTreeMap::new(),
            spawns,
            scheduler: Scheduler::new(),
            next_bot_id: ActorId::FIRST_BOT,
            kills: 0,
            deaths: 0,
            pending_events: Vec::new(),
        }
    }

    /// Current tick.
    #[inline]
    pub fn tick(&self) -> u32 {
        self.clock.tick()
    }

    /// Current simulated time (s).
    #[inline]
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Place the player's body and spawn bots up to the cap.
    pub fn populate<W: World + ?Sized>(&mut self, config: &SimConfig, world: &mut W) {
        world.place_actor(&self.player.actor);
        while self.spawn_bot(config, world).is_some() {}
    }

    /// Start over: drop every bot, zero the tallies, clear the schedule,
    /// respawn the player at the safest point and repopulate.
    ///
    /// Clock and RNG keep running, and bot ids keep increasing.
    pub fn restart<W: World + ?Sized>(&mut self, config: &SimConfig, world: &mut W) {
        for id in self.bots.keys() {
            world.remove_actor(*id);
        }
        self.bots.clear();
        self.scheduler.clear();
        self.kills = 0;
        self.deaths = 0;

        let start = self.spawns.player_spawn(std::iter::empty(), config.spawn.fallback_player_spawn);
        self.player.respawn(start, world);
        self.player.railgun = Default::default();

        let tick = self.tick();
        self.push_event(GameEvent::score_changed(tick, 0, 0));
        self.push_event(GameEvent::actor_respawned(tick, ActorId::PLAYER, start));
        debug!(tick, "match restarted");

        self.populate(config, world);
    }

    /// Number of living bots.
    pub fn active_bot_count(&self) -> u32 {
        self.bots.values().filter(|b| b.is_alive()).count() as u32
    }

    /// Positions of living bots, in id order.
    pub fn living_bot_positions(&self) -> impl Iterator<Item = Vec3> + Clone + '_ {
        self.bots.values().filter(|b| b.is_alive()).map(|b| b.position())
    }

    /// Get a bot by id.
    pub fn get_bot(&self, id: ActorId) -> Option<&Bot> {
        self.bots.get(&id)
    }

    // =========================================================================
    // SPAWNING
    // =========================================================================

    /// Spawn a new bot unless the population cap is reached.
    pub fn spawn_bot<W: World + ?Sized>(&mut self, config: &SimConfig, world: &mut W) -> Option<ActorId> {
        if self.active_bot_count() >= config.spawn.max_enemies {
            return None;
        }

        let position = self.spawns.bot_spawn(Some(self.player.position()), &config.spawn, &mut self.rng);
        let id = self.next_bot_id;
        self.next_bot_id = id.next();

        let bot = Bot::new(id, position, &config.enemy, self.now());
        world.place_actor(&bot.actor);
        self.bots.insert(id, bot);

        let tick = self.tick();
        self.push_event(GameEvent::bot_spawned(tick, id, position));
        debug!(tick, bot = %id, ?position, "bot spawned");
        Some(id)
    }

    /// Drop a bot slot and cancel its queued respawn.
    pub fn remove_bot<W: World + ?Sized>(&mut self, id: ActorId, world: &mut W) -> bool {
        if self.bots.remove(&id).is_none() {
            return false;
        }
        world.remove_actor(id);
        self.scheduler.cancel_where(|a| *a == ScheduledAction::RespawnBot(id));
        true
    }

    // =========================================================================
    // KILLS
    // =========================================================================

    /// Apply a kill reported by a shot. A victim that is already dead or
    /// gone is skipped.
    pub fn apply_kill<W: World + ?Sized>(
        &mut self,
        victim: ActorId,
        killer: ActorId,
        config: &SimConfig,
        world: &mut W,
    ) -> bool {
        if victim == ActorId::PLAYER {
            self.kill_player(Some(killer), config, world)
        } else {
            self.kill_bot(victim, killer, config, world)
        }
    }

    /// Kill the player: count the death and queue the respawn.
    pub fn kill_player<W: World + ?Sized>(
        &mut self,
        killer: Option<ActorId>,
        config: &SimConfig,
        world: &mut W,
    ) -> bool {
        if !self.player.die() {
            return false;
        }
        world.place_actor(&self.player.actor);
        self.deaths += 1;

        let tick = self.tick();
        self.push_event(GameEvent::actor_died(tick, ActorId::PLAYER, killer));
        self.push_event(GameEvent::score_changed(tick, self.kills, self.deaths));

        let fire_at = self.now() + config.spawn.player_respawn_delay as f64;
        self.scheduler.schedule(fire_at, ScheduledAction::RespawnPlayer);
        debug!(tick, killer = ?killer, deaths = self.deaths, "player died");
        true
    }

    /// Kill a bot: count the kill (whoever fired) and queue the respawn.
    pub fn kill_bot<W: World + ?Sized>(
        &mut self,
        victim: ActorId,
        killer: ActorId,
        config: &SimConfig,
        world: &mut W,
    ) -> bool {
        let Some(bot) = self.bots.get_mut(&victim) else {
            return false;
        };
        if !bot.die() {
            return false;
        }
        world.place_actor(&bot.actor);
        self.kills += 1;

        let tick = self.tick();
        self.push_event(GameEvent::actor_died(tick, victim, Some(killer)));
        self.push_event(GameEvent::kill_scored(tick, killer, victim, self.kills));
        self.push_event(GameEvent::score_changed(tick, self.kills, self.deaths));

        let fire_at = self.now() + config.spawn.bot_respawn_delay as f64;
        self.scheduler.schedule(fire_at, ScheduledAction::RespawnBot(victim));
        debug!(tick, bot = %victim, killer = %killer, kills = self.kills, "bot killed");
        true
    }

    // =========================================================================
    // SCHEDULED RESPAWNS
    // =========================================================================

    /// Fire every scheduled action due at the current time.
    pub fn run_due_actions<W: World + ?Sized>(&mut self, config: &SimConfig, world: &mut W) {
        for action in self.scheduler.drain_due(self.clock.now()) {
            match action {
                ScheduledAction::RespawnPlayer => self.respawn_player(config, world),
                ScheduledAction::RespawnBot(id) => self.respawn_bot(id, config, world),
            }
        }
    }

    fn respawn_player<W: World + ?Sized>(&mut self, config: &SimConfig, world: &mut W) {
        if self.player.is_alive() {
            return;
        }
        let position = self
            .spawns
            .player_spawn(self.living_bot_positions(), config.spawn.fallback_player_spawn);
        self.player.respawn(position, world);

        let tick = self.tick();
        self.push_event(GameEvent::actor_respawned(tick, ActorId::PLAYER, position));
        debug!(tick, ?position, "player respawned");
    }

    fn respawn_bot<W: World + ?Sized>(&mut self, id: ActorId, config: &SimConfig, world: &mut W) {
        match self.bots.get(&id) {
            Some(bot) if !bot.is_alive() => {}
            _ => return,
        }

        // Over the cap: the slot is retired instead of waiting forever
        if self.active_bot_count() >= config.spawn.max_enemies {
            self.bots.remove(&id);
            world.remove_actor(id);
            debug!(bot = %id, "bot slot retired at population cap");
            return;
        }

        let position = self.spawns.bot_spawn(Some(self.player.position()), &config.spawn, &mut self.rng);
        let now = self.now();
        if let Some(bot) = self.bots.get_mut(&id) {
            bot.respawn(position, now, world);
        }

        let tick = self.tick();
        self.push_event(GameEvent::actor_respawned(tick, id, position));
        debug!(tick, bot = %id, ?position, "bot respawned");
    }

    // =========================================================================
    // VERIFICATION / EVENTS
    // =========================================================================

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.clock.tick(), self.rng_seed, |hasher| {
            hasher.update_f64(self.clock.now());
            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);

            self.player.hash_into(hasher);

            // BTreeMap guarantees id order
            for bot in self.bots.values() {
                bot.actor.hash_into(hasher);
                hasher.update_opt_f64(bot.brain.last_attack_time);
                hasher.update_f32(bot.brain.strafe);
                hasher.update_f64(bot.brain.next_strafe_change);
            }

            for (fire_at, action) in self.scheduler.pending() {
                let (tag, id) = action.hash_tag();
                hasher.update_f64(fire_at);
                hasher.update_u8(tag);
                hasher.update_u32(id);
            }

            hasher.update_u32(self.next_bot_id.0);
            hasher.update_u32(self.kills);
            hasher.update_u32(self.deaths);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Hand every pending event to `sink`, oldest first.
    pub fn flush_events<S: EventSink + ?Sized>(&mut self, sink: &mut S) {
        for event in self.take_events() {
            sink.emit(event);
        }
    }
}

impl EventSink for MatchState {
    fn emit(&mut self, event: GameEvent) {
        self.push_event(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================
