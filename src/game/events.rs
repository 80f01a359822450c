//! Game Events
//!
//! Events generated during simulation for presentation, logging and replay
//! verification. Events are emitted in causal order; [`GameEvent::order_key`]
//! gives a deterministic presentation order when a consumer needs one.

use glam::Vec3;
use serde::{Serialize, Deserialize};

use crate::game::actor::ActorId;
use crate::game::config::BeamColor;

/// Priority for event presentation order.
///
/// Lower value = presented first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Deaths first
    Death = 0,
    /// Then score changes
    Score = 1,
    /// Then spawns and respawns
    Spawn = 2,
    /// Then cosmetic beams
    Beam = 3,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// A hitscan beam was fired
    BeamFired {
        /// Who fired
        shooter: ActorId,
        /// Beam start (muzzle)
        start: Vec3,
        /// Hit point or end of range
        end: Vec3,
        /// Beam color
        color: BeamColor,
        /// How long the beam stays visible (s)
        duration: f32,
        /// Actor hit, if any
        hit: Option<ActorId>,
    },

    /// A bot was killed and the kill counter went up
    KillScored {
        /// Who fired the shot
        killer: ActorId,
        /// Bot that died
        victim: ActorId,
        /// Kill counter after this kill
        kills: u32,
    },

    /// An actor died
    ActorDied {
        /// Who died
        victim: ActorId,
        /// Who fired the shot
        killer: Option<ActorId>,
    },

    /// A dead actor came back
    ActorRespawned {
        /// Who respawned
        actor: ActorId,
        /// Where
        position: Vec3,
    },

    /// A new bot joined the match
    BotSpawned {
        /// New bot id
        bot: ActorId,
        /// Where
        position: Vec3,
    },

    /// Kill or death counter changed
    ScoreChanged {
        /// Bots killed
        kills: u32,
        /// Player deaths
        deaths: u32,
    },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Presentation priority
    pub priority: EventPriority,

    /// Actor involved (for tie-breaking)
    pub actor: Option<ActorId>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, priority: EventPriority, data: GameEventData) -> Self {
        let actor = match &data {
            GameEventData::BeamFired { shooter, .. } => Some(*shooter),
            GameEventData::KillScored { victim, .. } => Some(*victim),
            GameEventData::ActorDied { victim, .. } => Some(*victim),
            GameEventData::ActorRespawned { actor, .. } => Some(*actor),
            GameEventData::BotSpawned { bot, .. } => Some(*bot),
            GameEventData::ScoreChanged { .. } => None,
        };

        Self {
            tick,
            priority,
            actor,
            data,
        }
    }

    /// Create beam fired event.
    pub fn beam_fired(
        tick: u32,
        shooter: ActorId,
        start: Vec3,
        end: Vec3,
        color: BeamColor,
        duration: f32,
        hit: Option<ActorId>,
    ) -> Self {
        Self::new(
            tick,
            EventPriority::Beam,
            GameEventData::BeamFired { shooter, start, end, color, duration, hit },
        )
    }

    /// Create kill scored event.
    pub fn kill_scored(tick: u32, killer: ActorId, victim: ActorId, kills: u32) -> Self {
        Self::new(tick, EventPriority::Score, GameEventData::KillScored { killer, victim, kills })
    }

    /// Create actor died event.
    pub fn actor_died(tick: u32, victim: ActorId, killer: Option<ActorId>) -> Self {
        Self::new(tick, EventPriority::Death, GameEventData::ActorDied { victim, killer })
    }

    /// Create actor respawned event.
    pub fn actor_respawned(tick: u32, actor: ActorId, position: Vec3) -> Self {
        Self::new(tick, EventPriority::Spawn, GameEventData::ActorRespawned { actor, position })
    }

    /// Create bot spawned event.
    pub fn bot_spawned(tick: u32, bot: ActorId, position: Vec3) -> Self {
        Self::new(tick, EventPriority::Spawn, GameEventData::BotSpawned { bot, position })
    }

    /// Create score changed event.
    pub fn score_changed(tick: u32, kills: u32, deaths: u32) -> Self {
        Self::new(tick, EventPriority::Score, GameEventData::ScoreChanged { kills, deaths })
    }

    /// Sort key: tick, then priority, then actor id.
    pub fn order_key(&self) -> (u32, EventPriority, Option<ActorId>) {
        (self.tick, self.priority, self.actor)
    }
}

/// Stable sort into presentation order.
pub fn sort_for_presentation(events: &mut [GameEvent]) {
    events.sort_by_key(GameEvent::order_key);
}

// =============================================================================
// EVENT SINK
// =============================================================================

/// Receiver for simulation events.
pub trait EventSink {
    /// Accept one event.
    fn emit(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Sink that only counts, for hosts that do not present anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct CountingSink {
    /// Events received
    pub count: usize,
}

impl EventSink for CountingSink {
    fn emit(&mut self, _event: GameEvent) {
        self.count += 1;
    }
}
