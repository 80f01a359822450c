//! Input Capture and Normalization
//!
//! The simulation consumes one [`Intent`] per tick. Hosts that only know which
//! buttons are held can feed [`RawInput`] snapshots through an [`InputTracker`],
//! which derives the edge-triggered fields (jump press, fire press, the
//! double-tap-sprint dash request).
//!
//! [`IntentLog`] records intents delta-compressed for replay.

use glam::Vec2;
use serde::{Serialize, Deserialize};

// =============================================================================
// INPUT TYPES
// =============================================================================

/// Everything the player asks for during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Strafe (x, right positive) and forward (y) axes.
    /// Diagonals longer than 1 are normalized on construction.
    pub move_axes: Vec2,
    /// Sprint held
    pub sprint: bool,
    /// Jump went down this tick
    pub jump_pressed: bool,
    /// Jump is held
    pub jump_held: bool,
    /// Dash requested this tick
    pub dash_requested: bool,
    /// Fire went down this tick
    pub fire_pressed: bool,
    /// Look delta in look units (x yaw, y pitch)
    pub look_delta: Vec2,
}

impl Intent {
    /// Idle intent.
    pub const IDLE: Intent = Intent {
        move_axes: Vec2::ZERO,
        sprint: false,
        jump_pressed: false,
        jump_held: false,
        dash_requested: false,
        fire_pressed: false,
        look_delta: Vec2::ZERO,
    };

    /// Intent with only movement set.
    pub fn with_movement(x: f32, y: f32) -> Self {
        Self {
            move_axes: normalize_axes(Vec2::new(x, y)),
            ..Self::IDLE
        }
    }

    /// Check if this is an idle frame (no input at all).
    #[inline]
    pub fn is_idle(&self) -> bool {
        *self == Self::IDLE
    }
}

/// Held-button snapshot for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    /// Strafe/forward axes
    pub move_axes: Vec2,
    /// Sprint key held
    pub sprint_held: bool,
    /// Jump key held
    pub jump_held: bool,
    /// Fire button held
    pub fire_held: bool,
    /// Look delta accumulated since the previous snapshot
    pub look_delta: Vec2,
}

/// Scale axes down to unit length when a diagonal overshoots.
#[inline]
pub fn normalize_axes(axes: Vec2) -> Vec2 {
    if axes.length_squared() > 1.0 {
        axes.normalize()
    } else {
        axes
    }
}

// =============================================================================
// EDGE TRACKING
// =============================================================================

/// Turns held-button snapshots into intents.
///
/// A dash is requested when sprint goes down twice within the double-tap
/// window. Every press, including one that triggers a dash, starts a new
/// window, so a quick third tap requests again.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputTracker {
    prev: RawInput,
    last_sprint_press: Option<f64>,
}

impl InputTracker {
    /// Fresh tracker with nothing held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the intent for the tick at simulated time `now`.
    pub fn update(&mut self, raw: RawInput, now: f64, double_tap_window: f32) -> Intent {
        let sprint_down = raw.sprint_held && !self.prev.sprint_held;

        let mut dash_requested = false;
        if sprint_down {
            dash_requested = self
                .last_sprint_press
                .map_or(false, |last| now - last <= double_tap_window as f64);
            self.last_sprint_press = Some(now);
        }

        let intent = Intent {
            move_axes: normalize_axes(raw.move_axes),
            sprint: raw.sprint_held,
            jump_pressed: raw.jump_held && !self.prev.jump_held,
            jump_held: raw.jump_held,
            dash_requested,
            fire_pressed: raw.fire_held && !self.prev.fire_held,
            look_delta: raw.look_delta,
        };

        self.prev = raw;
        intent
    }
}

// =============================================================================
// INTENT LOG
// =============================================================================

/// One change point in an [`IntentLog`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentDelta {
    /// Tick index where this intent began
    pub tick: u32,
    /// The new intent
    pub intent: Intent,
}

/// Complete intent recording for one match.
///
/// Only ticks where the intent changed are stored. Together with the seed and
/// the fixed step this is enough to replay the match bit-for-bit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntentLog {
    /// RNG seed used for this match
    pub rng_seed: u64,

    /// Fixed step every tick used (s)
    pub dt: f32,

    /// Number of ticks recorded
    pub tick_count: u32,

    deltas: Vec<IntentDelta>,

    /// Last recorded intent (for delta comparison)
    #[serde(skip)]
    last: Intent,
}

impl IntentLog {
    /// Create an empty log.
    pub fn new(rng_seed: u64, dt: f32) -> Self {
        Self {
            rng_seed,
            dt,
            tick_count: 0,
            deltas: Vec::with_capacity(256),
            last: Intent::IDLE,
        }
    }

    /// Record the intent for tick index `tick` (0-based, sequential).
    pub fn record(&mut self, tick: u32, intent: Intent) {
        self.tick_count = self.tick_count.max(tick + 1);

        if intent != self.last {
            self.deltas.push(IntentDelta { tick, intent });
            self.last = intent;
        }
    }

    /// Intent in effect at tick index `tick`.
    pub fn intent_at(&self, tick: u32) -> Intent {
        let idx = self.deltas.partition_point(|d| d.tick <= tick);
        if idx == 0 {
            Intent::IDLE
        } else {
            self.deltas[idx - 1].intent
        }
    }

    /// Stored change points.
    pub fn deltas(&self) -> &[IntentDelta] {
        &self.deltas
    }

    /// Number of change points.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Iterate `(tick, intent)` for every recorded tick.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            log: self,
            current_tick: 0,
            delta_idx: 0,
            current: Intent::IDLE,
        }
    }
}

/// Iterator for replaying intents tick-by-tick.
pub struct ReplayIterator<'a> {
    log: &'a IntentLog,
    current_tick: u32,
    delta_idx: usize,
    current: Intent,
}

impl<'a> Iterator for ReplayIterator<'a> {
    type Item = (u32, Intent);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_tick >= self.log.tick_count {
            return None;
        }

        while let Some(delta) = self.log.deltas.get(self.delta_idx) {
            if delta.tick > self.current_tick {
                break;
            }
            self.current = delta.intent;
            self.delta_idx += 1;
        }

        let item = (self.current_tick, self.current);
        self.current_tick += 1;
        Some(item)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: f32 = 0.3;

    fn held(sprint: bool, jump: bool, fire: bool) -> RawInput {
        RawInput {
            sprint_held: sprint,
            jump_held: jump,
            fire_held: fire,
            ..RawInput::default()
        }
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let intent = Intent::with_movement(1.0, 1.0);
        assert!((intent.move_axes.length() - 1.0).abs() < 1e-5);

        let analog = Intent::with_movement(0.3, 0.0);
        assert_eq!(analog.move_axes, Vec2::new(0.3, 0.0));
    }

    #[test]
    fn test_jump_and_fire_are_edges() {
        let mut tracker = InputTracker::new();

        let a = tracker.update(held(false, true, true), 0.0, WINDOW);
        assert!(a.jump_pressed && a.jump_held && a.fire_pressed);

        let b = tracker.update(held(false, true, true), 0.1, WINDOW);
        assert!(!b.jump_pressed && b.jump_held && !b.fire_pressed);

        tracker.update(held(false, false, false), 0.2, WINDOW);
        let c = tracker.update(held(false, true, false), 0.3, WINDOW);
        assert!(c.jump_pressed);
    }

    #[test]
    fn test_double_tap_sprint_requests_dash() {
        let mut tracker = InputTracker::new();

        assert!(!tracker.update(held(true, false, false), 1.0, WINDOW).dash_requested);
        tracker.update(held(false, false, false), 1.1, WINDOW);
        let second = tracker.update(held(true, false, false), 1.2, WINDOW);
        assert!(second.dash_requested);
        assert!(second.sprint);

        // Holding does not re-trigger
        assert!(!tracker.update(held(true, false, false), 1.25, WINDOW).dash_requested);
    }

    #[test]
    fn test_slow_double_tap_does_not_dash() {
        let mut tracker = InputTracker::new();

        tracker.update(held(true, false, false), 1.0, WINDOW);
        tracker.update(held(false, false, false), 1.1, WINDOW);
        assert!(!tracker.update(held(true, false, false), 1.5, WINDOW).dash_requested);

        // ...but that slow press starts a new pair
        tracker.update(held(false, false, false), 1.6, WINDOW);
        assert!(tracker.update(held(true, false, false), 1.7, WINDOW).dash_requested);
    }

    #[test]
    fn test_quick_third_tap_requests_again() {
        let mut tracker = InputTracker::new();

        tracker.update(held(true, false, false), 1.0, WINDOW);
        tracker.update(held(false, false, false), 1.05, WINDOW);
        assert!(tracker.update(held(true, false, false), 1.1, WINDOW).dash_requested);
        tracker.update(held(false, false, false), 1.15, WINDOW);
        assert!(tracker.update(held(true, false, false), 1.2, WINDOW).dash_requested);
    }

    #[test]
    fn test_log_delta_compression() {
        let mut log = IntentLog::new(42, 1.0 / 60.0);
        let forward = Intent::with_movement(0.0, 1.0);

        for tick in 0..4 {
            log.record(tick, forward);
        }
        assert_eq!(log.delta_count(), 1);

        log.record(4, Intent::with_movement(-1.0, 0.0));
        assert_eq!(log.delta_count(), 2);
        assert_eq!(log.tick_count, 5);
    }

    #[test]
    fn test_log_intent_at() {
        let mut log = IntentLog::new(42, 1.0 / 60.0);
        let a = Intent::with_movement(0.5, 0.0);
        let b = Intent::with_movement(-0.5, 0.0);

        log.record(10, a);
        log.record(20, b);

        assert!(log.intent_at(5).is_idle());
        assert_eq!(log.intent_at(10), a);
        assert_eq!(log.intent_at(15), a);
        assert_eq!(log.intent_at(20), b);
        assert_eq!(log.intent_at(99), b);
    }

    #[test]
    fn test_replay_iterator() {
        let mut log = IntentLog::new(7, 1.0 / 60.0);
        let walk = Intent::with_movement(0.0, 1.0);
        let jump = Intent { jump_pressed: true, jump_held: true, ..walk };

        log.record(0, walk);
        log.record(1, walk);
        log.record(2, jump);
        log.record(3, walk);

        let replay: Vec<_> = log.replay_iter().collect();
        assert_eq!(replay.len(), 4);
        assert_eq!(replay[1], (1, walk));
        assert_eq!(replay[2], (2, jump));
        assert_eq!(replay[3], (3, walk));
    }

    #[test]
    fn test_log_json_roundtrip_replays_identically() {
        let mut log = IntentLog::new(9, 0.02);
        log.record(0, Intent::with_movement(1.0, 0.0));
        log.record(3, Intent { fire_pressed: true, ..Intent::IDLE });
        log.record(4, Intent::IDLE);

        let json = serde_json::to_string(&log).unwrap();
        let back: IntentLog = serde_json::from_str(&json).unwrap();

        let a: Vec<_> = log.replay_iter().collect();
        let b: Vec<_> = back.replay_iter().collect();
        assert_eq!(a, b);
    }
}
