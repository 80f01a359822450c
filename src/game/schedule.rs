//! Timed Actions
//!
//! Fire-at-time queue polled by the tick. Entries with equal fire times come
//! out in scheduling order, and any entry can be cancelled before it fires.

use serde::{Serialize, Deserialize};

/// Handle returned by [`Scheduler::schedule`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Entry<T> {
    id: TimerId,
    fire_at: f64,
    action: T,
}

/// Queue of actions ordered by fire time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scheduler<T> {
    next_id: u64,
    /// Sorted by (fire_at, id)
    entries: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Empty queue.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Queue `action` to fire once the clock reaches `fire_at`.
    pub fn schedule(&mut self, fire_at: f64, action: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        // Later ids go after equal fire times
        let idx = self.entries.partition_point(|e| e.fire_at <= fire_at);
        self.entries.insert(idx, Entry { id, fire_at, action });
        id
    }

    /// Cancel one entry. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Cancel every entry whose action matches. Returns how many were removed.
    pub fn cancel_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|e| !predicate(&e.action));
        before - self.entries.len()
    }

    /// Remove and return every action due at `now`, in fire order.
    pub fn drain_due(&mut self, now: f64) -> Vec<T> {
        let due = self.entries.partition_point(|e| e.fire_at <= now);
        self.entries.drain(..due).map(|e| e.action).collect()
    }

    /// Fire time of the earliest entry.
    pub fn next_fire_time(&self) -> Option<f64> {
        self.entries.first().map(|e| e.fire_at)
    }

    /// Iterate pending `(fire_at, action)` in fire order.
    pub fn pending(&self) -> impl Iterator<Item = (f64, &T)> {
        self.entries.iter().map(|e| (e.fire_at, &e.action))
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
