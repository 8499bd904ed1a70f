//! Pending timer storage.
//!
//! The registry is a passive data structure: nothing fires on its own. The
//! owner advances it with [`TimerRegistry::pop_due`], which removes an entry
//! *before* handing its job back. Jobs can therefore schedule or cancel other
//! timers while they run without disturbing anything mid-iteration.

use std::collections::BTreeSet;
use std::time::Duration;

use hashbrown::HashMap;

use super::key::{IdAllocator, TimerKey};

#[derive(Debug)]
struct Pending<J> {
    due: Duration,
    seq: u64,
    job: J,
}

/// Owns every pending deferred job, keyed by [`TimerKey`].
///
/// Time is an offset from an arbitrary origin chosen by the owner; the
/// registry only requires that it never goes backwards.
#[derive(Debug)]
pub struct TimerRegistry<J> {
    entries: HashMap<TimerKey, Pending<J>>,
    /// Firing order: (due, insertion sequence, key)
    queue: BTreeSet<(Duration, u64, TimerKey)>,
    ids: IdAllocator,
    next_seq: u64,
    now: Duration,
}

impl<J> TimerRegistry<J> {
    pub fn new() -> Self {
        Self::with_allocator(IdAllocator::new())
    }

    pub fn with_allocator(ids: IdAllocator) -> Self {
        Self {
            entries: HashMap::new(),
            queue: BTreeSet::new(),
            ids,
            next_seq: 0,
            now: Duration::ZERO,
        }
    }

    /// Current registry time; new timers are scheduled relative to it.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move the clock forward. Earlier times are ignored.
    pub fn advance_clock(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Allocate an engine id that no pending timer uses.
    pub fn allocate_id(&mut self) -> u64 {
        let entries = &self.entries;
        self.ids
            .allocate(|id| entries.contains_key(&TimerKey::Engine(id)))
    }

    /// Schedule `job` to fire `delay` from now under `key`.
    ///
    /// A pending timer already using `key` is cancelled and replaced.
    pub fn schedule(&mut self, key: TimerKey, delay: Duration, job: J) -> TimerKey {
        if self.cancel(&key) {
            tracing::debug!(target: "guide", timer = %key, "Replacing pending timer");
        }

        let due = self.now + delay;
        let seq = self.next_seq;
        self.next_seq += 1;

        self.queue.insert((due, seq, key));
        self.entries.insert(key, Pending { due, seq, job });
        key
    }

    /// Schedule under a freshly allocated engine id.
    pub fn schedule_engine(&mut self, delay: Duration, job: J) -> TimerKey {
        let key = TimerKey::Engine(self.allocate_id());
        self.schedule(key, delay, job)
    }

    /// Cancel a pending timer. Returns false if nothing was pending under `key`.
    pub fn cancel(&mut self, key: &TimerKey) -> bool {
        match self.entries.remove(key) {
            Some(pending) => {
                self.queue.remove(&(pending.due, pending.seq, *key));
                true
            }
            None => false,
        }
    }

    /// Cancel everything. Returns how many timers were pending.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.queue.clear();
        count
    }

    /// Remove and return the earliest job due at or before `now`.
    ///
    /// The clock moves to the job's due time, so anything the job schedules
    /// is relative to when it fired rather than to `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerKey, J)> {
        let &(due, _, key) = self.queue.first()?;
        if due > now {
            return None;
        }
        self.queue.pop_first();
        let pending = self.entries.remove(&key)?;
        self.advance_clock(due);
        Some((key, pending.job))
    }

    /// When the next timer is due, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.first().map(|&(due, _, _)| due)
    }

    /// Absolute due time of a pending timer.
    pub fn due(&self, key: &TimerKey) -> Option<Duration> {
        self.entries.get(key).map(|p| p.due)
    }

    pub fn get(&self, key: &TimerKey) -> Option<&J> {
        self.entries.get(key).map(|p| &p.job)
    }

    pub fn contains(&self, key: &TimerKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &TimerKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<J> Default for TimerRegistry<J> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn drain(registry: &mut TimerRegistry<&'static str>, now: Duration) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some((_, job)) = registry.pop_due(now) {
            fired.push(job);
        }
        fired
    }

    #[test]
    fn test_fires_in_due_order_not_insert_order() {
        let mut registry = TimerRegistry::new();
        registry.schedule(TimerKey::Author(1), ms(300), "slow");
        registry.schedule(TimerKey::Author(2), ms(100), "fast");
        registry.schedule_engine(ms(200), "middle");

        assert!(drain(&mut registry, ms(50)).is_empty());
        assert_eq!(drain(&mut registry, ms(300)), vec!["fast", "middle", "slow"]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_equal_due_times_keep_insert_order() {
        let mut registry = TimerRegistry::new();
        registry.schedule_engine(ms(0), "first");
        registry.schedule_engine(ms(0), "second");
        assert_eq!(drain(&mut registry, ms(0)), vec!["first", "second"]);
    }

    #[test]
    fn test_cancel_removes_only_target() {
        let mut registry = TimerRegistry::new();
        registry.schedule(TimerKey::Author(1), ms(100), "a");
        registry.schedule(TimerKey::Author(2), ms(100), "b");

        assert!(registry.cancel(&TimerKey::Author(1)));
        assert!(!registry.cancel(&TimerKey::Author(1)));
        assert!(!registry.cancel(&TimerKey::Author(99)));

        assert_eq!(registry.len(), 1);
        assert_eq!(drain(&mut registry, ms(100)), vec!["b"]);
    }

    #[test]
    fn test_reschedule_same_author_id_replaces() {
        let mut registry = TimerRegistry::new();
        registry.schedule(TimerKey::Author(5), ms(100), "old");
        registry.schedule(TimerKey::Author(5), ms(400), "new");

        assert_eq!(registry.len(), 1);
        assert!(drain(&mut registry, ms(100)).is_empty());
        assert_eq!(drain(&mut registry, ms(400)), vec!["new"]);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut registry = TimerRegistry::new();
        for i in 0..10 {
            registry.schedule(TimerKey::Author(i), ms(u64::from(i) * 10), "x");
            registry.schedule_engine(ms(5), "y");
        }
        assert_eq!(registry.clear(), 20);
        assert!(registry.is_empty());
        assert_eq!(registry.next_deadline(), None);
        assert!(drain(&mut registry, ms(10_000)).is_empty());
    }

    #[test]
    fn test_schedule_during_drain_is_relative_to_fire_time() {
        let mut registry = TimerRegistry::new();
        registry.schedule(TimerKey::Author(1), ms(100), "outer");

        let (_, job) = registry.pop_due(ms(1000)).unwrap();
        assert_eq!(job, "outer");
        assert_eq!(registry.now(), ms(100));

        let key = registry.schedule_engine(ms(50), "inner");
        assert_eq!(registry.due(&key), Some(ms(150)));
        assert_eq!(drain(&mut registry, ms(1000)), vec!["inner"]);
    }

    #[test]
    fn test_engine_ids_are_unique_while_pending() {
        let mut registry = TimerRegistry::with_allocator(IdAllocator::starting_at(3));
        let a = registry.schedule_engine(ms(10), "a");
        let b = registry.schedule_engine(ms(10), "b");
        let c = registry.schedule_engine(ms(10), "c");
        // Wrapped past zero and u64::MAX is free
        let d = registry.schedule_engine(ms(10), "d");

        assert_eq!(a, TimerKey::Engine(3));
        assert_eq!(b, TimerKey::Engine(2));
        assert_eq!(c, TimerKey::Engine(1));
        assert_eq!(d, TimerKey::Engine(u64::MAX));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_clock_never_goes_backwards() {
        let mut registry: TimerRegistry<()> = TimerRegistry::new();
        registry.advance_clock(ms(500));
        registry.advance_clock(ms(100));
        assert_eq!(registry.now(), ms(500));
    }
}
