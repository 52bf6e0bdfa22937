//! Deterministic timer queue with handle-based cancellation.
//!
//! Deadlines are absolute simulation times. Entries sharing a deadline fire in
//! the order they were scheduled.

use std::{
    collections::{BTreeMap, HashMap},
    time::Duration,
};

/// Opaque handle identifying a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Queue of payloads waiting for a simulation deadline.
#[derive(Clone, Debug)]
pub struct TimerQueue<T> {
    entries: BTreeMap<(Duration, u64), T>,
    deadlines: HashMap<TimerHandle, Duration>,
    next_sequence: u64,
}

impl<T> TimerQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            deadlines: HashMap::new(),
            next_sequence: 0,
        }
    }

    /// Schedules `payload` to become due at the absolute time `at`.
    pub fn schedule(&mut self, at: Duration, payload: T) -> TimerHandle {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        let handle = TimerHandle(sequence);
        let _ = self.entries.insert((at, sequence), payload);
        let _ = self.deadlines.insert(handle, at);
        handle
    }

    /// Cancels a pending timer, returning its payload.
    ///
    /// Cancelling a handle that already fired or was cancelled returns `None`.
    pub fn cancel(&mut self, handle: TimerHandle) -> Option<T> {
        let at = self.deadlines.remove(&handle)?;
        self.entries.remove(&(at, handle.0))
    }

    /// Reports whether the handle still refers to a pending timer.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.deadlines.contains_key(&handle)
    }

    /// Removes and returns the earliest timer whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerHandle, T)> {
        let (&(at, sequence), _) = self.entries.iter().next()?;
        if at > now {
            return None;
        }
        let payload = self.entries.remove(&(at, sequence))?;
        let handle = TimerHandle(sequence);
        let _ = self.deadlines.remove(&handle);
        Some((handle, payload))
    }

    /// Removes every due timer in firing order.
    pub fn drain_due(&mut self, now: Duration) -> Vec<T> {
        let mut due = Vec::new();
        while let Some((_, payload)) = self.pop_due(now) {
            due.push(payload);
        }
        due
    }

    /// Earliest pending deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.keys().next().map(|(at, _)| *at)
    }

    /// Drops every pending timer.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.deadlines.clear();
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no timer is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
