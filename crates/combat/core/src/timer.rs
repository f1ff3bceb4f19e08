//! Cancellable one-shot timers.
//!
//! The arena never sleeps. It asks a [`Scheduler`] to deliver a [`Wakeup`]
//! after a delay and is handed the wakeup back by whoever drives time: the
//! runtime's tokio worker, or a test stepping a [`VirtualClock`].

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::state::ActorId;

/// Handle of one armed timer. Ids are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// What a timer does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Wakeup {
    /// The actor's in-flight action runs to completion.
    ActionComplete(ActorId),
    /// The actor's next autonomous decision cycle.
    Decide(ActorId),
}

impl Wakeup {
    pub fn actor(&self) -> ActorId {
        match self {
            Wakeup::ActionComplete(actor) | Wakeup::Decide(actor) => *actor,
        }
    }
}

/// Arms delayed wakeups.
pub trait Scheduler {
    /// Arms a one-shot wakeup after `delay`.
    fn schedule_after(&mut self, delay: Duration, wakeup: Wakeup) -> TimerId;

    /// Disarms a timer. Cancelling a fired, cancelled, or unknown timer is a
    /// no-op.
    fn cancel(&mut self, timer: TimerId);
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
    fn schedule_after(&mut self, delay: Duration, wakeup: Wakeup) -> TimerId {
        (**self).schedule_after(delay, wakeup)
    }

    fn cancel(&mut self, timer: TimerId) {
        (**self).cancel(timer);
    }
}

/// Deterministic, manually advanced time source.
///
/// Timers due at the same instant fire in the order they were armed.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, TimerId), Wakeup>,
    deadlines: HashMap<TimerId, Duration>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_pending(&self, timer: TimerId) -> bool {
        self.deadlines.contains_key(&timer)
    }

    /// Deadline of the earliest armed timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Removes the earliest timer due at or before `until`, moving the clock
    /// to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, Wakeup)> {
        let (&(deadline, timer), _) = self.queue.first_key_value()?;
        if deadline > until {
            return None;
        }
        let wakeup = self.queue.remove(&(deadline, timer))?;
        self.deadlines.remove(&timer);
        self.now = self.now.max(deadline);
        Some((timer, wakeup))
    }

    /// Moves the clock forward without firing anything. Never moves backward.
    pub fn advance_to(&mut self, instant: Duration) {
        self.now = self.now.max(instant);
    }
}

impl Scheduler for VirtualClock {
    fn schedule_after(&mut self, delay: Duration, wakeup: Wakeup) -> TimerId {
        let timer = TimerId(self.next_id);
        self.next_id += 1;

        let deadline = self.now + delay;
        self.queue.insert((deadline, timer), wakeup);
        self.deadlines.insert(timer, deadline);
        timer
    }

    fn cancel(&mut self, timer: TimerId) {
        if let Some(deadline) = self.deadlines.remove(&timer) {
            self.queue.remove(&(deadline, timer));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    #[test]
    fn fires_in_deadline_then_arming_order() {
        let mut clock = VirtualClock::new();
        let late = clock.schedule_after(3 * SEC, Wakeup::Decide(ActorId(1)));
        let first = clock.schedule_after(SEC, Wakeup::Decide(ActorId(2)));
        let second = clock.schedule_after(SEC, Wakeup::Decide(ActorId(3)));

        assert_eq!(clock.pop_due(5 * SEC).map(|(t, _)| t), Some(first));
        assert_eq!(clock.pop_due(5 * SEC).map(|(t, _)| t), Some(second));
        assert_eq!(clock.now(), SEC);
        assert_eq!(clock.pop_due(5 * SEC).map(|(t, _)| t), Some(late));
        assert_eq!(clock.now(), 3 * SEC);
        assert!(clock.pop_due(5 * SEC).is_none());
    }

    #[test]
    fn does_not_fire_before_deadline() {
        let mut clock = VirtualClock::new();
        clock.schedule_after(2 * SEC, Wakeup::ActionComplete(ActorId(1)));

        assert!(clock.pop_due(SEC).is_none());
        assert_eq!(clock.next_deadline(), Some(2 * SEC));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut clock = VirtualClock::new();
        let timer = clock.schedule_after(SEC, Wakeup::ActionComplete(ActorId(1)));

        clock.cancel(timer);
        clock.cancel(timer);

        assert!(!clock.is_pending(timer));
        assert!(clock.pop_due(10 * SEC).is_none());
    }

    #[test]
    fn cancel_after_firing_is_a_no_op() {
        let mut clock = VirtualClock::new();
        let timer = clock.schedule_after(SEC, Wakeup::ActionComplete(ActorId(1)));
        let other = clock.schedule_after(2 * SEC, Wakeup::ActionComplete(ActorId(2)));

        assert!(clock.pop_due(SEC).is_some());
        clock.cancel(timer);

        assert!(clock.is_pending(other));
        assert_eq!(clock.pending_count(), 1);
    }

    #[test]
    fn delays_are_relative_to_now() {
        let mut clock = VirtualClock::new();
        clock.advance_to(10 * SEC);
        clock.schedule_after(SEC, Wakeup::Decide(ActorId(1)));

        assert_eq!(clock.next_deadline(), Some(11 * SEC));
    }
}
