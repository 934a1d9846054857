//! Discrete-event virtual clock.
//!
//! [`EventQueue`] holds future events keyed by simulation time and pops
//! them in order, advancing the clock to each event's time. Events
//! scheduled for the same instant pop in the order they were scheduled.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Duration;

/// Ordering key: time first, then scheduling order.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct EventKey {
    time: Duration,
    sequence: u64,
}

impl Ord for EventKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.time.cmp(&other.time) {
            Ordering::Equal => {}
            ord => return ord,
        }
        self.sequence.cmp(&other.sequence)
    }
}

impl PartialOrd for EventKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A time-ordered queue of pending events and the current virtual time.
///
/// ```
/// use std::time::Duration;
/// use fcdgym_engine::EventQueue;
///
/// let mut q = EventQueue::new();
/// q.schedule_after(Duration::from_secs(2), "late");
/// q.schedule_after(Duration::from_secs(1), "early");
/// assert_eq!(q.pop(), Some((Duration::from_secs(1), "early")));
/// assert_eq!(q.now(), Duration::from_secs(1));
/// ```
#[derive(Debug)]
pub struct EventQueue<E> {
    events: BTreeMap<EventKey, E>,
    now: Duration,
    next_sequence: u64,
}

impl<E> EventQueue<E> {
    /// An empty queue at time zero.
    pub fn new() -> Self {
        Self {
            events: BTreeMap::new(),
            now: Duration::ZERO,
            next_sequence: 0,
        }
    }

    /// Current virtual time: the time of the last popped event.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `event` at absolute time `at`. A time in the past is
    /// treated as now.
    pub fn schedule(&mut self, at: Duration, event: E) {
        let key = EventKey {
            time: at.max(self.now),
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.events.insert(key, event);
    }

    /// Schedule `event` `delay` after now.
    pub fn schedule_after(&mut self, delay: Duration, event: E) {
        self.schedule(self.now + delay, event);
    }

    /// Remove the earliest event and advance the clock to its time.
    pub fn pop(&mut self) -> Option<(Duration, E)> {
        let (key, event) = self.events.pop_first()?;
        self.now = key.time;
        Some((key.time, event))
    }

    /// Time of the earliest pending event.
    pub fn peek_time(&self) -> Option<Duration> {
        self.events.keys().next().map(|k| k.time)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every pending event. The clock is unchanged.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_time_is_fifo() {
        let mut q = EventQueue::new();
        let t = Duration::from_millis(100);
        q.schedule(t, 'a');
        q.schedule(t, 'b');
        q.schedule(t, 'c');
        let order: Vec<char> = std::iter::from_fn(|| q.pop().map(|(_, e)| e)).collect();
        assert_eq!(order, vec!['a', 'b', 'c']);
    }

    #[test]
    fn past_events_run_now() {
        let mut q = EventQueue::new();
        q.schedule(Duration::from_secs(5), 1);
        q.pop();
        q.schedule(Duration::from_secs(1), 2);
        assert_eq!(q.peek_time(), Some(Duration::from_secs(5)));
        assert_eq!(q.pop(), Some((Duration::from_secs(5), 2)));
    }

    #[test]
    fn clock_only_moves_on_pop() {
        let mut q = EventQueue::new();
        q.schedule_after(Duration::from_secs(3), ());
        assert_eq!(q.now(), Duration::ZERO);
        assert_eq!(q.len(), 1);
        q.pop();
        assert_eq!(q.now(), Duration::from_secs(3));
        assert!(q.is_empty());
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn key_orders_time_before_sequence() {
        let early = EventKey {
            time: Duration::from_secs(1),
            sequence: 9,
        };
        let late = EventKey {
            time: Duration::from_secs(2),
            sequence: 0,
        };
        assert!(early < late);
    }
}
