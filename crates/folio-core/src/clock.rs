#![forbid(unsafe_code)]

//! Host-controlled time: a monotonic clock and a fire-and-forget timer queue.

use core::cmp::Ordering;
use core::time::Duration;
use std::collections::BinaryHeap;

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time. Time never moves backwards.
    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

struct Pending<M> {
    due: Duration,
    seq: u64,
    msg: M,
}

impl<M> PartialEq for Pending<M> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<M> Eq for Pending<M> {}

impl<M> PartialOrd for Pending<M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<M> Ord for Pending<M> {
    // Reversed so the max-heap pops the earliest (due, seq) first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Pending fixed-delay timers.
///
/// Timers are not cancellable. Timers sharing a due time fire in the order
/// they were scheduled.
pub struct TimerQueue<M> {
    heap: BinaryHeap<Pending<M>>,
    next_seq: u64,
}

impl<M> Default for TimerQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> core::fmt::Debug for TimerQueue<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.heap.len())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}

impl<M> TimerQueue<M> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `msg` to fire at absolute time `due`.
    pub fn schedule(&mut self, due: Duration, msg: M) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Pending { due, seq, msg });
    }

    /// Earliest pending due time.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.heap.peek().map(|p| p.due)
    }

    /// Pop the earliest timer if it is due on or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, M)> {
        if self.heap.peek()?.due > now {
            return None;
        }
        self.heap.pop().map(|p| (p.due, p.msg))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut clock = DeterministicClock::new();
        clock.set(ms(500));
        clock.set(ms(100));
        assert_eq!(clock.now(), ms(500));
        clock.advance(ms(20));
        assert_eq!(clock.now(), ms(520));
    }

    #[test]
    fn timers_pop_in_due_order() {
        let mut q = TimerQueue::new();
        q.schedule(ms(300), "late");
        q.schedule(ms(100), "early");
        q.schedule(ms(200), "middle");

        assert_eq!(q.next_deadline(), Some(ms(100)));
        assert_eq!(q.pop_due(ms(250)), Some((ms(100), "early")));
        assert_eq!(q.pop_due(ms(250)), Some((ms(200), "middle")));
        assert_eq!(q.pop_due(ms(250)), None);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn same_deadline_fires_in_schedule_order() {
        let mut q = TimerQueue::new();
        for tag in ["a", "b", "c"] {
            q.schedule(ms(300), tag);
        }
        let fired: Vec<_> = std::iter::from_fn(|| q.pop_due(ms(300)).map(|(_, m)| m)).collect();
        assert_eq!(fired, vec!["a", "b", "c"]);
        assert!(q.is_empty());
    }
}
