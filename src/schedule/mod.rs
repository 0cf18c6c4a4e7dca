//! Cooperative timer queue driving the garden's periodic work.
//!
//! Timers live in a min-heap ordered by `(due, kind priority, sequence)`.
//! Timers due at the same instant fire growth first, then reconcile, then
//! stats, then reminders, however they were re-armed. The owner pops
//! every due timer in one serialized step and runs each to completion before
//! the next; nothing here spawns or sleeps.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::Timestamp;

/// Independently phased periodic schedules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    GrowthTick,
    Reconcile,
    ReminderScan,
    StatsSample,
}

impl TimerKind {
    /// Tie-break among timers due at the same instant; lower runs first.
    fn priority(self) -> u8 {
        match self {
            TimerKind::GrowthTick => 0,
            TimerKind::Reconcile => 1,
            TimerKind::StatsSample => 2,
            TimerKind::ReminderScan => 3,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Timer {
    pub due: Timestamp,
    pub sequence: u64,
    pub kind: TimerKind,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed: BinaryHeap is a max-heap
        other
            .due
            .0
            .total_cmp(&self.due.0)
            .then_with(|| other.kind.priority().cmp(&self.kind.priority()))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Timer>,
    next_sequence: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer at `due`.
    pub fn schedule(&mut self, due: Timestamp, kind: TimerKind) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Timer { due, sequence, kind });
    }

    /// Arm every periodic schedule, each first firing one period after `now`.
    pub fn start(&mut self, now: Timestamp, periods: &[(TimerKind, f64)]) {
        self.clear();
        for &(kind, period) in periods {
            self.schedule(now.offset(period), kind);
        }
    }

    /// Pop the earliest timer if it is due at or before `now`.
    pub fn pop_due(&mut self, now: Timestamp) -> Option<Timer> {
        if self.heap.peek().is_some_and(|t| t.due <= now) {
            self.heap.pop()
        } else {
            None
        }
    }

    pub fn next_due(&self) -> Option<Timestamp> {
        self.heap.peek().map(|t| t.due)
    }

    /// Whether a timer of `kind` is armed.
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.heap.iter().any(|t| t.kind == kind)
    }

    /// Cancel every pending timer of `kind`.
    pub fn cancel(&mut self, kind: TimerKind) {
        self.heap.retain(|t| t.kind != kind);
    }

    /// Cancel every pending timer.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_due_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(Timestamp(10.0), TimerKind::StatsSample);
        queue.schedule(Timestamp(1.0), TimerKind::GrowthTick);
        queue.schedule(Timestamp(1.0), TimerKind::Reconcile);

        let first = queue.pop_due(Timestamp(20.0)).unwrap();
        assert_eq!(first.kind, TimerKind::GrowthTick);
        let second = queue.pop_due(Timestamp(20.0)).unwrap();
        assert_eq!(second.kind, TimerKind::Reconcile);
        let third = queue.pop_due(Timestamp(20.0)).unwrap();
        assert_eq!(third.kind, TimerKind::StatsSample);
        assert!(queue.pop_due(Timestamp(20.0)).is_none());
    }

    #[test]
    fn test_same_instant_ignores_arming_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(Timestamp(10.0), TimerKind::ReminderScan);
        queue.schedule(Timestamp(10.0), TimerKind::StatsSample);
        queue.schedule(Timestamp(10.0), TimerKind::Reconcile);
        queue.schedule(Timestamp(10.0), TimerKind::GrowthTick);

        let order: Vec<_> = std::iter::from_fn(|| queue.pop_due(Timestamp(10.0)))
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            order,
            vec![
                TimerKind::GrowthTick,
                TimerKind::Reconcile,
                TimerKind::StatsSample,
                TimerKind::ReminderScan,
            ]
        );
    }

    #[test]
    fn test_cancel_removes_only_that_kind() {
        let mut queue = TimerQueue::new();
        queue.schedule(Timestamp(1.0), TimerKind::GrowthTick);
        queue.schedule(Timestamp(60.0), TimerKind::ReminderScan);
        queue.cancel(TimerKind::ReminderScan);
        assert!(!queue.is_armed(TimerKind::ReminderScan));
        assert!(queue.is_armed(TimerKind::GrowthTick));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_pop_due_respects_time() {
        let mut queue = TimerQueue::new();
        queue.schedule(Timestamp(5.0), TimerKind::ReminderScan);
        assert!(queue.pop_due(Timestamp(4.99)).is_none());
        assert_eq!(queue.next_due(), Some(Timestamp(5.0)));
        assert!(queue.pop_due(Timestamp(5.0)).is_some());
    }

    #[test]
    fn test_start_and_clear() {
        let mut queue = TimerQueue::new();
        queue.start(
            Timestamp(100.0),
            &[(TimerKind::GrowthTick, 1.0), (TimerKind::ReminderScan, 60.0)],
        );
        assert_eq!(queue.len(), 2);
        assert!(queue.is_armed(TimerKind::ReminderScan));
        assert!(!queue.is_armed(TimerKind::StatsSample));
        assert_eq!(queue.next_due(), Some(Timestamp(101.0)));

        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.pop_due(Timestamp(1e9)).is_none());
    }
}
