use crate::core::connections::Terminal;
use crate::core::values::Value;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A pending assignment of `value` to the node behind `target` at tick `when`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetEvent {
    pub target: Terminal,
    pub value: Value,
    pub when: u64,
}

#[derive(Debug)]
struct ScheduledEvent {
    sequence_num: u64,
    event: SetEvent,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.event.when == other.event.when && self.sequence_num == other.sequence_num
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .event
            .when
            .cmp(&self.event.when)
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Time-ordered event queue. Events due at the same tick come out in the
/// order they were scheduled.
#[derive(Debug, Default)]
pub struct EventScheduler {
    event_queue: BinaryHeap<ScheduledEvent>,
    sequence_counter: u64,
}

impl EventScheduler {
    /// Create a new EventScheduler
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, event: SetEvent) {
        self.event_queue.push(ScheduledEvent { sequence_num: self.sequence_counter, event });
        self.sequence_counter += 1;
    }

    /// Remove and return every event due at or before `now`, in FIFO order per tick
    pub fn take_due(&mut self, now: u64) -> Vec<SetEvent> {
        let mut events = Vec::new();
        while self.event_queue.peek().map_or(false, |e| e.event.when <= now) {
            if let Some(scheduled) = self.event_queue.pop() {
                events.push(scheduled.event);
            }
        }
        events
    }

    /// Check if there are any events remaining in the queue
    pub fn has_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.event_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_queue.is_empty()
    }

    /// Drop every pending event matching `cancel`. Returns how many went.
    pub fn cancel_where<F>(&mut self, mut cancel: F) -> usize
    where
        F: FnMut(&SetEvent) -> bool,
    {
        let before = self.event_queue.len();
        self.event_queue.retain(|scheduled| !cancel(&scheduled.event));
        before - self.event_queue.len()
    }

    /// Tick of the earliest pending event
    pub fn peek_next_time(&self) -> Option<u64> {
        self.event_queue.peek().map(|e| e.event.when)
    }
}
