use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

/// What happens when an event fires, and to whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The operational machine breaks down.
    MachineFailure(Entity),
    /// The repairman finishes the machine it is assigned to.
    RepairCompleted(Entity),
}

impl EventKind {
    pub fn subject(&self) -> Entity {
        match *self {
            EventKind::MachineFailure(entity) | EventKind::RepairCompleted(entity) => entity,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventKind::MachineFailure(_) => "MachineFailure",
            EventKind::RepairCompleted(_) => "RepairCompleted",
        }
    }
}

/// A pending event. `seq` is the scheduling order and breaks timestamp ties,
/// so events at the same instant pop first-scheduled first.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    pub timestamp: f64,
    pub seq: u64,
    pub kind: EventKind,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by timestamp.
        other
            .timestamp
            .total_cmp(&self.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

/// The event being processed by the current step.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

/// Simulation time plus the queue of pending events.
#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: f64,
    next_seq: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Schedule an event at an absolute simulation time.
    pub fn schedule_at(&mut self, timestamp: f64, kind: EventKind) {
        debug_assert!(
            timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            timestamp,
            seq,
            kind,
        });
    }

    /// Schedule an event `delay` time units from now.
    pub fn schedule_in(&mut self, delay: f64, kind: EventKind) -> f64 {
        let at = self.now + delay;
        self.schedule_at(at, kind);
        at
    }

    /// Remove the earliest event and advance `now` to its timestamp.
    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn next_event_time(&self) -> Option<f64> {
        self.events.peek().map(|e| e.timestamp)
    }

    /// Pending events in no particular order.
    pub fn pending(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
