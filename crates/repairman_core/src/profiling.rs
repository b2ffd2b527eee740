//! Event processing counters and wall-clock throughput.

use std::collections::HashMap;
use std::time::Instant;

use bevy_ecs::prelude::Resource;

use crate::clock::EventKind;

/// Event processing rate metrics.
#[derive(Debug, Default, Resource)]
pub struct EventMetrics {
    /// Total events processed.
    pub events_processed: u64,
    /// Start time for rate calculation.
    pub start_time: Option<Instant>,
    /// Events per kind label.
    pub events_by_kind: HashMap<&'static str, u64>,
}

impl EventMetrics {
    /// Record an event being processed.
    pub fn record_event(&mut self, kind: EventKind) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
        self.events_processed += 1;
        *self.events_by_kind.entry(kind.label()).or_insert(0) += 1;
    }

    pub fn count(&self, label: &str) -> u64 {
        self.events_by_kind.get(label).copied().unwrap_or(0)
    }

    /// Current event processing rate (events per wall-clock second).
    pub fn events_per_second(&self) -> f64 {
        match self.start_time {
            Some(start) => {
                let elapsed = start.elapsed().as_secs_f64();
                if elapsed > 0.0 {
                    self.events_processed as f64 / elapsed
                } else {
                    0.0
                }
            }
            None => 0.0,
        }
    }
}
