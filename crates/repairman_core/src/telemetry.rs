//! Repair log: one record per completed repair.

use bevy_ecs::prelude::{Entity, Resource};
use serde::Serialize;

/// One completed repair, recorded when the repairman finishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedRepairRecord {
    #[serde(skip)]
    pub machine_entity: Entity,
    #[serde(skip)]
    pub repairman_entity: Entity,
    pub machine_id: usize,
    pub repairman_id: usize,
    /// System-wide arrival number of the failure that was repaired.
    pub failure_seq: u64,
    pub failed_at: f64,
    pub repair_started_at: f64,
    pub completed_at: f64,
}

impl CompletedRepairRecord {
    /// Time spent in the failed-machines line before a repairman picked it up.
    pub fn time_waiting(&self) -> f64 {
        self.repair_started_at - self.failed_at
    }

    pub fn repair_duration(&self) -> f64 {
        self.completed_at - self.repair_started_at
    }

    /// Failure to return to service.
    pub fn downtime(&self) -> f64 {
        self.completed_at - self.failed_at
    }
}

/// Insert as a resource to record completed repairs.
#[derive(Debug, Default, Resource)]
pub struct SimTelemetry {
    pub completed_repairs: Vec<CompletedRepairRecord>,
}

impl SimTelemetry {
    pub fn mean_downtime(&self) -> Option<f64> {
        if self.completed_repairs.is_empty() {
            return None;
        }
        let total: f64 = self.completed_repairs.iter().map(|r| r.downtime()).sum();
        Some(total / self.completed_repairs.len() as f64)
    }

    pub fn mean_time_waiting(&self) -> Option<f64> {
        if self.completed_repairs.is_empty() {
            return None;
        }
        let total: f64 = self.completed_repairs.iter().map(|r| r.time_waiting()).sum();
        Some(total / self.completed_repairs.len() as f64)
    }
}
