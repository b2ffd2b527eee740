use std::collections::VecDeque;

use bevy_ecs::prelude::{Component, Entity, Resource};
use tracing::error;

use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    /// Running; exactly one failure event is pending for it.
    Operational,
    /// Broken and queued in [FailedMachines].
    AwaitingRepair,
    /// Broken and assigned to a repairman.
    UnderRepair,
}

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Machine {
    pub id: usize,
    pub state: MachineState,
    /// Absolute time of the next failure. Only meaningful while operational.
    pub next_failure_at: f64,
    /// Time of the most recent failure, while broken.
    pub failed_at: Option<f64>,
    /// Arrival number of the most recent failure across the whole system.
    pub failure_seq: Option<u64>,
}

impl Machine {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            state: MachineState::Operational,
            next_failure_at: 0.0,
            failed_at: None,
            failure_seq: None,
        }
    }

    pub fn is_broken(&self) -> bool {
        self.state != MachineState::Operational
    }

    pub fn is_operational(&self) -> bool {
        self.state == MachineState::Operational
    }

    /// Break down at `now`; the caller decides whether it waits or gets a repairman.
    pub fn fail(&mut self, now: f64, failure_seq: u64) {
        self.state = MachineState::AwaitingRepair;
        self.failed_at = Some(now);
        self.failure_seq = Some(failure_seq);
    }

    /// Back in service, next failure at `next_failure_at`.
    pub fn restore(&mut self, next_failure_at: f64) {
        self.state = MachineState::Operational;
        self.next_failure_at = next_failure_at;
        self.failed_at = None;
        self.failure_seq = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Repairman {
    pub id: usize,
    /// Machine currently being repaired. `None` means idle.
    pub assigned_machine: Option<Entity>,
    /// Completion time of the current job. Only meaningful while assigned.
    pub next_fix_at: f64,
    /// Start time of the current job.
    pub job_started_at: f64,
    pub jobs_completed: u64,
}

impl Repairman {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            assigned_machine: None,
            next_fix_at: 0.0,
            job_started_at: 0.0,
            jobs_completed: 0,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.assigned_machine.is_some()
    }

    pub fn assign(&mut self, machine: Entity, now: f64, fix_at: f64) {
        self.assigned_machine = Some(machine);
        self.job_started_at = now;
        self.next_fix_at = fix_at;
    }

    /// Finish the current job and return the machine it was on.
    pub fn finish_job(&mut self) -> Option<Entity> {
        let machine = self.assigned_machine.take()?;
        self.jobs_completed += 1;
        Some(machine)
    }
}

/// Broken machines waiting for a repairman, oldest failure first.
#[derive(Debug, Clone, Default, Resource)]
pub struct FailedMachines(pub VecDeque<Entity>);

/// Repairmen with no assignment, longest idle first.
#[derive(Debug, Clone, Default, Resource)]
pub struct IdleRepairmen(pub VecDeque<Entity>);

/// Machine and repairman counts of the running scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Resource)]
pub struct Population {
    pub machines: usize,
    pub repairmen: usize,
}

/// Counters advanced by the event systems.
#[derive(Debug, Clone, Copy, Default, Resource)]
pub struct RepairProgress {
    pub machines_fixed: u64,
    pub failures: u64,
}

/// Stop once this many repairs have completed.
#[derive(Debug, Clone, Copy, Resource)]
pub struct StopAtMachinesFixed(pub u64);

/// First engine defect raised by a system during the current step.
#[derive(Debug, Default, Resource)]
pub struct EngineFault(pub Option<SimError>);

impl EngineFault {
    pub fn raise(&mut self, fault: SimError) {
        error!(%fault, "engine invariant violated");
        if self.0.is_none() {
            self.0 = Some(fault);
        }
    }
}
