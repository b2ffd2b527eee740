//! Scenario setup: validate parameters, spawn machines and repairmen, insert resources.

use bevy_ecs::prelude::World;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::SimulationClock;
use crate::distributions::{ExponentialVariates, VariateSource, Variates};
use crate::ecs::{
    EngineFault, FailedMachines, IdleRepairmen, Machine, Population, RepairProgress, Repairman,
    StopAtMachinesFixed,
};
use crate::error::{ensure_positive_rate, SimError};
use crate::profiling::EventMetrics;
use crate::statistics::StateStatistics;
use crate::telemetry::SimTelemetry;

const DEFAULT_STOP_AT_MACHINES_FIXED: u64 = 100_000;
const DEFAULT_FAILURE_RATE: f64 = 0.4;
const DEFAULT_REPAIR_RATE: f64 = 0.6;
const DEFAULT_MACHINES: usize = 4;
const DEFAULT_REPAIRMEN: usize = 1;

/// Parameters for building a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioParams {
    pub num_machines: usize,
    pub num_repairmen: usize,
    /// Machine failure rate (lambda).
    pub failure_rate: f64,
    /// Repair rate per repairman (mu).
    pub repair_rate: f64,
    /// The run stops after this many completed repairs.
    pub stop_at_machines_fixed: u64,
    /// Random seed for reproducibility (optional; if None, seeds from entropy).
    pub seed: Option<u64>,
    /// Keep a [SimTelemetry] log of every completed repair.
    pub record_repairs: bool,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            num_machines: DEFAULT_MACHINES,
            num_repairmen: DEFAULT_REPAIRMEN,
            failure_rate: DEFAULT_FAILURE_RATE,
            repair_rate: DEFAULT_REPAIR_RATE,
            stop_at_machines_fixed: DEFAULT_STOP_AT_MACHINES_FIXED,
            seed: None,
            record_repairs: false,
        }
    }
}

impl ScenarioParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_machines(mut self, machines: usize) -> Self {
        self.num_machines = machines;
        self
    }

    pub fn with_repairmen(mut self, repairmen: usize) -> Self {
        self.num_repairmen = repairmen;
        self
    }

    /// Failure rate (lambda) and repair rate (mu).
    pub fn with_rates(mut self, failure_rate: f64, repair_rate: f64) -> Self {
        self.failure_rate = failure_rate;
        self.repair_rate = repair_rate;
        self
    }

    pub fn with_stop_at_machines_fixed(mut self, target: u64) -> Self {
        self.stop_at_machines_fixed = target;
        self
    }

    pub fn with_repair_log(mut self, enabled: bool) -> Self {
        self.record_repairs = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.num_machines == 0 {
            return Err(SimError::invalid("num_machines", "must be > 0"));
        }
        if self.num_repairmen == 0 {
            return Err(SimError::invalid(
                "num_repairmen",
                "must be > 0; with no repairmen no machine is ever fixed",
            ));
        }
        if self.stop_at_machines_fixed == 0 {
            return Err(SimError::invalid("stop_at_machines_fixed", "must be > 0"));
        }
        ensure_positive_rate("failure_rate", self.failure_rate)?;
        ensure_positive_rate("repair_rate", self.repair_rate)?;
        Ok(())
    }
}

/// Build a scenario that draws exponential intervals from `params.seed`.
pub fn build_scenario(world: &mut World, params: ScenarioParams) -> Result<(), SimError> {
    params.validate()?;
    let variates = ExponentialVariates::new(params.failure_rate, params.repair_rate, params.seed)?;
    build_scenario_with_variates(world, params, variates)
}

/// Build a scenario around a caller-provided variate source (e.g. a fixed script).
///
/// Machines are spawned operational but without failure events; call
/// [crate::runner::initialize_simulation] before running. Repairmen join the
/// idle line in spawn order.
pub fn build_scenario_with_variates(
    world: &mut World,
    params: ScenarioParams,
    variates: impl VariateSource + 'static,
) -> Result<(), SimError> {
    params.validate()?;

    world.insert_resource(SimulationClock::default());
    world.insert_resource(Variates::new(variates));
    world.insert_resource(FailedMachines::default());
    world.insert_resource(RepairProgress::default());
    world.insert_resource(StopAtMachinesFixed(params.stop_at_machines_fixed));
    world.insert_resource(Population {
        machines: params.num_machines,
        repairmen: params.num_repairmen,
    });
    world.insert_resource(StateStatistics::new(
        params.num_machines,
        params.num_repairmen,
    ));
    world.insert_resource(EngineFault::default());
    world.insert_resource(EventMetrics::default());
    if params.record_repairs {
        world.insert_resource(SimTelemetry::default());
    }

    for id in 0..params.num_machines {
        world.spawn(Machine::new(id));
    }

    let mut idle = IdleRepairmen::default();
    for id in 0..params.num_repairmen {
        idle.0.push_back(world.spawn(Repairman::new(id)).id());
    }
    world.insert_resource(idle);

    debug!(
        machines = params.num_machines,
        repairmen = params.num_repairmen,
        failure_rate = params.failure_rate,
        repair_rate = params.repair_rate,
        stop_at = params.stop_at_machines_fixed,
        "scenario built"
    );
    Ok(())
}
