//! Test helpers for deterministic scenarios and invariant checks.

use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, World};

use crate::clock::{EventKind, SimulationClock};
use crate::distributions::ScriptedVariates;
use crate::ecs::{FailedMachines, IdleRepairmen, Machine, MachineState, Population, Repairman};
use crate::runner::initialize_simulation;
use crate::scenario::{build_scenario, build_scenario_with_variates, ScenarioParams};

/// Build and initialize a world whose intervals come from fixed scripts.
///
/// # Panics
///
/// Panics if the params or scripts are invalid.
pub fn scripted_world(params: ScenarioParams, failures: Vec<f64>, repairs: Vec<f64>) -> World {
    let variates = ScriptedVariates::new(failures, repairs).expect("valid interval script");
    let mut world = World::new();
    build_scenario_with_variates(&mut world, params, variates).expect("valid scenario params");
    initialize_simulation(&mut world);
    world
}

/// Build and initialize a world with seeded exponential intervals.
///
/// # Panics
///
/// Panics if the params are invalid.
pub fn seeded_world(params: ScenarioParams) -> World {
    let mut world = World::new();
    build_scenario(&mut world, params).expect("valid scenario params");
    initialize_simulation(&mut world);
    world
}

/// Check the population, pending-event and work-conservation invariants that
/// must hold between any two events.
pub fn check_invariants(world: &World) -> Result<(), String> {
    let population = world.resource::<Population>();
    let clock = world.resource::<SimulationClock>();
    let failed = &world.resource::<FailedMachines>().0;
    let idle = &world.resource::<IdleRepairmen>().0;

    let machines: Vec<(Entity, &Machine)> = world
        .iter_entities()
        .filter_map(|e| e.get::<Machine>().map(|m| (e.id(), m)))
        .collect();
    let repairmen: Vec<(Entity, &Repairman)> = world
        .iter_entities()
        .filter_map(|e| e.get::<Repairman>().map(|r| (e.id(), r)))
        .collect();

    let mut failure_events: HashMap<Entity, usize> = HashMap::new();
    let mut completion_events: HashMap<Entity, usize> = HashMap::new();
    for event in clock.pending() {
        match event.kind {
            EventKind::MachineFailure(e) => *failure_events.entry(e).or_default() += 1,
            EventKind::RepairCompleted(e) => *completion_events.entry(e).or_default() += 1,
        }
        if event.timestamp < clock.now() {
            return Err(format!("pending event {:?} is in the past", event));
        }
    }

    let busy = repairmen.iter().filter(|(_, r)| r.is_busy()).count();
    if idle.len() + busy != population.repairmen {
        return Err(format!(
            "idle ({}) + busy ({busy}) != repairmen ({})",
            idle.len(),
            population.repairmen
        ));
    }

    let operational = machines.iter().filter(|(_, m)| m.is_operational()).count();
    if failed.len() + busy + operational != population.machines {
        return Err(format!(
            "waiting ({}) + assigned ({busy}) + operational ({operational}) != machines ({})",
            failed.len(),
            population.machines
        ));
    }

    if !failed.is_empty() && !idle.is_empty() {
        return Err(format!(
            "{} machines waiting while {} repairmen idle",
            failed.len(),
            idle.len()
        ));
    }

    for (entity, machine) in &machines {
        let pending = failure_events.get(entity).copied().unwrap_or(0);
        let expected = usize::from(machine.is_operational());
        if pending != expected {
            return Err(format!(
                "machine {} in {:?} has {pending} pending failures",
                machine.id, machine.state
            ));
        }
        let queued = failed.iter().filter(|e| *e == entity).count();
        let should_queue = usize::from(machine.state == MachineState::AwaitingRepair);
        if queued != should_queue {
            return Err(format!(
                "machine {} in {:?} appears {queued} times in the failed line",
                machine.id, machine.state
            ));
        }
    }

    for (entity, repairman) in &repairmen {
        let pending = completion_events.get(entity).copied().unwrap_or(0);
        let expected = usize::from(repairman.is_busy());
        if pending != expected {
            return Err(format!(
                "repairman {} (busy: {}) has {pending} pending completions",
                repairman.id,
                repairman.is_busy()
            ));
        }
        let queued = idle.iter().filter(|e| *e == entity).count();
        if queued != 1 - expected {
            return Err(format!(
                "repairman {} (busy: {}) appears {queued} times in the idle line",
                repairman.id,
                repairman.is_busy()
            ));
        }
        if let Some(machine_entity) = repairman.assigned_machine {
            let assigned = world
                .get::<Machine>(machine_entity)
                .map(|m| m.state == MachineState::UnderRepair)
                .unwrap_or(false);
            if !assigned {
                return Err(format!(
                    "repairman {} is assigned to a machine that is not under repair",
                    repairman.id
                ));
            }
        }
    }

    Ok(())
}
