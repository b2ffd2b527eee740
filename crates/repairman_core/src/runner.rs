//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Clock progression, state sampling and statistics happen here, outside
//! systems. Each step records the pre-event state, pops the next event from
//! [SimulationClock], inserts it as [CurrentEvent], runs the schedule, then
//! charges the elapsed time to the recorded state.

use bevy_ecs::prelude::{Entity, Res, Schedule, World};
use bevy_ecs::schedule::{ExecutorKind, IntoSystemConfigs};
use tracing::{error, info, warn};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::distributions::{VariateSource, Variates};
use crate::ecs::{
    EngineFault, IdleRepairmen, Machine, Population, RepairProgress, StopAtMachinesFixed,
};
use crate::error::SimError;
use crate::profiling::EventMetrics;
use crate::report::SimulationReport;
use crate::scenario::{build_scenario, build_scenario_with_variates, ScenarioParams};
use crate::statistics::StateStatistics;
use crate::systems::{
    machine_failure::machine_failure_system, repair_completed::repair_completed_system,
};

fn is_machine_failure(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, EventKind::MachineFailure(_)))
        .unwrap_or(false)
}

fn is_repair_completed(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, EventKind::RepairCompleted(_)))
        .unwrap_or(false)
}

/// System state observed between events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSample {
    pub time: f64,
    pub operational: usize,
    pub busy: usize,
}

impl StateSample {
    pub fn observe(world: &World) -> Self {
        let operational = world
            .iter_entities()
            .filter_map(|entity| entity.get::<Machine>())
            .filter(|machine| machine.is_operational())
            .count();
        let repairmen = world.resource::<Population>().repairmen;
        let idle = world.resource::<IdleRepairmen>().0.len();
        Self {
            time: world.resource::<SimulationClock>().now(),
            operational,
            busy: repairmen - idle,
        }
    }
}

/// True once the configured number of repairs has completed.
pub fn target_reached(world: &World) -> bool {
    let fixed = world.resource::<RepairProgress>().machines_fixed;
    let target = world.resource::<StopAtMachinesFixed>().0;
    fixed >= target
}

/// Schedules the first failure of every machine, in machine id order.
/// Call this after building the scenario and before running events.
pub fn initialize_simulation(world: &mut World) {
    let mut machines: Vec<(usize, Entity)> = world
        .query::<(Entity, &Machine)>()
        .iter(world)
        .map(|(entity, machine)| (machine.id, entity))
        .collect();
    machines.sort_unstable_by_key(|(id, _)| *id);

    for (_, entity) in machines {
        let interval = world.resource_mut::<Variates>().failure_interval();
        let at = world.resource::<SimulationClock>().now() + interval;
        if let Some(mut machine) = world.get_mut::<Machine>(entity) {
            machine.next_failure_at = at;
        }
        world
            .resource_mut::<SimulationClock>()
            .schedule_at(at, EventKind::MachineFailure(entity));
    }
}

/// Runs one simulation step. Returns `Ok(false)` once the stop target is reached.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> Result<bool, SimError> {
    run_next_event_with_hook(world, schedule, |_, _| {})
}

/// Runs one simulation step and invokes `hook` after the step is fully applied.
pub fn run_next_event_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    mut hook: F,
) -> Result<bool, SimError>
where
    F: FnMut(&World, &Event),
{
    if target_reached(world) {
        return Ok(false);
    }

    let before = StateSample::observe(world);
    let event = world
        .resource_mut::<SimulationClock>()
        .pop_next()
        .ok_or_else(|| {
            let fault = SimError::EmptyQueue { at: before.time };
            error!(%fault, "no pending events");
            fault
        })?;
    if !event.timestamp.is_finite() {
        let fault = SimError::NonFiniteTime { at: before.time };
        error!(%fault, kind = event.kind.label(), "event time overflowed");
        return Err(fault);
    }
    world.insert_resource(CurrentEvent(event));

    if let Some(mut metrics) = world.get_resource_mut::<EventMetrics>() {
        metrics.record_event(event.kind);
    }

    schedule.run(world);

    if let Some(fault) = world.resource_mut::<EngineFault>().0.take() {
        return Err(fault);
    }

    world.resource_mut::<StateStatistics>().record(
        before.operational,
        before.busy,
        event.timestamp - before.time,
    );
    hook(world, &event);
    Ok(true)
}

/// Runs steps until the stop target is reached. Returns the number of events processed.
pub fn run_until_target(world: &mut World, schedule: &mut Schedule) -> Result<u64, SimError> {
    run_until_target_with_hook(world, schedule, |_, _| {})
}

/// Runs steps until the stop target is reached and invokes `hook` after each step.
pub fn run_until_target_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    mut hook: F,
) -> Result<u64, SimError>
where
    F: FnMut(&World, &Event),
{
    let mut steps = 0;
    while run_next_event_with_hook(world, schedule, &mut hook)? {
        steps += 1;
    }
    Ok(steps)
}

/// Builds the event schedule: one system per event kind, gated on [CurrentEvent].
///
/// The executor is single-threaded; the model is strictly sequential.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems((
        machine_failure_system.run_if(is_machine_failure),
        repair_completed_system.run_if(is_repair_completed),
    ));
    schedule
}

/// Build, initialize and run a scenario with exponential intervals, then report.
pub fn run_simulation(params: ScenarioParams) -> Result<SimulationReport, SimError> {
    let mut world = World::new();
    build_scenario(&mut world, params.clone())?;
    drive(&mut world, &params)
}

/// Same as [run_simulation] but with a caller-provided variate source.
pub fn run_simulation_with_variates(
    params: ScenarioParams,
    variates: impl VariateSource + 'static,
) -> Result<SimulationReport, SimError> {
    let mut world = World::new();
    build_scenario_with_variates(&mut world, params.clone(), variates)?;
    drive(&mut world, &params)
}

fn drive(world: &mut World, params: &ScenarioParams) -> Result<SimulationReport, SimError> {
    info!(
        machines = params.num_machines,
        repairmen = params.num_repairmen,
        failure_rate = params.failure_rate,
        repair_rate = params.repair_rate,
        stop_at = params.stop_at_machines_fixed,
        seed = ?params.seed,
        "starting simulation"
    );
    initialize_simulation(world);
    let mut schedule = simulation_schedule();
    let steps = run_until_target(world, &mut schedule)?;

    let report = SimulationReport::from_world(world);
    if report.elapsed_time <= 0.0 {
        warn!(steps, "run finished with zero elapsed simulated time");
    }
    let events_per_second = world.resource::<EventMetrics>().events_per_second();
    info!(
        steps,
        machines_fixed = report.machines_fixed,
        elapsed = report.elapsed_time,
        average_working = report.average_working,
        events_per_second,
        "simulation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::ScriptedVariates;

    fn scripted_world(params: ScenarioParams, failures: Vec<f64>, repairs: Vec<f64>) -> World {
        let mut world = World::new();
        build_scenario_with_variates(
            &mut world,
            params,
            ScriptedVariates::new(failures, repairs).expect("script"),
        )
        .expect("valid params");
        initialize_simulation(&mut world);
        world
    }

    #[test]
    fn initialize_schedules_one_failure_per_machine() {
        let world = scripted_world(
            ScenarioParams::default().with_machines(3),
            vec![1.0, 2.0, 3.0],
            vec![1.0],
        );
        let clock = world.resource::<SimulationClock>();
        assert_eq!(clock.pending_len(), 3);
        assert_eq!(clock.next_event_time(), Some(1.0));

        let mut times: Vec<f64> = world
            .iter_entities()
            .filter_map(|e| e.get::<Machine>().map(|m| m.next_failure_at))
            .collect();
        times.sort_by(f64::total_cmp);
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn step_charges_elapsed_time_to_pre_event_state() {
        let mut world = scripted_world(
            ScenarioParams::default()
                .with_machines(1)
                .with_stop_at_machines_fixed(1),
            vec![2.0, 3.0],
            vec![1.0],
        );
        let mut schedule = simulation_schedule();

        assert!(run_next_event(&mut world, &mut schedule).expect("failure step"));
        let stats = world.resource::<StateStatistics>();
        assert_eq!(stats.time_in_state(1), 2.0);
        assert_eq!(stats.time_with_busy(0), 2.0);

        assert!(run_next_event(&mut world, &mut schedule).expect("repair step"));
        let stats = world.resource::<StateStatistics>();
        assert_eq!(stats.time_in_state(0), 1.0);
        assert_eq!(stats.time_with_busy(1), 1.0);

        assert!(!run_next_event(&mut world, &mut schedule).expect("target reached"));
        assert_eq!(world.resource::<SimulationClock>().now(), 3.0);
    }

    #[test]
    fn empty_queue_aborts_the_run() {
        let mut world = World::new();
        build_scenario_with_variates(
            &mut world,
            ScenarioParams::default(),
            ScriptedVariates::new(vec![1.0], vec![1.0]).expect("script"),
        )
        .expect("valid params");
        // No initialize_simulation: the queue starts empty.
        let mut schedule = simulation_schedule();
        assert_eq!(
            run_until_target(&mut world, &mut schedule),
            Err(SimError::EmptyQueue { at: 0.0 })
        );
    }

    #[test]
    fn engine_fault_aborts_the_run() {
        let mut world = scripted_world(ScenarioParams::default(), vec![1.0], vec![1.0]);
        let stray = world.spawn_empty().id();
        world
            .resource_mut::<SimulationClock>()
            .schedule_at(0.5, EventKind::RepairCompleted(stray));

        let mut schedule = simulation_schedule();
        let err = run_until_target(&mut world, &mut schedule).expect_err("stray event");
        assert!(matches!(err, SimError::UnknownEntity { entity, .. } if entity == stray));
    }

    #[derive(Debug)]
    struct OverflowingVariates;

    impl VariateSource for OverflowingVariates {
        fn failure_interval(&mut self) -> f64 {
            f64::INFINITY
        }

        fn repair_interval(&mut self) -> f64 {
            1.0
        }
    }

    #[test]
    fn infinite_event_time_aborts_instead_of_poisoning_statistics() {
        let err = run_simulation_with_variates(
            ScenarioParams::default().with_machines(1),
            OverflowingVariates,
        )
        .expect_err("infinite failure time");
        assert_eq!(err, SimError::NonFiniteTime { at: 0.0 });
        assert!(err.is_engine_defect());
    }

    #[test]
    fn subnormal_rate_is_rejected_before_running() {
        let err = run_simulation(
            ScenarioParams::default()
                .with_machines(1)
                .with_rates(1e-310, 1.0)
                .with_stop_at_machines_fixed(1)
                .with_seed(1),
        )
        .expect_err("rate too small");
        assert!(matches!(
            err,
            SimError::InvalidArgument {
                name: "failure_rate",
                ..
            }
        ));
    }

    #[test]
    fn counts_events_in_metrics() {
        let mut world = scripted_world(
            ScenarioParams::default()
                .with_machines(1)
                .with_stop_at_machines_fixed(2),
            vec![1.0],
            vec![1.0],
        );
        let mut schedule = simulation_schedule();
        let steps = run_until_target(&mut world, &mut schedule).expect("run");
        assert_eq!(steps, 4);

        let metrics = world.resource::<EventMetrics>();
        assert_eq!(metrics.events_processed, 4);
        assert_eq!(metrics.count("MachineFailure"), 2);
        assert_eq!(metrics.count("RepairCompleted"), 2);
    }
}
