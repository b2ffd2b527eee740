use repairman_core::clock::EventKind;
use repairman_core::ecs::RepairProgress;
use repairman_core::runner::{run_until_target_with_hook, simulation_schedule};
use repairman_core::telemetry::SimTelemetry;
use repairman_core::test_helpers::{check_invariants, seeded_world};
use repairman_core::{run_simulation, ScenarioParams};

fn crew_params(seed: u64) -> ScenarioParams {
    ScenarioParams::default()
        .with_machines(6)
        .with_repairmen(2)
        .with_rates(0.5, 0.7)
        .with_stop_at_machines_fixed(2_000)
        .with_seed(seed)
}

#[test]
fn invariants_hold_after_every_event() {
    for seed in [1, 2, 3] {
        let mut world = seeded_world(crew_params(seed));
        assert_eq!(check_invariants(&world), Ok(()));

        let mut schedule = simulation_schedule();
        let mut violations = Vec::new();
        let steps = run_until_target_with_hook(&mut world, &mut schedule, |world, event| {
            if let Err(err) = check_invariants(world) {
                violations.push(format!("t={}: {err}", event.timestamp));
            }
        })
        .expect("run");

        assert!(steps >= 4_000, "each repair needs a failure too, got {steps}");
        assert!(violations.is_empty(), "seed {seed}: {:?}", &violations[..1]);
    }
}

#[test]
fn time_and_repair_count_advance_monotonically() {
    let mut world = seeded_world(crew_params(9));
    let mut schedule = simulation_schedule();

    let mut last_time = 0.0_f64;
    let mut last_fixed = 0_u64;
    run_until_target_with_hook(&mut world, &mut schedule, |world, event| {
        assert!(event.timestamp >= last_time, "time went backwards");
        last_time = event.timestamp;

        let fixed = world.resource::<RepairProgress>().machines_fixed;
        match event.kind {
            EventKind::RepairCompleted(_) => assert_eq!(fixed, last_fixed + 1),
            EventKind::MachineFailure(_) => assert_eq!(fixed, last_fixed),
        }
        last_fixed = fixed;
    })
    .expect("run");

    assert_eq!(last_fixed, 2_000);
}

#[test]
fn repairs_start_in_failure_arrival_order() {
    let mut world = seeded_world(crew_params(21).with_machines(8).with_repair_log(true));
    let mut schedule = simulation_schedule();
    run_until_target_with_hook(&mut world, &mut schedule, |_, _| {}).expect("run");

    let mut records = world.resource::<SimTelemetry>().completed_repairs.clone();
    assert_eq!(records.len(), 2_000);
    records.sort_by(|a, b| a.repair_started_at.total_cmp(&b.repair_started_at));

    let waited = records.iter().filter(|r| r.time_waiting() > 0.0).count();
    assert!(waited > 0, "scenario should build a queue");
    for pair in records.windows(2) {
        assert!(
            pair[0].failure_seq < pair[1].failure_seq,
            "machine {} (failure #{}) started before machine {} (failure #{})",
            pair[1].machine_id,
            pair[1].failure_seq,
            pair[0].machine_id,
            pair[0].failure_seq
        );
    }
}

#[test]
fn same_seed_gives_same_report() {
    let first = run_simulation(crew_params(77)).expect("run");
    let second = run_simulation(crew_params(77)).expect("run");
    assert_eq!(first, second);
}
