//! Run the classic scenario (4 machines, 1 repairman) and print the report
//! plus a sample of the repair log.
//!
//! Run with: cargo run -p repairman_core --example scenario_run

use bevy_ecs::prelude::World;
use repairman_core::profiling::EventMetrics;
use repairman_core::report::SimulationReport;
use repairman_core::runner::{initialize_simulation, run_until_target, simulation_schedule};
use repairman_core::scenario::{build_scenario, ScenarioParams};
use repairman_core::telemetry::SimTelemetry;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut world = World::new();
    build_scenario(
        &mut world,
        ScenarioParams::default().with_seed(123).with_repair_log(true),
    )?;
    initialize_simulation(&mut world);

    let mut schedule = simulation_schedule();
    let steps = run_until_target(&mut world, &mut schedule)?;

    println!("--- Classic scenario (4 machines, 1 repairman, seed 123) ---");
    println!("Steps executed: {steps}");
    print!("{}", SimulationReport::from_world(&world));
    let metrics = world.resource::<EventMetrics>();
    println!(
        "Events processed: {} ({:.0} events/sec)",
        metrics.events_processed,
        metrics.events_per_second()
    );

    let telemetry = world.resource::<SimTelemetry>();
    if let Some(mean) = telemetry.mean_downtime() {
        println!("Mean downtime per failure: {mean:.4}");
    }
    const SAMPLE: usize = 10;
    println!("\nFirst {SAMPLE} repairs:");
    for (i, r) in telemetry.completed_repairs.iter().take(SAMPLE).enumerate() {
        println!(
            "  {}  machine={} repairman={}  failed_at={:.3}  waited={:.3}  repair={:.3}",
            i + 1,
            r.machine_id,
            r.repairman_id,
            r.failed_at,
            r.time_waiting(),
            r.repair_duration(),
        );
    }
    Ok(())
}
