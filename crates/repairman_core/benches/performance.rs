//! Performance benchmarks for repairman_core using Criterion.rs.

use bevy_ecs::prelude::World;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use repairman_core::runner::{initialize_simulation, run_until_target, simulation_schedule};
use repairman_core::scenario::{build_scenario, ScenarioParams};

fn bench_simulation_run(c: &mut Criterion) {
    let scenarios = vec![
        ("classic", 4, 1),
        ("shop_floor", 20, 3),
        ("plant", 200, 25),
    ];

    let mut group = c.benchmark_group("simulation_run");
    for (name, machines, repairmen) in scenarios {
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &(machines, repairmen),
            |b, &(machines, repairmen)| {
                b.iter(|| {
                    let mut world = World::new();
                    let params = ScenarioParams::default()
                        .with_machines(machines)
                        .with_repairmen(repairmen)
                        .with_stop_at_machines_fixed(10_000)
                        .with_seed(42);

                    build_scenario(&mut world, params).expect("valid params");
                    initialize_simulation(&mut world);
                    let mut schedule = simulation_schedule();
                    black_box(run_until_target(&mut world, &mut schedule).expect("run"));
                });
            },
        );
    }
    group.finish();
}

fn bench_event_queue(c: &mut Criterion) {
    use bevy_ecs::prelude::Entity;
    use repairman_core::clock::{EventKind, SimulationClock};

    c.bench_function("clock_push_pop_1000", |b| {
        b.iter(|| {
            let mut clock = SimulationClock::default();
            for i in 0..1000u32 {
                let at = f64::from((i * 7919) % 1000);
                clock.schedule_at(at, EventKind::MachineFailure(Entity::from_raw(i)));
            }
            while let Some(event) = clock.pop_next() {
                black_box(event);
            }
        });
    });
}

criterion_group!(benches, bench_simulation_run, bench_event_queue);
criterion_main!(benches);
