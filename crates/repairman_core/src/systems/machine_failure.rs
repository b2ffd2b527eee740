use bevy_ecs::prelude::{Query, Res, ResMut};
use tracing::trace;

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::distributions::Variates;
use crate::ecs::{
    EngineFault, FailedMachines, IdleRepairmen, Machine, MachineState, RepairProgress, Repairman,
};
use crate::error::SimError;

/// A machine breaks down. The longest-idle repairman takes it at once;
/// with nobody free it joins the back of the failed-machines line.
#[allow(clippy::too_many_arguments)]
pub fn machine_failure_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut variates: ResMut<Variates>,
    mut failed: ResMut<FailedMachines>,
    mut idle: ResMut<IdleRepairmen>,
    mut progress: ResMut<RepairProgress>,
    mut fault: ResMut<EngineFault>,
    mut machines: Query<&mut Machine>,
    mut repairmen: Query<&mut Repairman>,
) {
    let EventKind::MachineFailure(machine_entity) = event.0.kind else {
        return;
    };
    let now = clock.now();

    let Ok(mut machine) = machines.get_mut(machine_entity) else {
        fault.raise(SimError::UnknownEntity {
            role: "machine failure",
            entity: machine_entity,
        });
        return;
    };

    let failure_seq = progress.failures;
    progress.failures += 1;
    machine.fail(now, failure_seq);

    let Some(repairman_entity) = idle.0.pop_front() else {
        trace!(machine = machine.id, t = now, "machine failed, waiting for a repairman");
        failed.0.push_back(machine_entity);
        return;
    };

    let Ok(mut repairman) = repairmen.get_mut(repairman_entity) else {
        fault.raise(SimError::UnknownEntity {
            role: "idle repairman",
            entity: repairman_entity,
        });
        return;
    };

    machine.state = MachineState::UnderRepair;
    let fix_at = now + variates.repair_interval();
    repairman.assign(machine_entity, now, fix_at);
    clock.schedule_at(fix_at, EventKind::RepairCompleted(repairman_entity));
    trace!(
        machine = machine.id,
        repairman = repairman.id,
        t = now,
        fix_at,
        "machine failed, repair started"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::{Schedule, World};

    use crate::distributions::ScriptedVariates;

    fn world_with_one_machine(idle_repairman: bool) -> (World, bevy_ecs::prelude::Entity) {
        let mut world = World::new();
        world.insert_resource(SimulationClock::default());
        world.insert_resource(Variates::new(
            ScriptedVariates::new(vec![5.0], vec![1.5]).expect("script"),
        ));
        world.insert_resource(FailedMachines::default());
        world.insert_resource(IdleRepairmen::default());
        world.insert_resource(RepairProgress::default());
        world.insert_resource(EngineFault::default());

        let machine = world.spawn(Machine::new(0)).id();
        if idle_repairman {
            let repairman = world.spawn(Repairman::new(0)).id();
            world.resource_mut::<IdleRepairmen>().0.push_back(repairman);
        }

        world
            .resource_mut::<SimulationClock>()
            .schedule_at(2.0, EventKind::MachineFailure(machine));
        let event = world
            .resource_mut::<SimulationClock>()
            .pop_next()
            .expect("failure event");
        world.insert_resource(CurrentEvent(event));
        (world, machine)
    }

    #[test]
    fn failure_with_idle_repairman_starts_repair() {
        let (mut world, machine_entity) = world_with_one_machine(true);

        let mut schedule = Schedule::default();
        schedule.add_systems(machine_failure_system);
        schedule.run(&mut world);

        let machine = world.get::<Machine>(machine_entity).expect("machine");
        assert_eq!(machine.state, MachineState::UnderRepair);
        assert_eq!(machine.failed_at, Some(2.0));
        assert!(world.resource::<IdleRepairmen>().0.is_empty());
        assert!(world.resource::<FailedMachines>().0.is_empty());

        let repairman = world.query::<&Repairman>().single(&world);
        assert_eq!(repairman.assigned_machine, Some(machine_entity));
        assert_eq!(repairman.next_fix_at, 3.5);

        let next = world
            .resource_mut::<SimulationClock>()
            .pop_next()
            .expect("repair completion scheduled");
        assert_eq!(next.timestamp, 3.5);
        assert!(matches!(next.kind, EventKind::RepairCompleted(_)));
        assert!(world.resource::<EngineFault>().0.is_none());
    }

    #[test]
    fn failure_without_idle_repairman_queues_machine() {
        let (mut world, machine_entity) = world_with_one_machine(false);

        let mut schedule = Schedule::default();
        schedule.add_systems(machine_failure_system);
        schedule.run(&mut world);

        let machine = world.get::<Machine>(machine_entity).expect("machine");
        assert_eq!(machine.state, MachineState::AwaitingRepair);
        assert_eq!(machine.failure_seq, Some(0));
        assert_eq!(
            world.resource::<FailedMachines>().0.front(),
            Some(&machine_entity)
        );
        assert!(world.resource::<SimulationClock>().is_empty());
        assert_eq!(world.resource::<RepairProgress>().failures, 1);
    }

    #[test]
    fn failure_for_unknown_entity_raises_fault() {
        let mut world = World::new();
        world.insert_resource(SimulationClock::default());
        world.insert_resource(Variates::new(
            ScriptedVariates::new(vec![1.0], vec![1.0]).expect("script"),
        ));
        world.insert_resource(FailedMachines::default());
        world.insert_resource(IdleRepairmen::default());
        world.insert_resource(RepairProgress::default());
        world.insert_resource(EngineFault::default());
        let stray = world.spawn(Repairman::new(0)).id();
        world.insert_resource(CurrentEvent(crate::clock::Event {
            timestamp: 1.0,
            seq: 0,
            kind: EventKind::MachineFailure(stray),
        }));

        let mut schedule = Schedule::default();
        schedule.add_systems(machine_failure_system);
        schedule.run(&mut world);

        assert!(matches!(
            world.resource::<EngineFault>().0,
            Some(SimError::UnknownEntity { .. })
        ));
    }
}
