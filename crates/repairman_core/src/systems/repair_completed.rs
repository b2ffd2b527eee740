use bevy_ecs::prelude::{Query, Res, ResMut};
use tracing::trace;

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::distributions::Variates;
use crate::ecs::{
    EngineFault, FailedMachines, IdleRepairmen, Machine, MachineState, RepairProgress, Repairman,
};
use crate::error::SimError;
use crate::telemetry::{CompletedRepairRecord, SimTelemetry};

/// A repairman finishes a machine. The machine goes back into service with a
/// fresh failure time; the repairman takes the oldest waiting machine, or goes
/// to the back of the idle line if nothing is waiting.
#[allow(clippy::too_many_arguments)]
pub fn repair_completed_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut variates: ResMut<Variates>,
    mut failed: ResMut<FailedMachines>,
    mut idle: ResMut<IdleRepairmen>,
    mut progress: ResMut<RepairProgress>,
    mut fault: ResMut<EngineFault>,
    telemetry: Option<ResMut<SimTelemetry>>,
    mut machines: Query<&mut Machine>,
    mut repairmen: Query<&mut Repairman>,
) {
    let EventKind::RepairCompleted(repairman_entity) = event.0.kind else {
        return;
    };
    let now = clock.now();

    let Ok(mut repairman) = repairmen.get_mut(repairman_entity) else {
        fault.raise(SimError::UnknownEntity {
            role: "repair completion",
            entity: repairman_entity,
        });
        return;
    };
    let job_started_at = repairman.job_started_at;
    let Some(fixed_entity) = repairman.finish_job() else {
        fault.raise(SimError::IdleRepairCompletion {
            entity: repairman_entity,
        });
        return;
    };

    {
        let Ok(mut machine) = machines.get_mut(fixed_entity) else {
            fault.raise(SimError::UnknownEntity {
                role: "repaired machine",
                entity: fixed_entity,
            });
            return;
        };

        if let Some(mut telemetry) = telemetry {
            telemetry.completed_repairs.push(CompletedRepairRecord {
                machine_entity: fixed_entity,
                repairman_entity,
                machine_id: machine.id,
                repairman_id: repairman.id,
                failure_seq: machine.failure_seq.unwrap_or_default(),
                failed_at: machine.failed_at.unwrap_or(job_started_at),
                repair_started_at: job_started_at,
                completed_at: now,
            });
        }

        let next_failure_at = now + variates.failure_interval();
        machine.restore(next_failure_at);
        clock.schedule_at(next_failure_at, EventKind::MachineFailure(fixed_entity));
        trace!(
            machine = machine.id,
            repairman = repairman.id,
            t = now,
            next_failure_at,
            "machine repaired"
        );
    }

    match failed.0.pop_front() {
        Some(next_entity) => {
            let Ok(mut next_machine) = machines.get_mut(next_entity) else {
                fault.raise(SimError::UnknownEntity {
                    role: "waiting machine",
                    entity: next_entity,
                });
                return;
            };
            next_machine.state = MachineState::UnderRepair;
            let fix_at = now + variates.repair_interval();
            repairman.assign(next_entity, now, fix_at);
            clock.schedule_at(fix_at, EventKind::RepairCompleted(repairman_entity));
            trace!(
                machine = next_machine.id,
                repairman = repairman.id,
                t = now,
                fix_at,
                "repairman took next waiting machine"
            );
        }
        None => {
            idle.0.push_back(repairman_entity);
            trace!(repairman = repairman.id, t = now, "repairman idle");
        }
    }

    progress.machines_fixed += 1;
}
