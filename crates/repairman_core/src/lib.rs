//! Discrete-event simulation of the machine repairman problem.
//!
//! A fixed population of machines fails at exponential intervals and is
//! repaired, first-come first-served, by a fixed crew of repairmen. Machines
//! and repairmen are ECS entities; the clock, the waiting lines and the
//! statistics are world resources, so every run owns its own [bevy_ecs::prelude::World].

pub mod clock;
pub mod distributions;
pub mod ecs;
pub mod error;
pub mod profiling;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod statistics;
pub mod systems;
pub mod telemetry;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use error::SimError;
pub use report::SimulationReport;
pub use runner::{run_simulation, run_simulation_with_variates};
pub use scenario::ScenarioParams;
