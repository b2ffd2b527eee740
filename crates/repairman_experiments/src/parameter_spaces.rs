//! Pre-defined parameter spaces for common studies.

use repairman_core::scenario::ScenarioParams;

use crate::ParameterSpace;

/// Classic scenario, replicated, for checking the estimator against theory.
pub fn minimal_space() -> ParameterSpace {
    ParameterSpace::grid()
        .with_base(ScenarioParams::default().with_stop_at_machines_fixed(20_000))
        .replications(8)
}

/// Staffing study: how many repairmen does a shop floor need?
pub fn staffing_space() -> ParameterSpace {
    ParameterSpace::grid()
        .with_base(
            ScenarioParams::default()
                .with_rates(0.1, 0.5)
                .with_stop_at_machines_fixed(20_000),
        )
        .num_machines(vec![10, 20, 40])
        .num_repairmen(vec![1, 2, 3, 4, 6, 8])
        .replications(5)
}

/// Load study: vary the failure-to-repair ratio for a fixed crew.
pub fn load_space() -> ParameterSpace {
    ParameterSpace::grid()
        .with_base(
            ScenarioParams::default()
                .with_machines(8)
                .with_repairmen(2)
                .with_stop_at_machines_fixed(20_000),
        )
        .failure_rate(vec![0.05, 0.1, 0.2, 0.4, 0.8])
        .repair_rate(vec![0.5, 1.0])
        .replications(5)
}

/// Look up a named space (`minimal`, `staffing`, `load`).
pub fn by_name(name: &str) -> Option<ParameterSpace> {
    match name {
        "minimal" => Some(minimal_space()),
        "staffing" => Some(staffing_space()),
        "load" => Some(load_space()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_spaces_have_expected_sizes() {
        assert_eq!(minimal_space().generate().len(), 8);
        assert_eq!(staffing_space().generate().len(), 3 * 6 * 5);
        assert_eq!(load_space().generate().len(), 5 * 2 * 5);
        assert!(by_name("staffing").is_some());
        assert!(by_name("nope").is_none());
    }
}
