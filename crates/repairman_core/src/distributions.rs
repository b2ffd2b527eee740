//! Interval distributions for machine failures and repairs.
//!
//! Failure and repair intervals are exponential. The engine pulls them through
//! [VariateSource] so that tests can swap in a fixed script and get a fully
//! deterministic run.

use std::fmt;

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::error::{ensure_positive_rate, SimError};

/// Draw one exponential variate with the given rate: `-ln(U) / rate`, `U` uniform on (0, 1].
pub fn exponential_variate<R: Rng + ?Sized>(rng: &mut R, rate: f64) -> Result<f64, SimError> {
    ensure_positive_rate("rate", rate)?;
    Ok(sample_exponential(rng, rate))
}

fn sample_exponential<R: Rng + ?Sized>(rng: &mut R, rate: f64) -> f64 {
    // `gen` yields [0, 1); flipping it gives (0, 1] so ln never sees zero.
    let u = 1.0 - rng.gen::<f64>();
    -u.ln() / rate
}

/// Source of the two interval streams consumed by the engine.
pub trait VariateSource: Send + Sync + fmt::Debug {
    /// Time until an operational machine fails.
    fn failure_interval(&mut self) -> f64;
    /// Time a repairman needs to fix one machine.
    fn repair_interval(&mut self) -> f64;
}

/// Exponential failure and repair times drawn from a single seeded RNG.
#[derive(Debug, Clone)]
pub struct ExponentialVariates {
    failure_rate: f64,
    repair_rate: f64,
    rng: StdRng,
}

impl ExponentialVariates {
    /// `seed: None` seeds from OS entropy.
    pub fn new(failure_rate: f64, repair_rate: f64, seed: Option<u64>) -> Result<Self, SimError> {
        ensure_positive_rate("failure_rate", failure_rate)?;
        ensure_positive_rate("repair_rate", repair_rate)?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            failure_rate,
            repair_rate,
            rng,
        })
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    pub fn repair_rate(&self) -> f64 {
        self.repair_rate
    }
}

impl VariateSource for ExponentialVariates {
    fn failure_interval(&mut self) -> f64 {
        sample_exponential(&mut self.rng, self.failure_rate)
    }

    fn repair_interval(&mut self) -> f64 {
        sample_exponential(&mut self.rng, self.repair_rate)
    }
}

/// A fixed list of intervals replayed in order. The last value repeats forever.
#[derive(Debug, Clone)]
pub struct ScriptedSequence {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedSequence {
    pub fn new(values: Vec<f64>) -> Result<Self, SimError> {
        if values.is_empty() {
            return Err(SimError::invalid("sequence", "needs at least one interval"));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(SimError::invalid(
                "sequence",
                format!("intervals must be finite and >= 0, got {bad}"),
            ));
        }
        Ok(Self { values, cursor: 0 })
    }

    pub fn next_interval(&mut self) -> f64 {
        let idx = self.cursor.min(self.values.len() - 1);
        self.cursor += 1;
        self.values[idx]
    }

    /// How many intervals have been handed out so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

/// Replays scripted failure and repair intervals.
#[derive(Debug, Clone)]
pub struct ScriptedVariates {
    pub failures: ScriptedSequence,
    pub repairs: ScriptedSequence,
}

impl ScriptedVariates {
    pub fn new(failures: Vec<f64>, repairs: Vec<f64>) -> Result<Self, SimError> {
        Ok(Self {
            failures: ScriptedSequence::new(failures)?,
            repairs: ScriptedSequence::new(repairs)?,
        })
    }
}

impl VariateSource for ScriptedVariates {
    fn failure_interval(&mut self) -> f64 {
        self.failures.next_interval()
    }

    fn repair_interval(&mut self) -> f64 {
        self.repairs.next_interval()
    }
}

/// The variate source used by the running simulation.
#[derive(Debug, Resource)]
pub struct Variates(pub Box<dyn VariateSource>);

impl Variates {
    pub fn new(source: impl VariateSource + 'static) -> Self {
        Self(Box::new(source))
    }

    pub fn failure_interval(&mut self) -> f64 {
        self.0.failure_interval()
    }

    pub fn repair_interval(&mut self) -> f64 {
        self.0.repair_interval()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn exponential_rejects_non_positive_rate() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            exponential_variate(&mut rng, 0.0),
            Err(SimError::InvalidArgument { name: "rate", .. })
        ));
        assert!(exponential_variate(&mut rng, -2.0).is_err());
    }

    #[test]
    fn uniform_zero_draw_stays_finite() {
        // All-zero bits make `gen::<f64>()` return exactly 0.0.
        let mut rng = StepRng::new(0, 0);
        let sample = exponential_variate(&mut rng, 2.0).expect("valid rate");
        assert_eq!(sample, 0.0);

        let mut rng = StepRng::new(u64::MAX, 0);
        let sample = exponential_variate(&mut rng, 2.0).expect("valid rate");
        assert!(sample.is_finite());
        assert!(sample > 0.0);
    }

    #[test]
    fn exponential_mean_matches_rate() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 200_000;
        let rate = 0.4;
        let mean: f64 = (0..n)
            .map(|_| exponential_variate(&mut rng, rate).expect("valid rate"))
            .sum::<f64>()
            / n as f64;
        assert!((mean - 1.0 / rate).abs() < 0.05, "mean was {mean}");
    }

    #[test]
    fn seeded_sources_are_reproducible() {
        let mut a = ExponentialVariates::new(0.4, 0.6, Some(7)).expect("rates");
        let mut b = ExponentialVariates::new(0.4, 0.6, Some(7)).expect("rates");
        for _ in 0..10 {
            assert_eq!(a.failure_interval(), b.failure_interval());
            assert_eq!(a.repair_interval(), b.repair_interval());
        }
    }

    #[test]
    fn scripted_sequence_repeats_last_value() {
        let mut seq = ScriptedSequence::new(vec![2.0, 3.0]).expect("script");
        assert_eq!(seq.next_interval(), 2.0);
        assert_eq!(seq.next_interval(), 3.0);
        assert_eq!(seq.next_interval(), 3.0);
        assert_eq!(seq.consumed(), 3);
    }

    #[test]
    fn scripted_sequence_rejects_empty_and_negative() {
        assert!(ScriptedSequence::new(vec![]).is_err());
        assert!(ScriptedSequence::new(vec![1.0, -0.5]).is_err());
        assert!(ScriptedSequence::new(vec![f64::NAN]).is_err());
    }

    #[test]
    fn scripted_streams_are_independent() {
        let mut variates = ScriptedVariates::new(vec![2.0, 3.0], vec![1.0]).expect("script");
        assert_eq!(variates.repair_interval(), 1.0);
        assert_eq!(variates.failure_interval(), 2.0);
        assert_eq!(variates.repair_interval(), 1.0);
        assert_eq!(variates.failure_interval(), 3.0);
    }
}
