use bevy_ecs::prelude::Entity;

/// Errors raised while configuring or running a repairman simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// A rate, count or stop target is out of range. Raised before the run starts.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// The event queue ran dry before the stop condition was met.
    #[error("event queue exhausted at t={at} before the stop condition was reached")]
    EmptyQueue { at: f64 },

    /// An event referenced an entity that does not carry the expected component.
    #[error("{role} event refers to unknown entity {entity:?}")]
    UnknownEntity { role: &'static str, entity: Entity },

    /// A repair completion fired for a repairman with no assigned machine.
    #[error("repair completion for repairman {entity:?} with no assigned machine")]
    IdleRepairCompletion { entity: Entity },

    /// A scheduled event landed at an infinite or NaN time.
    #[error("event scheduled at non-finite time after t={at}")]
    NonFiniteTime { at: f64 },
}

impl SimError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// True for conditions that indicate a defect in the engine rather than bad input.
    pub fn is_engine_defect(&self) -> bool {
        !matches!(self, Self::InvalidArgument { .. })
    }
}

/// Smallest accepted rate. Below it a single exponential draw can overflow to infinity.
pub const MIN_RATE: f64 = 1e-300;

/// Checks that a rate is a finite number no smaller than [MIN_RATE].
pub fn ensure_positive_rate(name: &'static str, rate: f64) -> Result<(), SimError> {
    if !rate.is_finite() {
        return Err(SimError::invalid(name, format!("must be finite, got {rate}")));
    }
    if rate <= 0.0 {
        return Err(SimError::invalid(name, format!("must be > 0, got {rate}")));
    }
    if rate < MIN_RATE {
        return Err(SimError::invalid(
            name,
            format!("must be at least {MIN_RATE:e}, got {rate:e}"),
        ));
    }
    Ok(())
}
