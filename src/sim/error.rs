use std::fmt;

/// Which post-frame check failed
#[derive(Debug, Clone, PartialEq)]
pub enum InvariantRule {
    NonFinitePosition { entity: &'static str },
    HealthAboveMax { health: f32, max: f32 },
    /// Entities marked for removal survived the end-of-frame sweep
    StaleRemoval { entity: &'static str, count: usize },
}

impl fmt::Display for InvariantRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantRule::NonFinitePosition { entity } => {
                write!(f, "{} has a non-finite position", entity)
            }
            InvariantRule::HealthAboveMax { health, max } => {
                write!(f, "ship health {} exceeds max {}", health, max)
            }
            InvariantRule::StaleRemoval { entity, count } => {
                write!(f, "{} {} entities still pending removal", count, entity)
            }
        }
    }
}

/// Frame update failure. Any of these halts the run.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    NonFiniteDelta { dt_ms: f32 },
    NegativeDelta { dt_ms: f32 },
    InvariantViolation { rule: InvariantRule },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::NonFiniteDelta { dt_ms } => write!(f, "non-finite frame delta: {}", dt_ms),
            SimError::NegativeDelta { dt_ms } => write!(f, "negative frame delta: {}ms", dt_ms),
            SimError::InvariantViolation { rule } => write!(f, "invariant violated: {}", rule),
        }
    }
}

impl std::error::Error for SimError {}

impl From<InvariantRule> for SimError {
    fn from(rule: InvariantRule) -> Self {
        SimError::InvariantViolation { rule }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SimError::NonFiniteDelta { dt_ms: f32::NAN };
        assert_eq!(err.to_string(), "non-finite frame delta: NaN");

        let err: SimError = InvariantRule::StaleRemoval {
            entity: "enemy",
            count: 2,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "invariant violated: 2 enemy entities still pending removal"
        );
    }
}
