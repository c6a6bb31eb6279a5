//! Error types for the annealing engine.

use thiserror::Error;

/// An invalid [`SaConfig`](super::SaConfig), detected before any iteration
/// runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("initial_temperature must be positive and finite, got {0}")]
    InitialTemperature(f64),

    #[error("min_temperature must be positive, got {0}")]
    MinTemperature(f64),

    #[error("min_temperature ({min}) must be less than initial_temperature ({initial})")]
    TemperatureOrder { min: f64, initial: f64 },

    #[error("geometric alpha must be in (0, 1), got {0}")]
    CoolingFactor(f64),

    #[error("lundy-mees beta must be positive, got {0}")]
    LundyMeesBeta(f64),

    #[error("iterations_per_temperature must be at least 1")]
    ZeroIterationsPerTemperature,

    #[error("linear cooling requires a min_temperature")]
    LinearWithoutMinTemperature,

    #[error("no termination bound: set min_temperature or max_iterations")]
    NoTerminationBound,

    #[error("a multi-start batch needs at least one run")]
    NoRuns,
}

/// Failure of an annealing run.
///
/// A failed run yields no solution at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SaError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The problem rejected one of its own solutions through
    /// [`SaProblem::check`](super::SaProblem::check).
    #[error("problem produced an invalid {stage} solution: {reason}")]
    ContractViolation { stage: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts() {
        let err: SaError = ConfigError::NoTerminationBound.into();
        assert_eq!(err, SaError::Config(ConfigError::NoTerminationBound));
        assert!(err.to_string().contains("no termination bound"));
    }

    #[test]
    fn test_contract_violation_message() {
        let err = SaError::ContractViolation {
            stage: "neighbor",
            reason: "duplicate job 3".into(),
        };
        assert_eq!(
            err.to_string(),
            "problem produced an invalid neighbor solution: duplicate job 3"
        );
    }
}
