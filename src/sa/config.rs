//! SA configuration and cooling schedules.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::acceptance::DrawPolicy;
use super::error::ConfigError;

/// Cooling schedule for temperature reduction.
///
/// # References
///
/// - Geometric: standard textbook approach
/// - Linear: fixed-duration cooling
/// - LundyMees: Lundy & Mees (1986), with convergence proof
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum CoolingSchedule {
    /// Geometric (exponential) cooling: `T_{k+1} = alpha * T_k`.
    ///
    /// Most widely used. Typical `alpha`: 0.95–0.99.
    Geometric {
        /// Cooling factor in (0, 1). Higher = slower cooling.
        alpha: f64,
    },

    /// Linear cooling: `T_k = T_0 - k * (T_0 - T_min) / steps`.
    ///
    /// Fixed total duration. Requires a minimum temperature. The number of
    /// steps is derived from `max_iterations` when set.
    Linear,

    /// Lundy-Mees cooling: `T_{k+1} = T_k / (1 + beta * T_k)`.
    ///
    /// Cools fast at high T, slow at low T. Has a convergence proof.
    LundyMees {
        /// Cooling parameter. Typically `(T_0 - T_min) / (max_iter * T_0 * T_min)`.
        beta: f64,
    },
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        CoolingSchedule::Geometric { alpha: 0.95 }
    }
}

/// Configuration for a Simulated Annealing run.
///
/// The run stops as soon as the temperature is no longer above
/// `min_temperature` or `max_iterations` neighbor evaluations have been
/// made, whichever comes first. Either bound may be disabled with `None`,
/// but not both.
///
/// # Examples
///
/// ```
/// use u_anneal::sa::{CoolingSchedule, SaConfig};
///
/// let config = SaConfig::default()
///     .with_initial_temperature(100.0)
///     .with_min_temperature(1e-5)
///     .with_cooling(CoolingSchedule::Geometric { alpha: 0.98 })
///     .with_max_iterations(20_000)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SaConfig {
    /// Initial temperature. Higher values allow more exploration.
    pub initial_temperature: f64,

    /// The run stops once the temperature drops to this value.
    /// `None` disables the temperature bound.
    pub min_temperature: Option<f64>,

    /// Maximum number of neighbor evaluations. `None` disables the bound.
    pub max_iterations: Option<usize>,

    /// Cooling schedule.
    pub cooling: CoolingSchedule,

    /// Number of iterations at each temperature level. 1 cools after
    /// every iteration.
    pub iterations_per_temperature: usize,

    /// When the acceptance test consumes a random draw.
    pub draw_policy: DrawPolicy,

    /// Run [`SaProblem::check`](super::SaProblem::check) on the initial
    /// solution and on every neighbor.
    pub check_solutions: bool,

    /// Best cost is sampled into the history every this many iterations.
    pub history_interval: usize,

    /// Random seed for reproducibility. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            min_temperature: Some(1e-3),
            max_iterations: Some(10_000),
            cooling: CoolingSchedule::default(),
            iterations_per_temperature: 1,
            draw_policy: DrawPolicy::default(),
            check_solutions: false,
            history_interval: 100,
            seed: None,
        }
    }
}

impl SaConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = Some(t);
        self
    }

    pub fn without_min_temperature(mut self) -> Self {
        self.min_temperature = None;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = Some(n);
        self
    }

    pub fn without_max_iterations(mut self) -> Self {
        self.max_iterations = None;
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    /// Shorthand for geometric cooling with the given factor.
    pub fn with_cooling_factor(mut self, alpha: f64) -> Self {
        self.cooling = CoolingSchedule::Geometric { alpha };
        self
    }

    pub fn with_iterations_per_temperature(mut self, n: usize) -> Self {
        self.iterations_per_temperature = n;
        self
    }

    pub fn with_draw_policy(mut self, policy: DrawPolicy) -> Self {
        self.draw_policy = policy;
        self
    }

    pub fn with_check_solutions(mut self, check: bool) -> Self {
        self.check_solutions = check;
        self
    }

    pub fn with_history_interval(mut self, n: usize) -> Self {
        self.history_interval = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let initial = self.initial_temperature;
        if !(initial > 0.0 && initial.is_finite()) {
            return Err(ConfigError::InitialTemperature(initial));
        }
        if let Some(min) = self.min_temperature {
            if !(min > 0.0) {
                return Err(ConfigError::MinTemperature(min));
            }
            if min >= initial {
                return Err(ConfigError::TemperatureOrder { min, initial });
            }
        }
        match self.cooling {
            CoolingSchedule::Geometric { alpha } => {
                if !(alpha > 0.0 && alpha < 1.0) {
                    return Err(ConfigError::CoolingFactor(alpha));
                }
            }
            CoolingSchedule::LundyMees { beta } => {
                if !(beta > 0.0 && beta.is_finite()) {
                    return Err(ConfigError::LundyMeesBeta(beta));
                }
            }
            CoolingSchedule::Linear => {
                if self.min_temperature.is_none() {
                    return Err(ConfigError::LinearWithoutMinTemperature);
                }
            }
        }
        if self.iterations_per_temperature == 0 {
            return Err(ConfigError::ZeroIterationsPerTemperature);
        }
        if self.min_temperature.is_none() && self.max_iterations.is_none() {
            return Err(ConfigError::NoTerminationBound);
        }
        Ok(())
    }

    /// Upper bound on the number of iterations a valid configuration runs.
    ///
    /// For geometric cooling with a minimum temperature this is
    /// `ceil(log(T_min / T_0) / log(alpha)) * iterations_per_temperature`,
    /// capped by `max_iterations`. Other schedules only report the cap.
    pub fn iteration_bound(&self) -> Option<usize> {
        let by_temperature = match (self.cooling, self.min_temperature) {
            (CoolingSchedule::Geometric { alpha }, Some(min)) => {
                let steps = ((min / self.initial_temperature).ln() / alpha.ln()).ceil();
                Some((steps.max(0.0) as usize).saturating_mul(self.iterations_per_temperature))
            }
            _ => None,
        };
        match (by_temperature, self.max_iterations) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
