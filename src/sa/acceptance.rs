//! Metropolis acceptance criterion.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rand::Rng;

use super::types::Cost;

/// When the acceptance test consumes a uniform random draw.
///
/// The choice does not change which moves can be accepted. It only changes
/// how far a seeded generator advances per iteration, and therefore which
/// trajectory a seeded run follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DrawPolicy {
    /// Draw only when the candidate is not strictly better.
    #[default]
    OnWorsening,

    /// Draw exactly once per iteration, improving or not.
    Always,
}

/// Outcome of one acceptance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Strictly better candidate, accepted unconditionally.
    Improving,
    /// Non-improving candidate that passed the Metropolis test.
    Accepted,
    /// Non-improving candidate that failed the Metropolis test.
    Rejected,
}

impl Decision {
    pub fn is_accepted(self) -> bool {
        !matches!(self, Decision::Rejected)
    }
}

/// Boltzmann acceptance probability `exp(-delta / temperature)`.
///
/// A non-positive `delta` has probability 1 at every temperature. A
/// worsening move at a non-positive temperature has probability 0. A NaN
/// delta yields NaN, which no draw passes.
pub fn metropolis(delta: f64, temperature: f64) -> f64 {
    if delta <= 0.0 {
        1.0
    } else if temperature > 0.0 {
        (-delta / temperature).exp()
    } else {
        0.0
    }
}

/// Decides whether `candidate` replaces `current` at `temperature`.
///
/// Strict improvements are accepted without consulting the generator's
/// result. Under [`DrawPolicy::Always`] a draw is still consumed so the
/// random stream advances by one value per call.
pub fn decide<C: Cost, R: Rng>(
    current: C,
    candidate: C,
    temperature: f64,
    policy: DrawPolicy,
    rng: &mut R,
) -> Decision {
    if candidate < current {
        if policy == DrawPolicy::Always {
            let _: f64 = rng.random();
        }
        return Decision::Improving;
    }

    let delta = candidate.to_f64() - current.to_f64();
    let probability = metropolis(delta, temperature);
    let draw: f64 = rng.random();
    if draw < probability {
        Decision::Accepted
    } else {
        Decision::Rejected
    }
}
