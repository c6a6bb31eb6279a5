//! Core traits for Simulated Annealing.
//!
//! [`Cost`] and [`SaProblem`] form the contract between the generic
//! annealing engine and a concrete problem. The engine never looks inside
//! a solution: it clones it, asks for its cost, and asks for a neighbor.

use rand::Rng;

/// Scalar objective value. Lower is better (minimization).
///
/// Costs are compared with `PartialOrd` and promoted to `f64` before the
/// Metropolis exponent is computed, so integer costs never go through
/// integer division.
///
/// Built-in implementations exist for `f64`, `f32`, `i32`, `i64`, `u32`,
/// `u64` and `usize`. For maximization, negate the cost.
pub trait Cost: PartialOrd + Copy + Send + Sync + std::fmt::Debug + 'static {
    /// Converts the cost to `f64` for the acceptance test, logging and
    /// statistics.
    fn to_f64(self) -> f64;
}

impl Cost for f64 {
    fn to_f64(self) -> f64 {
        self
    }
}

impl Cost for f32 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

macro_rules! impl_integer_cost {
    ($($t:ty),*) => {
        $(
            impl Cost for $t {
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_integer_cost!(i32, i64, u32, u64, usize);

/// Defines a Simulated Annealing problem.
///
/// The user implements initial-solution construction, neighbor generation
/// and cost evaluation. The SA framework handles temperature management,
/// the acceptance criterion, cooling and best tracking.
///
/// # Contract
///
/// - [`cost`](SaProblem::cost) is pure and deterministic for a fixed
///   solution.
/// - [`neighbor`](SaProblem::neighbor) returns an independent candidate.
///   The engine discards rejected candidates, so a rejection never needs
///   to undo anything.
/// - [`neighbor`](SaProblem::neighbor) preserves the structural validity
///   the problem defines (a permutation stays a permutation).
///
/// # Examples
///
/// ```
/// use rand::Rng;
/// use rand::seq::SliceRandom;
/// use u_anneal::sa::SaProblem;
///
/// struct TspProblem { distances: Vec<Vec<u64>> }
///
/// impl SaProblem for TspProblem {
///     type Solution = Vec<usize>;
///     type Cost = u64;
///
///     fn initial_solution<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
///         let mut tour: Vec<usize> = (0..self.distances.len()).collect();
///         tour.shuffle(rng);
///         tour
///     }
///
///     fn cost(&self, tour: &Vec<usize>) -> u64 {
///         tour.windows(2).map(|w| self.distances[w[0]][w[1]]).sum()
///     }
///
///     fn neighbor<R: Rng>(&self, tour: &Vec<usize>, rng: &mut R) -> Vec<usize> {
///         let mut new = tour.clone();
///         let i = rng.random_range(0..new.len());
///         let j = rng.random_range(0..new.len());
///         new.swap(i, j);
///         new
///     }
/// }
/// ```
pub trait SaProblem: Send + Sync {
    /// The solution representation type.
    type Solution: Clone + Send;

    /// The objective value type.
    type Cost: Cost;

    /// Creates an initial solution. May be randomized or fixed.
    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Self::Solution;

    /// Computes the cost of a solution. Lower is better.
    fn cost(&self, solution: &Self::Solution) -> Self::Cost;

    /// Generates a neighbor of the given solution.
    ///
    /// The neighbor should be "close" to the input (small perturbation)
    /// and the neighborhood should be connected.
    fn neighbor<R: Rng>(&self, solution: &Self::Solution, rng: &mut R) -> Self::Solution;

    /// Checks the structural invariants of a solution.
    ///
    /// Called by the engine only when
    /// [`SaConfig::check_solutions`](super::SaConfig::check_solutions) is
    /// set. An `Err` aborts the run with
    /// [`SaError::ContractViolation`](super::SaError::ContractViolation).
    fn check(&self, _solution: &Self::Solution) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_cost_promotes_exactly() {
        assert_eq!(7u64.to_f64(), 7.0);
        assert_eq!((-3i32).to_f64(), -3.0);
        assert_eq!(usize::MAX.to_f64(), usize::MAX as f64);
    }

    #[test]
    fn test_float_cost_identity() {
        assert_eq!(2.5f64.to_f64(), 2.5);
        assert_eq!(0.5f32.to_f64(), 0.5);
    }
}
