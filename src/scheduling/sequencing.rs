//! Sequential ordering: arrange values so consecutive entries are close.

use rand::Rng;

use super::permutation::{check_permutation, random_permutation, swap_neighbor};
use super::InstanceError;
use crate::sa::SaProblem;

/// Orders a set of values to minimize `Σ (v[s[i]] - v[s[i-1]])²`.
///
/// A solution is a permutation of value indices. Sorted and
/// reverse-sorted orders are optimal.
#[derive(Debug, Clone)]
pub struct AdjacentSquaredGap {
    values: Vec<i64>,
}

impl AdjacentSquaredGap {
    pub fn new(values: Vec<i64>) -> Result<Self, InstanceError> {
        if values.is_empty() {
            return Err(InstanceError::Empty("values"));
        }
        Ok(Self { values })
    }

    /// The values `1..=5`.
    pub fn demo() -> Self {
        Self {
            values: (1..=5).collect(),
        }
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// The values in the order given by `order`.
    pub fn arrange(&self, order: &[usize]) -> Vec<i64> {
        order.iter().map(|&i| self.values[i]).collect()
    }
}

impl SaProblem for AdjacentSquaredGap {
    type Solution = Vec<usize>;
    type Cost = i64;

    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        random_permutation(self.values.len(), rng)
    }

    fn cost(&self, order: &Vec<usize>) -> i64 {
        order
            .windows(2)
            .map(|w| {
                let gap = self.values[w[1]] - self.values[w[0]];
                gap * gap
            })
            .sum()
    }

    fn neighbor<R: Rng>(&self, order: &Vec<usize>, rng: &mut R) -> Vec<usize> {
        swap_neighbor(order, rng)
    }

    fn check(&self, order: &Vec<usize>) -> Result<(), String> {
        check_permutation(order, self.values.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sa::{SaConfig, SaRunner};
    use crate::scheduling::permutation::all_permutations;

    #[test]
    fn test_cost_of_known_orders() {
        let problem = AdjacentSquaredGap::demo();
        assert_eq!(problem.cost(&vec![0, 1, 2, 3, 4]), 4);
        assert_eq!(problem.cost(&vec![4, 3, 2, 1, 0]), 4);
        // 1 3 5 2 4: 4 + 4 + 9 + 4
        assert_eq!(problem.cost(&vec![0, 2, 4, 1, 3]), 21);
    }

    #[test]
    fn test_reaches_brute_force_minimum() {
        let problem = AdjacentSquaredGap::demo();
        let optimum = all_permutations(5)
            .iter()
            .map(|p| problem.cost(p))
            .min()
            .unwrap();
        assert_eq!(optimum, 4);

        let config = SaConfig::default()
            .with_initial_temperature(100.0)
            .with_cooling_factor(0.95)
            .with_min_temperature(1e-5)
            .with_iterations_per_temperature(10)
            .with_check_solutions(true)
            .with_seed(42);
        let result = SaRunner::run(&problem, &config).unwrap();

        assert_eq!(result.best_cost, optimum);
        let arranged = problem.arrange(&result.best);
        assert!(
            arranged.windows(2).all(|w| w[0] < w[1]) || arranged.windows(2).all(|w| w[0] > w[1]),
            "optimal order must be monotone, got {arranged:?}"
        );
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            AdjacentSquaredGap::new(vec![]).unwrap_err(),
            InstanceError::Empty("values")
        );
    }
}
