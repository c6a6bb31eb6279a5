//! Permutation flow shop.
//!
//! Every job visits machines `0..m` in the same order, and every machine
//! processes the jobs in the same sequence. The solution is that sequence.
//! Completion times saturate at `u64::MAX`.

use rand::Rng;

use super::permutation::{check_permutation, random_permutation, swap_neighbor};
use super::InstanceError;
use crate::sa::SaProblem;

/// Permutation flow shop minimizing makespan.
#[derive(Debug, Clone)]
pub struct FlowShop {
    jobs: usize,
    machines: usize,
    /// Row-major `jobs × machines`.
    processing: Vec<u64>,
}

impl FlowShop {
    /// `processing[j][m]` is the time job `j` spends on machine `m`.
    pub fn new(processing: &[Vec<u64>]) -> Result<Self, InstanceError> {
        let jobs = processing.len();
        if jobs == 0 {
            return Err(InstanceError::Empty("jobs"));
        }
        let machines = processing[0].len();
        if machines == 0 {
            return Err(InstanceError::Empty("machines"));
        }
        for row in processing {
            if row.len() != machines {
                return Err(InstanceError::LengthMismatch {
                    what: "processing row",
                    expected: machines,
                    found: row.len(),
                });
            }
        }
        Ok(Self {
            jobs,
            machines,
            processing: processing.concat(),
        })
    }

    /// Ten jobs on five stages.
    pub fn demo() -> Self {
        let rows: [[u64; 5]; 10] = [
            [3, 2, 6, 5, 8],
            [2, 5, 3, 7, 4],
            [4, 2, 3, 6, 3],
            [6, 1, 2, 5, 4],
            [5, 3, 6, 2, 5],
            [2, 3, 4, 3, 7],
            [3, 2, 5, 4, 6],
            [4, 3, 2, 5, 4],
            [5, 4, 3, 2, 6],
            [3, 6, 4, 5, 2],
        ];
        Self {
            jobs: rows.len(),
            machines: 5,
            processing: rows.iter().flatten().copied().collect(),
        }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    pub fn machines(&self) -> usize {
        self.machines
    }

    fn time(&self, job: usize, machine: usize) -> u64 {
        self.processing[job * self.machines + machine]
    }

    /// Completion time on the last machine of each job, in sequence order.
    pub fn completion_times(&self, order: &[usize]) -> Vec<u64> {
        let mut ready = vec![0u64; self.machines];
        order
            .iter()
            .map(|&j| {
                self.advance(&mut ready, j);
                ready[self.machines - 1]
            })
            .collect()
    }

    /// Schedules `job` after the jobs already reflected in `ready`, the
    /// per-machine completion times.
    fn advance(&self, ready: &mut [u64], job: usize) {
        let mut prev = 0;
        for (m, slot) in ready.iter_mut().enumerate() {
            *slot = (*slot).max(prev).saturating_add(self.time(job, m));
            prev = *slot;
        }
    }
}

impl SaProblem for FlowShop {
    type Solution = Vec<usize>;
    type Cost = u64;

    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        random_permutation(self.jobs, rng)
    }

    fn cost(&self, order: &Vec<usize>) -> u64 {
        let mut ready = vec![0u64; self.machines];
        for &j in order {
            self.advance(&mut ready, j);
        }
        ready[self.machines - 1]
    }

    fn neighbor<R: Rng>(&self, order: &Vec<usize>, rng: &mut R) -> Vec<usize> {
        swap_neighbor(order, rng)
    }

    fn check(&self, order: &Vec<usize>) -> Result<(), String> {
        check_permutation(order, self.jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sa::{SaConfig, SaRunner};
    use crate::scheduling::permutation::all_permutations;

    fn small() -> FlowShop {
        FlowShop::new(&[vec![3, 2, 5], vec![1, 4, 2], vec![4, 3, 6], vec![2, 5, 1]]).unwrap()
    }

    #[test]
    fn test_makespan_by_hand() {
        let problem = FlowShop::new(&[vec![2, 3], vec![4, 1]]).unwrap();
        // job 0 then 1: M0 2, 6; M1 5, 7
        assert_eq!(problem.cost(&vec![0, 1]), 7);
        // job 1 then 0: M0 4, 6; M1 5, 9
        assert_eq!(problem.cost(&vec![1, 0]), 9);
        assert_eq!(problem.completion_times(&[0, 1]), vec![5, 7]);
    }

    #[test]
    fn test_reaches_brute_force_optimum() {
        let problem = small();
        let optimum = all_permutations(4)
            .iter()
            .map(|p| problem.cost(p))
            .min()
            .unwrap();
        let config = SaConfig::default()
            .with_iterations_per_temperature(10)
            .with_seed(42);

        let result = SaRunner::run(&problem, &config).unwrap();

        assert_eq!(result.best_cost, optimum);
    }

    #[test]
    fn test_demo_lower_bound() {
        let problem = FlowShop::demo();
        let config = SaConfig::default().with_check_solutions(true).with_seed(1);
        let result = SaRunner::run(&problem, &config).unwrap();

        // No schedule beats the busiest machine's total load.
        let busiest = (0..problem.machines())
            .map(|m| (0..problem.jobs()).map(|j| problem.time(j, m)).sum::<u64>())
            .max()
            .unwrap();
        assert!(result.best_cost >= busiest);
        let identity: Vec<usize> = (0..10).collect();
        assert!(result.best_cost <= problem.cost(&identity));
    }

    #[test]
    fn test_huge_times_saturate() {
        let big = u64::MAX / 2 + 1;
        let problem = FlowShop::new(&[vec![big, big], vec![big, 1]]).unwrap();
        assert_eq!(problem.cost(&vec![0, 1]), u64::MAX);
        assert_eq!(problem.completion_times(&[1, 0]), vec![big + 1, u64::MAX]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = FlowShop::new(&[vec![1, 2], vec![3]]).unwrap_err();
        assert_eq!(
            err,
            InstanceError::LengthMismatch {
                what: "processing row",
                expected: 2,
                found: 1
            }
        );
        assert_eq!(FlowShop::new(&[]).unwrap_err(), InstanceError::Empty("jobs"));
    }
}
