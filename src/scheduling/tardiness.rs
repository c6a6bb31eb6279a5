//! Single machine tardiness scheduling.
//!
//! Covers three classic variants with one type:
//!
//! - total tardiness `Σ max(0, C_j - d_j)`
//! - total weighted tardiness `Σ w_j · max(0, C_j - d_j)`
//! - either of the above with sequence-dependent setup times
//!
//! A solution is the processing order of the jobs. Times and weighted
//! tardiness saturate at `u64::MAX` instead of overflowing.

use rand::Rng;

use super::permutation::{check_permutation, random_permutation, swap_neighbor};
use super::InstanceError;
use crate::sa::SaProblem;

/// One job on the single machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TardinessJob {
    pub processing_time: u64,
    pub due_date: u64,
    pub weight: u64,
}

/// Single machine tardiness problem.
#[derive(Debug, Clone)]
pub struct SingleMachineTardiness {
    jobs: Vec<TardinessJob>,
    /// Row-major `n × n`; entry `(i, j)` is the setup before `j` when it
    /// directly follows `i`.
    setup_times: Option<Vec<u64>>,
}

impl SingleMachineTardiness {
    /// Total tardiness with unit weights.
    pub fn new(processing_times: &[u64], due_dates: &[u64]) -> Result<Self, InstanceError> {
        let weights = vec![1; processing_times.len()];
        Self::weighted(processing_times, due_dates, &weights)
    }

    /// Total weighted tardiness.
    pub fn weighted(
        processing_times: &[u64],
        due_dates: &[u64],
        weights: &[u64],
    ) -> Result<Self, InstanceError> {
        let n = processing_times.len();
        if n == 0 {
            return Err(InstanceError::Empty("jobs"));
        }
        expect_len("due dates", n, due_dates.len())?;
        expect_len("weights", n, weights.len())?;

        let jobs = processing_times
            .iter()
            .zip(due_dates)
            .zip(weights)
            .map(|((&processing_time, &due_date), &weight)| TardinessJob {
                processing_time,
                due_date,
                weight,
            })
            .collect();
        Ok(Self {
            jobs,
            setup_times: None,
        })
    }

    /// Adds sequence-dependent setup times; `setup_times[i][j]` is spent
    /// before job `j` when it directly follows job `i`.
    pub fn with_setup_times(mut self, setup_times: &[Vec<u64>]) -> Result<Self, InstanceError> {
        let n = self.jobs.len();
        expect_len("setup rows", n, setup_times.len())?;
        let mut flat = Vec::with_capacity(n * n);
        for row in setup_times {
            expect_len("setup row", n, row.len())?;
            flat.extend_from_slice(row);
        }
        self.setup_times = Some(flat);
        Ok(self)
    }

    /// Five jobs with processing times `{3,5,2,7,4}` and due dates
    /// `{10,15,7,20,11}`.
    pub fn demo() -> Self {
        Self::from_jobs(&[(3, 10, 1), (5, 15, 1), (2, 7, 1), (7, 20, 1), (4, 11, 1)])
    }

    /// Five weighted jobs.
    pub fn weighted_demo() -> Self {
        Self::from_jobs(&[(3, 5, 4), (7, 14, 2), (2, 4, 5), (5, 10, 7), (4, 12, 3)])
    }

    /// Six jobs with sequence-dependent setups.
    pub fn setup_demo() -> Self {
        let mut problem = Self::from_jobs(&[
            (4, 6, 1),
            (3, 9, 1),
            (6, 20, 1),
            (2, 5, 1),
            (5, 18, 1),
            (3, 14, 1),
        ]);
        let setups: [[u64; 6]; 6] = [
            [0, 2, 4, 1, 3, 2],
            [2, 0, 3, 2, 1, 4],
            [4, 3, 0, 5, 2, 1],
            [1, 2, 5, 0, 4, 3],
            [3, 1, 2, 4, 0, 2],
            [2, 4, 1, 3, 2, 0],
        ];
        problem.setup_times = Some(setups.iter().flatten().copied().collect());
        problem
    }

    /// A random instance with processing times in `1..=20`, due dates in
    /// `1..=50` and unit weights.
    pub fn random<R: Rng>(n: usize, rng: &mut R) -> Result<Self, InstanceError> {
        let processing: Vec<u64> = (0..n).map(|_| rng.random_range(1..=20)).collect();
        let due: Vec<u64> = (0..n).map(|_| rng.random_range(1..=50)).collect();
        Self::new(&processing, &due)
    }

    fn from_jobs(jobs: &[(u64, u64, u64)]) -> Self {
        Self {
            jobs: jobs
                .iter()
                .map(|&(processing_time, due_date, weight)| TardinessJob {
                    processing_time,
                    due_date,
                    weight,
                })
                .collect(),
            setup_times: None,
        }
    }

    pub fn jobs(&self) -> &[TardinessJob] {
        &self.jobs
    }

    fn setup(&self, previous: Option<usize>, next: usize) -> u64 {
        match (&self.setup_times, previous) {
            (Some(setups), Some(prev)) => setups[prev * self.jobs.len() + next],
            _ => 0,
        }
    }

    /// Completion time of each job, indexed by job.
    pub fn completion_times(&self, order: &[usize]) -> Vec<u64> {
        let mut completion = vec![0; self.jobs.len()];
        let mut time = 0u64;
        let mut previous = None;
        for &j in order {
            time = time
                .saturating_add(self.setup(previous, j))
                .saturating_add(self.jobs[j].processing_time);
            completion[j] = time;
            previous = Some(j);
        }
        completion
    }
}

fn expect_len(what: &'static str, expected: usize, found: usize) -> Result<(), InstanceError> {
    if expected == found {
        Ok(())
    } else {
        Err(InstanceError::LengthMismatch {
            what,
            expected,
            found,
        })
    }
}

impl SaProblem for SingleMachineTardiness {
    type Solution = Vec<usize>;
    type Cost = u64;

    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        random_permutation(self.jobs.len(), rng)
    }

    fn cost(&self, order: &Vec<usize>) -> u64 {
        let mut time = 0u64;
        let mut previous = None;
        let mut total = 0u64;
        for &j in order {
            let job = &self.jobs[j];
            time = time
                .saturating_add(self.setup(previous, j))
                .saturating_add(job.processing_time);
            let tardiness = time.saturating_sub(job.due_date);
            total = total.saturating_add(job.weight.saturating_mul(tardiness));
            previous = Some(j);
        }
        total
    }

    fn neighbor<R: Rng>(&self, order: &Vec<usize>, rng: &mut R) -> Vec<usize> {
        swap_neighbor(order, rng)
    }

    fn check(&self, order: &Vec<usize>) -> Result<(), String> {
        check_permutation(order, self.jobs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sa::{SaConfig, SaRunner};
    use crate::scheduling::permutation::all_permutations;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn brute_force(problem: &SingleMachineTardiness) -> u64 {
        all_permutations(problem.jobs().len())
            .iter()
            .map(|p| problem.cost(p))
            .min()
            .unwrap()
    }

    #[test]
    fn test_identity_tardiness() {
        let problem = SingleMachineTardiness::demo();
        // completions 3, 8, 10, 17, 21 against dues 10, 15, 7, 20, 11
        assert_eq!(problem.cost(&vec![0, 1, 2, 3, 4]), 3 + 10);
        assert_eq!(problem.completion_times(&[0, 1, 2, 3, 4]), vec![3, 8, 10, 17, 21]);
    }

    #[test]
    fn test_beats_identity_sequence() {
        let problem = SingleMachineTardiness::demo();
        let identity = problem.cost(&vec![0, 1, 2, 3, 4]);
        let config = SaConfig::default()
            .with_iterations_per_temperature(20)
            .with_seed(42);

        let result = SaRunner::run(&problem, &config).unwrap();

        assert!(result.best_cost <= identity);
        assert_eq!(result.best_cost, brute_force(&problem));
    }

    #[test]
    fn test_weighted_cost() {
        let problem = SingleMachineTardiness::weighted(&[2, 3], &[1, 1], &[5, 1]).unwrap();
        // job 0 first: C = 2, 5 -> 5*1 + 1*4
        assert_eq!(problem.cost(&vec![0, 1]), 9);
        // job 1 first: C = 3, 5 -> 1*2 + 5*4
        assert_eq!(problem.cost(&vec![1, 0]), 22);
    }

    #[test]
    fn test_weighted_demo_optimum() {
        let problem = SingleMachineTardiness::weighted_demo();
        let config = SaConfig::default()
            .with_iterations_per_temperature(20)
            .with_seed(7);
        let result = SaRunner::run(&problem, &config).unwrap();
        assert_eq!(result.best_cost, brute_force(&problem));
    }

    #[test]
    fn test_setup_times_enter_completion() {
        let problem = SingleMachineTardiness::new(&[2, 3], &[0, 0])
            .unwrap()
            .with_setup_times(&[vec![0, 4], vec![1, 0]])
            .unwrap();
        assert_eq!(problem.completion_times(&[0, 1]), vec![2, 9]);
        assert_eq!(problem.completion_times(&[1, 0]), vec![6, 3]);
        assert_eq!(problem.cost(&vec![1, 0]), 9);
    }

    #[test]
    fn test_huge_values_saturate() {
        let big = u64::MAX / 2 + 1;
        let problem = SingleMachineTardiness::weighted(&[big, big, big], &[0, 0, 0], &[3, 1, 1])
            .unwrap()
            .with_setup_times(&[vec![0, big, big], vec![big, 0, big], vec![big, big, 0]])
            .unwrap();
        assert_eq!(problem.cost(&vec![0, 1, 2]), u64::MAX);
        assert_eq!(problem.completion_times(&[0, 1, 2]), vec![big, u64::MAX, u64::MAX]);
    }

    #[test]
    fn test_setup_demo_optimum() {
        let problem = SingleMachineTardiness::setup_demo();
        let config = SaConfig::default()
            .with_iterations_per_temperature(50)
            .without_max_iterations()
            .with_seed(3);
        let result = SaRunner::run(&problem, &config).unwrap();
        assert_eq!(result.best_cost, brute_force(&problem));
    }

    #[test]
    fn test_random_instance_ranges() {
        let mut rng = StdRng::seed_from_u64(1);
        let problem = SingleMachineTardiness::random(10, &mut rng).unwrap();
        assert_eq!(problem.jobs().len(), 10);
        for job in problem.jobs() {
            assert!((1..=20).contains(&job.processing_time));
            assert!((1..=50).contains(&job.due_date));
            assert_eq!(job.weight, 1);
        }
    }

    #[test]
    fn test_instance_errors() {
        assert_eq!(
            SingleMachineTardiness::new(&[], &[]).unwrap_err(),
            InstanceError::Empty("jobs")
        );
        assert_eq!(
            SingleMachineTardiness::new(&[1, 2], &[1]).unwrap_err(),
            InstanceError::LengthMismatch {
                what: "due dates",
                expected: 2,
                found: 1
            }
        );
        let err = SingleMachineTardiness::new(&[1, 2], &[1, 1])
            .unwrap()
            .with_setup_times(&[vec![0, 1], vec![0]])
            .unwrap_err();
        assert!(matches!(err, InstanceError::LengthMismatch { what: "setup row", .. }));
    }
}
