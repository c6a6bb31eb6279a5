//! Unrelated parallel machines.

use rand::Rng;

use super::InstanceError;
use crate::sa::SaProblem;

/// Assigns each job to one of several unrelated machines, minimizing the
/// largest machine load.
///
/// A solution is `assignment[job] = machine`. Job order on a machine does
/// not affect the makespan.
#[derive(Debug, Clone)]
pub struct UnrelatedMachines {
    machines: usize,
    jobs: usize,
    /// Row-major `machines × jobs`.
    times: Vec<u64>,
}

impl UnrelatedMachines {
    /// `times[m][j]` is the processing time of job `j` on machine `m`.
    pub fn new(times: &[Vec<u64>]) -> Result<Self, InstanceError> {
        let machines = times.len();
        if machines == 0 {
            return Err(InstanceError::Empty("machines"));
        }
        let jobs = times[0].len();
        if jobs == 0 {
            return Err(InstanceError::Empty("jobs"));
        }
        if let Some(row) = times.iter().find(|row| row.len() != jobs) {
            return Err(InstanceError::LengthMismatch {
                what: "machine row",
                expected: jobs,
                found: row.len(),
            });
        }
        Ok(Self {
            machines,
            jobs,
            times: times.concat(),
        })
    }

    /// Three machines, five jobs.
    pub fn demo() -> Self {
        let rows: [[u64; 5]; 3] = [[3, 2, 2, 1, 4], [1, 4, 3, 2, 1], [2, 3, 1, 4, 3]];
        Self {
            machines: 3,
            jobs: 5,
            times: rows.iter().flatten().copied().collect(),
        }
    }

    pub fn machines(&self) -> usize {
        self.machines
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    pub fn time(&self, machine: usize, job: usize) -> u64 {
        self.times[machine * self.jobs + job]
    }

    /// Total processing time on each machine, saturating at `u64::MAX`.
    pub fn loads(&self, assignment: &[usize]) -> Vec<u64> {
        let mut loads = vec![0u64; self.machines];
        for (job, &machine) in assignment.iter().enumerate() {
            loads[machine] = loads[machine].saturating_add(self.time(machine, job));
        }
        loads
    }
}

impl SaProblem for UnrelatedMachines {
    type Solution = Vec<usize>;
    type Cost = u64;

    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        (0..self.jobs)
            .map(|_| rng.random_range(0..self.machines))
            .collect()
    }

    fn cost(&self, assignment: &Vec<usize>) -> u64 {
        self.loads(assignment).into_iter().max().unwrap_or(0)
    }

    /// Moves one job to a different machine. With a single machine the
    /// assignment is returned unchanged.
    fn neighbor<R: Rng>(&self, assignment: &Vec<usize>, rng: &mut R) -> Vec<usize> {
        let mut new = assignment.clone();
        if self.machines < 2 {
            return new;
        }
        let job = rng.random_range(0..self.jobs);
        let mut target = rng.random_range(0..self.machines - 1);
        if target >= new[job] {
            target += 1;
        }
        new[job] = target;
        new
    }

    fn check(&self, assignment: &Vec<usize>) -> Result<(), String> {
        if assignment.len() != self.jobs {
            return Err(format!(
                "expected {} assignments, found {}",
                self.jobs,
                assignment.len()
            ));
        }
        match assignment.iter().position(|&m| m >= self.machines) {
            Some(job) => Err(format!(
                "job {job} assigned to machine {}, only {} exist",
                assignment[job], self.machines
            )),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sa::{SaConfig, SaRunner};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn brute_force(problem: &UnrelatedMachines) -> u64 {
        let m = problem.machines();
        let n = problem.jobs();
        let total = m.pow(n as u32);
        (0..total)
            .map(|mut code| {
                let assignment: Vec<usize> = (0..n)
                    .map(|_| {
                        let machine = code % m;
                        code /= m;
                        machine
                    })
                    .collect();
                problem.cost(&assignment)
            })
            .min()
            .unwrap()
    }

    #[test]
    fn test_loads_and_makespan() {
        let problem = UnrelatedMachines::demo();
        let assignment = vec![1, 0, 2, 0, 1];
        assert_eq!(problem.loads(&assignment), vec![3, 2, 1]);
        assert_eq!(problem.cost(&assignment), 3);
    }

    #[test]
    fn test_reaches_brute_force_optimum() {
        let problem = UnrelatedMachines::demo();
        let optimum = brute_force(&problem);
        let config = SaConfig::default()
            .with_iterations_per_temperature(10)
            .with_check_solutions(true)
            .with_seed(11);

        let result = SaRunner::run(&problem, &config).unwrap();

        assert_eq!(result.best_cost, optimum);
    }

    #[test]
    fn test_huge_loads_saturate() {
        let big = u64::MAX / 2;
        let problem = UnrelatedMachines::new(&[vec![big, big, big], vec![1, 1, 1]]).unwrap();
        assert_eq!(problem.loads(&[0, 0, 0]), vec![u64::MAX, 0]);
        assert_eq!(problem.cost(&vec![0, 0, 1]), big * 2);
    }

    #[test]
    fn test_single_machine_neighbor_is_identity() {
        let problem = UnrelatedMachines::new(&[vec![1, 2, 3]]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(problem.neighbor(&vec![0, 0, 0], &mut rng), vec![0, 0, 0]);
    }

    #[test]
    fn test_check_rejects_bad_assignment() {
        let problem = UnrelatedMachines::demo();
        assert!(problem.check(&vec![0, 1, 2]).is_err());
        assert!(problem.check(&vec![0, 1, 2, 3, 0]).is_err());
        assert!(problem.check(&vec![0, 1, 2, 2, 0]).is_ok());
    }

    #[test]
    fn test_instance_errors() {
        assert_eq!(
            UnrelatedMachines::new(&[]).unwrap_err(),
            InstanceError::Empty("machines")
        );
        assert_eq!(
            UnrelatedMachines::new(&[vec![1, 2], vec![1]]).unwrap_err(),
            InstanceError::LengthMismatch {
                what: "machine row",
                expected: 2,
                found: 1
            }
        );
    }

    proptest! {
        #[test]
        fn prop_neighbor_moves_exactly_one_job(seed in any::<u64>()) {
            let problem = UnrelatedMachines::demo();
            let mut rng = StdRng::seed_from_u64(seed);
            let current = problem.initial_solution(&mut rng);
            let next = problem.neighbor(&current, &mut rng);

            prop_assert!(problem.check(&next).is_ok());
            let changed = current.iter().zip(&next).filter(|(a, b)| a != b).count();
            prop_assert_eq!(changed, 1);
        }
    }
}
