//! Open shop scheduling.
//!
//! Each job needs one operation on every machine, in any order. A solution
//! is a permutation of operation ids `job * machines + machine`; decoding
//! appends each operation at the earliest time both its job and its
//! machine are free. Times saturate at `u64::MAX`.

use rand::Rng;

use super::permutation::{check_permutation, random_permutation, swap_neighbor};
use super::InstanceError;
use crate::sa::SaProblem;

/// Open shop minimizing makespan.
#[derive(Debug, Clone)]
pub struct OpenShop {
    jobs: usize,
    machines: usize,
    /// Row-major `jobs × machines`.
    processing: Vec<u64>,
}

impl OpenShop {
    /// `processing[j][m]` is the time job `j` needs on machine `m`.
    pub fn new(processing: &[Vec<u64>]) -> Result<Self, InstanceError> {
        let jobs = processing.len();
        if jobs == 0 {
            return Err(InstanceError::Empty("jobs"));
        }
        let machines = processing[0].len();
        if machines == 0 {
            return Err(InstanceError::Empty("machines"));
        }
        if let Some(row) = processing.iter().find(|row| row.len() != machines) {
            return Err(InstanceError::LengthMismatch {
                what: "processing row",
                expected: machines,
                found: row.len(),
            });
        }
        Ok(Self {
            jobs,
            machines,
            processing: processing.concat(),
        })
    }

    /// Five jobs on three machines.
    pub fn demo() -> Self {
        let rows: [[u64; 3]; 5] = [[3, 2, 5], [1, 4, 2], [4, 3, 6], [2, 5, 1], [5, 2, 3]];
        Self {
            jobs: 5,
            machines: 3,
            processing: rows.iter().flatten().copied().collect(),
        }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    pub fn machines(&self) -> usize {
        self.machines
    }

    /// Largest job length or machine load; no schedule is shorter.
    pub fn lower_bound(&self) -> u64 {
        let job_max = self
            .processing
            .chunks(self.machines)
            .map(|row| row.iter().fold(0u64, |acc, &p| acc.saturating_add(p)))
            .max()
            .unwrap_or(0);
        let machine_max = (0..self.machines)
            .map(|m| {
                (0..self.jobs)
                    .map(|j| self.processing[j * self.machines + m])
                    .fold(0u64, u64::saturating_add)
            })
            .max()
            .unwrap_or(0);
        job_max.max(machine_max)
    }

    /// Start time of every operation, indexed by operation id.
    pub fn start_times(&self, order: &[usize]) -> Vec<u64> {
        let mut starts = vec![0u64; self.processing.len()];
        self.decode(order, |op, start| starts[op] = start);
        starts
    }

    fn decode(&self, order: &[usize], mut place: impl FnMut(usize, u64)) -> u64 {
        let mut job_ready = vec![0u64; self.jobs];
        let mut machine_ready = vec![0u64; self.machines];
        let mut makespan = 0;
        for &op in order {
            let (job, machine) = (op / self.machines, op % self.machines);
            let start = job_ready[job].max(machine_ready[machine]);
            let end = start.saturating_add(self.processing[op]);
            place(op, start);
            job_ready[job] = end;
            machine_ready[machine] = end;
            makespan = makespan.max(end);
        }
        makespan
    }
}

impl SaProblem for OpenShop {
    type Solution = Vec<usize>;
    type Cost = u64;

    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        random_permutation(self.processing.len(), rng)
    }

    fn cost(&self, order: &Vec<usize>) -> u64 {
        self.decode(order, |_, _| {})
    }

    fn neighbor<R: Rng>(&self, order: &Vec<usize>, rng: &mut R) -> Vec<usize> {
        swap_neighbor(order, rng)
    }

    fn check(&self, order: &Vec<usize>) -> Result<(), String> {
        check_permutation(order, self.processing.len())
    }
}
