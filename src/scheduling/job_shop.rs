//! Job shop scheduling with an operation-based encoding.
//!
//! A solution lists job indices, each job appearing once per operation.
//! The k-th appearance of job `j` stands for its k-th operation. Decoding
//! walks the list and starts every operation as early as its job and its
//! machine allow (semi-active schedule), so every sequence is feasible.
//!
//! Two optional extensions change what "as early as allowed" means:
//! sequence-dependent setup times between consecutive operations on a
//! machine, and minimum time lags between consecutive operations of a job.
//! Times saturate at `u64::MAX`.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use super::InstanceError;
use crate::sa::SaProblem;

/// One step of a job's route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub machine: usize,
    pub duration: u64,
}

impl Operation {
    pub fn new(machine: usize, duration: u64) -> Self {
        Self { machine, duration }
    }
}

/// Start times produced by decoding a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobShopSchedule {
    /// `starts[j][k]` is the start of job `j`'s k-th operation.
    pub starts: Vec<Vec<u64>>,
    pub makespan: u64,
}

/// Job shop minimizing makespan.
#[derive(Debug, Clone)]
pub struct JobShop {
    machines: usize,
    routes: Vec<Vec<Operation>>,
    /// Row-major `jobs × jobs`. Entry `[a][b]` is the changeover a machine
    /// needs when an operation of job `b` follows one of job `a`.
    setups: Option<Vec<u64>>,
    /// `lags[j][k]` is the least wait between the end of operation `k`
    /// and the start of operation `k + 1` of job `j`.
    lags: Option<Vec<Vec<u64>>>,
}

impl JobShop {
    /// Builds an instance from each job's ordered route.
    pub fn new(machines: usize, routes: Vec<Vec<Operation>>) -> Result<Self, InstanceError> {
        if machines == 0 {
            return Err(InstanceError::Empty("machines"));
        }
        if routes.is_empty() {
            return Err(InstanceError::Empty("jobs"));
        }
        for (job, route) in routes.iter().enumerate() {
            if route.is_empty() {
                return Err(InstanceError::Empty("operations"));
            }
            let unknown = route
                .iter()
                .enumerate()
                .find(|(_, op)| op.machine >= machines);
            if let Some((operation, op)) = unknown {
                return Err(InstanceError::UnknownMachine {
                    job,
                    operation,
                    machine: op.machine,
                    machines,
                });
            }
        }
        Ok(Self {
            machines,
            routes,
            setups: None,
            lags: None,
        })
    }

    /// Adds sequence-dependent setups. `setups[a][b]` is the time a machine
    /// needs between an operation of job `a` and a following one of job `b`.
    /// The first operation on a machine needs no setup.
    pub fn with_setup_times(mut self, setups: &[Vec<u64>]) -> Result<Self, InstanceError> {
        let jobs = self.routes.len();
        if setups.len() != jobs {
            return Err(InstanceError::LengthMismatch {
                what: "setup rows",
                expected: jobs,
                found: setups.len(),
            });
        }
        if let Some(row) = setups.iter().find(|row| row.len() != jobs) {
            return Err(InstanceError::LengthMismatch {
                what: "setup row",
                expected: jobs,
                found: row.len(),
            });
        }
        self.setups = Some(setups.concat());
        Ok(self)
    }

    /// Adds minimum time lags. `lags[j]` has one entry per pair of
    /// consecutive operations of job `j`.
    pub fn with_time_lags(mut self, lags: Vec<Vec<u64>>) -> Result<Self, InstanceError> {
        if lags.len() != self.routes.len() {
            return Err(InstanceError::LengthMismatch {
                what: "time lag rows",
                expected: self.routes.len(),
                found: lags.len(),
            });
        }
        for (row, route) in lags.iter().zip(&self.routes) {
            if row.len() != route.len() - 1 {
                return Err(InstanceError::LengthMismatch {
                    what: "time lag row",
                    expected: route.len() - 1,
                    found: row.len(),
                });
            }
        }
        self.lags = Some(lags);
        Ok(self)
    }

    /// Three jobs on three machines.
    pub fn demo() -> Self {
        let op = Operation::new;
        let routes = vec![
            vec![op(0, 2), op(1, 1)],
            vec![op(1, 2), op(0, 3)],
            vec![op(0, 1), op(2, 2)],
        ];
        Self {
            machines: 3,
            routes,
            setups: None,
            lags: None,
        }
    }

    /// Five jobs on five machines with job-to-job changeovers. Job `j`
    /// visits machines `j, j + 1, ...` cyclically.
    pub fn setup_demo() -> Self {
        let processing: [[u64; 5]; 5] = [
            [5, 7, 3, 6, 4],
            [6, 4, 7, 3, 5],
            [4, 5, 6, 3, 7],
            [3, 6, 5, 4, 7],
            [5, 4, 3, 6, 7],
        ];
        let setups: [[u64; 5]; 5] = [
            [0, 3, 2, 4, 3],
            [3, 0, 1, 2, 4],
            [2, 1, 0, 3, 2],
            [4, 2, 3, 0, 1],
            [3, 4, 2, 1, 0],
        ];
        let routes = (0..5)
            .map(|j| {
                (0..5)
                    .map(|k| {
                        let m = (j + k) % 5;
                        Operation::new(m, processing[j][m])
                    })
                    .collect()
            })
            .collect();
        Self {
            machines: 5,
            routes,
            setups: Some(setups.iter().flatten().copied().collect()),
            lags: None,
        }
    }

    /// Four jobs of three operations on three machines with waiting times
    /// between consecutive operations.
    pub fn time_lag_demo() -> Self {
        let durations: [[u64; 3]; 4] = [[3, 5, 2], [4, 2, 6], [2, 7, 3], [5, 3, 4]];
        let lags = vec![vec![1, 2], vec![0, 3], vec![2, 1], vec![1, 0]];
        let routes = durations
            .iter()
            .enumerate()
            .map(|(j, row)| {
                row.iter()
                    .enumerate()
                    .map(|(k, &d)| Operation::new((j + k) % 3, d))
                    .collect()
            })
            .collect();
        Self {
            machines: 3,
            routes,
            setups: None,
            lags: Some(lags),
        }
    }

    pub fn machines(&self) -> usize {
        self.machines
    }

    pub fn routes(&self) -> &[Vec<Operation>] {
        &self.routes
    }

    fn setup(&self, previous: usize, next: usize) -> u64 {
        self.setups
            .as_ref()
            .map_or(0, |s| s[previous * self.routes.len() + next])
    }

    fn lag(&self, job: usize, operation: usize) -> u64 {
        self.lags.as_ref().map_or(0, |l| l[job][operation])
    }

    /// Semi-active schedule for `sequence`.
    pub fn decode(&self, sequence: &[usize]) -> JobShopSchedule {
        semi_active(
            self.machines,
            &self.routes,
            sequence,
            |a, b| self.setup(a, b),
            |j, k| self.lag(j, k),
        )
    }
}

/// Every job index repeated once per operation, in job order.
pub(super) fn repetition<T>(routes: &[Vec<T>]) -> Vec<usize> {
    routes
        .iter()
        .enumerate()
        .flat_map(|(job, route)| std::iter::repeat(job).take(route.len()))
        .collect()
}

/// Decodes a job repetition sequence over fixed routes.
pub(super) fn semi_active(
    machines: usize,
    routes: &[Vec<Operation>],
    sequence: &[usize],
    setup: impl Fn(usize, usize) -> u64,
    lag: impl Fn(usize, usize) -> u64,
) -> JobShopSchedule {
    let mut next_op = vec![0usize; routes.len()];
    let mut job_ready = vec![0u64; routes.len()];
    let mut machine_ready = vec![0u64; machines];
    let mut machine_last: Vec<Option<usize>> = vec![None; machines];
    let mut starts: Vec<Vec<u64>> = routes.iter().map(|r| vec![0; r.len()]).collect();
    let mut makespan = 0;

    for &job in sequence {
        let k = next_op[job];
        let op = routes[job][k];
        let changeover = machine_last[op.machine].map_or(0, |prev| setup(prev, job));
        let start = job_ready[job].max(machine_ready[op.machine].saturating_add(changeover));
        let end = start.saturating_add(op.duration);
        starts[job][k] = start;
        job_ready[job] = if k + 1 < routes[job].len() {
            end.saturating_add(lag(job, k))
        } else {
            end
        };
        machine_ready[op.machine] = end;
        machine_last[op.machine] = Some(job);
        next_op[job] += 1;
        makespan = makespan.max(end);
    }

    JobShopSchedule { starts, makespan }
}

/// Swaps two entries belonging to different jobs. A sequence holding a
/// single job comes back unchanged.
pub(super) fn swap_different_jobs<R: Rng>(sequence: &[usize], rng: &mut R) -> Vec<usize> {
    let mut new = sequence.to_vec();
    if new.is_empty() {
        return new;
    }
    let i = rng.random_range(0..new.len());
    let others: Vec<usize> = (0..new.len()).filter(|&j| new[j] != new[i]).collect();
    if let Some(&j) = others.choose(rng) {
        new.swap(i, j);
    }
    new
}

/// Checks that job `j` appears exactly `lengths[j]` times.
pub(super) fn check_repetition(sequence: &[usize], lengths: &[usize]) -> Result<(), String> {
    let operations: usize = lengths.iter().sum();
    if sequence.len() != operations {
        return Err(format!(
            "expected {operations} entries, found {}",
            sequence.len()
        ));
    }
    let mut counts = vec![0usize; lengths.len()];
    for &job in sequence {
        match counts.get_mut(job) {
            Some(c) => *c += 1,
            None => return Err(format!("job {job} does not exist")),
        }
    }
    for (job, (&count, &len)) in counts.iter().zip(lengths).enumerate() {
        if count != len {
            return Err(format!("job {job} appears {count} times, has {len} operations"));
        }
    }
    Ok(())
}

impl SaProblem for JobShop {
    type Solution = Vec<usize>;
    type Cost = u64;

    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let mut sequence = repetition(&self.routes);
        sequence.shuffle(rng);
        sequence
    }

    fn cost(&self, sequence: &Vec<usize>) -> u64 {
        self.decode(sequence).makespan
    }

    fn neighbor<R: Rng>(&self, sequence: &Vec<usize>, rng: &mut R) -> Vec<usize> {
        swap_different_jobs(sequence, rng)
    }

    fn check(&self, sequence: &Vec<usize>) -> Result<(), String> {
        let lengths: Vec<usize> = self.routes.iter().map(Vec::len).collect();
        check_repetition(sequence, &lengths)
    }
}
