//! Flexible job shop: every operation may run on one of several machines,
//! each with its own duration.
//!
//! A solution pairs a job repetition sequence, read as in
//! [`JobShop`](super::JobShop), with the chosen alternative of every
//! operation. Decoding fixes the routes from those choices and builds the
//! same semi-active schedule.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use super::job_shop::{check_repetition, repetition, semi_active, swap_different_jobs};
use super::{InstanceError, JobShopSchedule, Operation};
use crate::sa::SaProblem;

/// Operation order plus machine choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlexibleSolution {
    /// Job repetition sequence.
    pub sequence: Vec<usize>,
    /// `choices[j][k]` indexes the alternatives of job `j`'s k-th operation.
    pub choices: Vec<Vec<usize>>,
}

/// Flexible job shop minimizing makespan.
#[derive(Debug, Clone)]
pub struct FlexibleJobShop {
    machines: usize,
    /// `routes[j][k]` lists the alternatives of job `j`'s k-th operation.
    routes: Vec<Vec<Vec<Operation>>>,
    /// Operations with more than one alternative, as `(job, operation)`.
    flexible: Vec<(usize, usize)>,
}

impl FlexibleJobShop {
    pub fn new(machines: usize, routes: Vec<Vec<Vec<Operation>>>) -> Result<Self, InstanceError> {
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
            for (operation, alternatives) in route.iter().enumerate() {
                if alternatives.is_empty() {
                    return Err(InstanceError::Empty("alternatives"));
                }
                if let Some(op) = alternatives.iter().find(|op| op.machine >= machines) {
                    return Err(InstanceError::UnknownMachine {
                        job,
                        operation,
                        machine: op.machine,
                        machines,
                    });
                }
            }
        }
        Ok(Self::from_parts(machines, routes))
    }

    fn from_parts(machines: usize, routes: Vec<Vec<Vec<Operation>>>) -> Self {
        let flexible = routes
            .iter()
            .enumerate()
            .flat_map(|(j, route)| {
                route
                    .iter()
                    .enumerate()
                    .filter(|(_, alternatives)| alternatives.len() > 1)
                    .map(move |(k, _)| (j, k))
            })
            .collect();
        Self {
            machines,
            routes,
            flexible,
        }
    }

    /// Five jobs on three machines; every operation may use any machine.
    pub fn demo() -> Self {
        let times: [&[[u64; 3]]; 5] = [
            &[[2, 3, 4], [3, 2, 1], [4, 3, 2]],
            &[[1, 2, 3], [2, 1, 2]],
            &[[3, 4, 5], [2, 3, 4], [4, 5, 6]],
            &[[2, 1, 3], [3, 2, 1]],
            &[[1, 2, 1], [2, 1, 2]],
        ];
        let routes = times
            .iter()
            .map(|job| {
                job.iter()
                    .map(|row| {
                        row.iter()
                            .enumerate()
                            .map(|(m, &d)| Operation::new(m, d))
                            .collect()
                    })
                    .collect()
            })
            .collect();
        Self::from_parts(3, routes)
    }

    pub fn machines(&self) -> usize {
        self.machines
    }

    pub fn routes(&self) -> &[Vec<Vec<Operation>>] {
        &self.routes
    }

    /// The operation picked by `choices` for every step of every job.
    pub fn resolve(&self, choices: &[Vec<usize>]) -> Vec<Vec<Operation>> {
        self.routes
            .iter()
            .zip(choices)
            .map(|(route, picks)| {
                route
                    .iter()
                    .zip(picks)
                    .map(|(alternatives, &c)| alternatives[c])
                    .collect()
            })
            .collect()
    }

    /// Semi-active schedule for `solution`.
    pub fn decode(&self, solution: &FlexibleSolution) -> JobShopSchedule {
        let routes = self.resolve(&solution.choices);
        semi_active(self.machines, &routes, &solution.sequence, |_, _| 0, |_, _| 0)
    }
}

impl SaProblem for FlexibleJobShop {
    type Solution = FlexibleSolution;
    type Cost = u64;

    fn initial_solution<R: Rng>(&self, rng: &mut R) -> FlexibleSolution {
        let mut sequence = repetition(&self.routes);
        sequence.shuffle(rng);
        let choices = self
            .routes
            .iter()
            .map(|route| route.iter().map(|alts| rng.random_range(0..alts.len())).collect())
            .collect();
        FlexibleSolution { sequence, choices }
    }

    fn cost(&self, solution: &FlexibleSolution) -> u64 {
        self.decode(solution).makespan
    }

    /// Either moves one operation to another of its machines or swaps two
    /// sequence entries of different jobs, with equal odds when both apply.
    fn neighbor<R: Rng>(&self, solution: &FlexibleSolution, rng: &mut R) -> FlexibleSolution {
        let mut new = solution.clone();
        let can_swap = self.routes.len() > 1;
        let reassign = !self.flexible.is_empty() && (!can_swap || rng.random_bool(0.5));
        if reassign {
            if let Some(&(j, k)) = self.flexible.choose(rng) {
                let count = self.routes[j][k].len();
                let mut pick = rng.random_range(0..count - 1);
                if pick >= new.choices[j][k] {
                    pick += 1;
                }
                new.choices[j][k] = pick;
            }
        } else if can_swap {
            new.sequence = swap_different_jobs(&solution.sequence, rng);
        }
        new
    }

    fn check(&self, solution: &FlexibleSolution) -> Result<(), String> {
        let lengths: Vec<usize> = self.routes.iter().map(Vec::len).collect();
        check_repetition(&solution.sequence, &lengths)?;
        if solution.choices.len() != self.routes.len() {
            return Err(format!(
                "expected choices for {} jobs, found {}",
                self.routes.len(),
                solution.choices.len()
            ));
        }
        for (j, (route, picks)) in self.routes.iter().zip(&solution.choices).enumerate() {
            if picks.len() != route.len() {
                return Err(format!(
                    "job {j} has {} operations, found {} choices",
                    route.len(),
                    picks.len()
                ));
            }
            for (k, (alternatives, &c)) in route.iter().zip(picks).enumerate() {
                if c >= alternatives.len() {
                    return Err(format!(
                        "job {j} operation {k} picks alternative {c} of {}",
                        alternatives.len()
                    ));
                }
            }
        }
        Ok(())
    }
}
