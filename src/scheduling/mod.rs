//! Scheduling problems for the annealing engine.
//!
//! Each type implements [`SaProblem`](crate::sa::SaProblem) for one
//! scheduling variant and owns its instance data. Constructors validate
//! the data and return [`InstanceError`] on malformed input; `demo()`
//! builds a small fixed instance.
//!
//! | Type | Solution | Objective |
//! |------|----------|-----------|
//! | [`AdjacentSquaredGap`] | permutation | sum of squared adjacent gaps |
//! | [`SingleMachineTardiness`] | job permutation | (weighted) total tardiness, optional setups |
//! | [`FlowShop`] | job permutation | makespan |
//! | [`UnrelatedMachines`] | machine per job | makespan |
//! | [`JobShop`] | job repetition sequence | makespan, optional setups and time lags |
//! | [`FlexibleJobShop`] | sequence plus machine choices | makespan |
//! | [`OpenShop`] | operation permutation | makespan |
//! | [`ProjectSchedule`] | precedence-feasible activity list | makespan |
//!
//! Every neighbor operator returns a fresh solution and keeps the
//! solution's structural invariant.

mod flexible_job_shop;
mod flow_shop;
mod job_shop;
mod open_shop;
mod parallel_machine;
pub mod permutation;
mod rcpsp;
mod sequencing;
mod tardiness;

pub use flexible_job_shop::{FlexibleJobShop, FlexibleSolution};
pub use flow_shop::FlowShop;
pub use job_shop::{JobShop, JobShopSchedule, Operation};
pub use open_shop::OpenShop;
pub use parallel_machine::UnrelatedMachines;
pub use rcpsp::{Activity, ProjectSchedule};
pub use sequencing::AdjacentSquaredGap;
pub use tardiness::{SingleMachineTardiness, TardinessJob};

use thiserror::Error;

/// Malformed scheduling instance data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    #[error("instance has no {0}")]
    Empty(&'static str),

    #[error("{what}: expected {expected} entries, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("job {job} operation {operation} uses machine {machine}, but there are {machines} machines")]
    UnknownMachine {
        job: usize,
        operation: usize,
        machine: usize,
        machines: usize,
    },

    #[error("activity {activity} lists unknown successor {successor}")]
    UnknownSuccessor { activity: usize, successor: usize },

    #[error("activity {activity} demands {demand} of resource {resource}, capacity is {capacity}")]
    DemandExceedsCapacity {
        activity: usize,
        resource: usize,
        demand: u32,
        capacity: u32,
    },

    #[error("precedence relation contains a cycle")]
    PrecedenceCycle,

    #[error("total duration exceeds the representable time range")]
    DurationOverflow,
}
