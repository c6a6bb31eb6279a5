//! Simulated Annealing (SA).
//!
//! A single-solution trajectory metaheuristic inspired by the physical
//! annealing process. Accepts worsening moves with a probability that
//! decreases over time (temperature), allowing the search to escape
//! local optima.
//!
//! The engine is generic over [`SaProblem`]: a problem supplies the
//! solution type, its cost, an initial solution and a neighbor operator.
//! Everything else (the Metropolis test, cooling, best tracking and
//! termination) lives here.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Cerny (1985), "Thermodynamical Approach to the Travelling Salesman Problem"
//! - Metropolis et al. (1953), "Equation of State Calculations by Fast Computing Machines"
//! - Lundy & Mees (1986), "Convergence of an Annealing Algorithm"

mod acceptance;
mod config;
mod error;
mod multistart;
mod runner;
mod types;

pub use acceptance::{decide, metropolis, Decision, DrawPolicy};
pub use config::{CoolingSchedule, SaConfig};
pub use error::{ConfigError, SaError};
pub use multistart::{derive_seed, MultiStart, MultiStartResult, RunSummary};
pub use runner::{SaResult, SaRunner, SaStep, Termination};
pub use types::{Cost, SaProblem};
