//! Reusable simulated annealing engine.
//!
//! - **Engine** ([`sa`]): Metropolis acceptance, pluggable cooling
//!   schedules, plateau cooling, cancellation, progress observation and
//!   reproducible seeding over any problem implementing
//!   [`sa::SaProblem`].
//! - **Multi-start** ([`sa::MultiStart`]): independent restarts from
//!   derived seeds, run in parallel with the `parallel` feature.
//! - **Scheduling** ([`scheduling`]): classic scheduling variants
//!   (single machine tardiness, flow shop, job shop, open shop, unrelated
//!   parallel machines, RCPSP) expressed as problems for the engine.
//!
//! # Architecture
//!
//! The engine knows nothing about the problems it optimizes. A problem
//! supplies an initial solution, a cost and a neighbor operator; the
//! engine owns the state, the temperature and the random stream.
//!
//! ```
//! use u_anneal::sa::{SaConfig, SaRunner};
//! use u_anneal::scheduling::FlowShop;
//!
//! let problem = FlowShop::demo();
//! let config = SaConfig::default().with_seed(7);
//! let result = SaRunner::run(&problem, &config).unwrap();
//! assert!(result.best_cost > 0);
//! ```

pub mod sa;
pub mod scheduling;
