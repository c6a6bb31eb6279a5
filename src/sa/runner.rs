//! SA execution loop.
//!
//! # Algorithm
//!
//! 1. Build the initial solution, evaluate it, make it the best so far
//! 2. While the temperature is above the minimum and the iteration budget
//!    is not exhausted:
//!    a. Generate a neighbor of the current solution and evaluate it
//!    b. Accept it unconditionally if strictly better, otherwise with
//!       probability `exp(-delta / T)`
//!    c. On acceptance, replace the current solution and update the best
//!       if strictly better
//!    d. Cool after every `iterations_per_temperature` iterations
//! 3. Return the best solution

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use super::acceptance::{decide, Decision};
use super::config::{CoolingSchedule, SaConfig};
use super::error::SaError;
use super::types::{Cost, SaProblem};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The temperature dropped to `min_temperature`.
    MinTemperature,
    /// `max_iterations` neighbor evaluations were made.
    MaxIterations,
    /// The cancellation flag was raised.
    Cancelled,
}

/// Result of a Simulated Annealing run.
#[derive(Debug, Clone)]
pub struct SaResult<S: Clone, C: Cost> {
    /// The best solution found.
    pub best: S,

    /// Cost of the best solution.
    pub best_cost: C,

    /// Total number of iterations (neighbor evaluations).
    pub iterations: usize,

    /// Temperature when the algorithm stopped.
    pub final_temperature: f64,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of strictly improving moves.
    pub improving_moves: usize,

    /// Why the run stopped.
    pub termination: Termination,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Best cost sampled every `history_interval` iterations.
    pub cost_history: Vec<f64>,
}

/// Snapshot handed to the observer of [`SaRunner::run_observed`] after
/// every iteration.
#[derive(Debug, Clone, Copy)]
pub struct SaStep<C: Cost> {
    /// Number of iterations completed, including this one.
    pub iteration: usize,
    /// Temperature the acceptance test ran at.
    pub temperature: f64,
    /// Cost of the candidate that was evaluated.
    pub candidate_cost: C,
    /// Cost of the current solution after the acceptance test.
    pub current_cost: C,
    /// Best cost seen so far.
    pub best_cost: C,
    /// Outcome of the acceptance test.
    pub decision: Decision,
}

/// Executes the Simulated Annealing algorithm.
pub struct SaRunner;

impl SaRunner {
    /// Runs SA optimization with a generator seeded from `config.seed`.
    pub fn run<P: SaProblem>(
        problem: &P,
        config: &SaConfig,
    ) -> Result<SaResult<P::Solution, P::Cost>, SaError> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs SA with an optional cancellation token.
    ///
    /// The token is polled at every iteration boundary.
    pub fn run_with_cancel<P: SaProblem>(
        problem: &P,
        config: &SaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SaResult<P::Solution, P::Cost>, SaError> {
        config.validate()?;
        let mut rng = create_rng(config.seed);
        anneal(problem, config, &mut rng, cancel.as_deref(), |_| {})
    }

    /// Runs SA drawing from a caller-provided generator.
    ///
    /// `config.seed` is ignored.
    pub fn run_with_rng<P: SaProblem, R: Rng>(
        problem: &P,
        config: &SaConfig,
        rng: &mut R,
    ) -> Result<SaResult<P::Solution, P::Cost>, SaError> {
        config.validate()?;
        anneal(problem, config, rng, None, |_| {})
    }

    /// Runs SA and reports every iteration to `observer`.
    pub fn run_observed<P, R, F>(
        problem: &P,
        config: &SaConfig,
        rng: &mut R,
        cancel: Option<&AtomicBool>,
        observer: F,
    ) -> Result<SaResult<P::Solution, P::Cost>, SaError>
    where
        P: SaProblem,
        R: Rng,
        F: FnMut(&SaStep<P::Cost>),
    {
        config.validate()?;
        anneal(problem, config, rng, cancel, observer)
    }
}

/// Creates the generator for a run: seeded when `seed` is set, from OS
/// entropy otherwise.
pub(crate) fn create_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn anneal<P, R, F>(
    problem: &P,
    config: &SaConfig,
    rng: &mut R,
    cancel: Option<&AtomicBool>,
    mut observer: F,
) -> Result<SaResult<P::Solution, P::Cost>, SaError>
where
    P: SaProblem,
    R: Rng,
    F: FnMut(&SaStep<P::Cost>),
{
    // Initialize
    let mut current = problem.initial_solution(rng);
    if config.check_solutions {
        problem
            .check(&current)
            .map_err(|reason| SaError::ContractViolation {
                stage: "initial",
                reason,
            })?;
    }
    let mut current_cost = problem.cost(&current);
    let mut best = current.clone();
    let mut best_cost = current_cost;

    debug!(
        initial_temperature = config.initial_temperature,
        min_temperature = ?config.min_temperature,
        max_iterations = ?config.max_iterations,
        cooling = ?config.cooling,
        draw_policy = ?config.draw_policy,
        initial_cost = ?current_cost,
        "starting annealing run"
    );

    let mut temperature = config.initial_temperature;
    let mut iterations = 0usize;
    let mut accepted_moves = 0usize;
    let mut improving_moves = 0usize;

    // For linear cooling: compute step count
    let linear_max_steps = compute_linear_steps(config);

    let history_interval = config.history_interval.max(1);
    let mut cost_history = vec![best_cost.to_f64()];

    let mut step = 0usize; // temperature step counter
    let mut plateau = 0usize; // iterations at the current temperature

    let termination = loop {
        if let Some(min) = config.min_temperature {
            if temperature <= min {
                break Termination::MinTemperature;
            }
        }
        if let Some(max) = config.max_iterations {
            if iterations >= max {
                break Termination::MaxIterations;
            }
        }
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            break Termination::Cancelled;
        }

        let candidate = problem.neighbor(&current, rng);
        if config.check_solutions {
            problem
                .check(&candidate)
                .map_err(|reason| SaError::ContractViolation {
                    stage: "neighbor",
                    reason,
                })?;
        }
        let candidate_cost = problem.cost(&candidate);

        let decision = decide(
            current_cost,
            candidate_cost,
            temperature,
            config.draw_policy,
            rng,
        );
        if decision == Decision::Improving {
            improving_moves += 1;
        }
        if decision.is_accepted() {
            current = candidate;
            current_cost = candidate_cost;
            accepted_moves += 1;

            if current_cost < best_cost {
                best = current.clone();
                best_cost = current_cost;
                trace!(iteration = iterations, temperature, best_cost = ?best_cost, "new best");
            }
        }

        iterations += 1;
        observer(&SaStep {
            iteration: iterations,
            temperature,
            candidate_cost,
            current_cost,
            best_cost,
            decision,
        });

        // Record history
        if iterations % history_interval == 0 {
            cost_history.push(best_cost.to_f64());
        }

        // Cool down
        plateau += 1;
        if plateau == config.iterations_per_temperature {
            plateau = 0;
            temperature = cool(temperature, config, step, linear_max_steps);
            step += 1;
        }
    };

    // Final history entry
    if cost_history
        .last()
        .is_none_or(|&last| (last - best_cost.to_f64()).abs() > 1e-15)
    {
        cost_history.push(best_cost.to_f64());
    }

    debug!(
        iterations,
        accepted_moves,
        improving_moves,
        final_temperature = temperature,
        best_cost = ?best_cost,
        ?termination,
        "annealing run finished"
    );

    Ok(SaResult {
        best,
        best_cost,
        iterations,
        final_temperature: temperature,
        accepted_moves,
        improving_moves,
        termination,
        cancelled: termination == Termination::Cancelled,
        cost_history,
    })
}

/// Apply the cooling schedule to compute the next temperature.
///
/// The result never drops below `f64::MIN_POSITIVE`, so a run without a
/// minimum temperature keeps a strictly positive temperature after the
/// schedule underflows.
fn cool(temperature: f64, config: &SaConfig, step: usize, linear_max_steps: usize) -> f64 {
    let next = match config.cooling {
        CoolingSchedule::Geometric { alpha } => temperature * alpha,

        CoolingSchedule::Linear => {
            // validate() guarantees a minimum temperature for linear cooling
            let min = config.min_temperature.unwrap_or(0.0);
            if linear_max_steps == 0 {
                min
            } else {
                let t = config.initial_temperature
                    - (step + 1) as f64 * (config.initial_temperature - min)
                        / linear_max_steps as f64;
                t.max(min)
            }
        }

        CoolingSchedule::LundyMees { beta } => temperature / (1.0 + beta * temperature),
    };
    next.max(f64::MIN_POSITIVE)
}

/// Estimate the number of temperature steps for linear cooling.
fn compute_linear_steps(config: &SaConfig) -> usize {
    match (config.cooling, config.max_iterations) {
        (CoolingSchedule::Linear, Some(max)) => max / config.iterations_per_temperature,
        (CoolingSchedule::Linear, None) => 1000,
        _ => 0,
    }
}
