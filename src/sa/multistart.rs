//! Independent multi-start annealing.
//!
//! Each run owns its solution, its bookkeeping and its random generator.
//! Runs share nothing mutable, so they may execute concurrently; the
//! result is the run with the globally lowest best cost.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use super::config::SaConfig;
use super::error::{ConfigError, SaError};
use super::runner::{create_rng, SaResult, SaRunner};
use super::types::SaProblem;

/// Summary of one run inside a multi-start batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary<C> {
    /// Seed the run's generator was built from.
    pub seed: u64,
    /// Best cost the run reached.
    pub best_cost: C,
    /// Iterations the run executed.
    pub iterations: usize,
}

/// Result of a multi-start batch.
#[derive(Debug, Clone)]
pub struct MultiStartResult<S: Clone, C: super::Cost> {
    /// Full result of the winning run.
    pub best: SaResult<S, C>,
    /// Index of the winning run.
    pub best_run: usize,
    /// One summary per run, in run order.
    pub runs: Vec<RunSummary<C>>,
}

/// Runs the same problem several times from independent seeds.
///
/// # Examples
///
/// ```
/// use u_anneal::sa::{MultiStart, SaConfig};
/// use u_anneal::scheduling::SingleMachineTardiness;
///
/// let problem = SingleMachineTardiness::demo();
/// let config = SaConfig::default().with_seed(42);
/// let result = MultiStart::new(4).run(&problem, &config).unwrap();
/// assert_eq!(result.runs.len(), 4);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MultiStart {
    runs: usize,
    parallel: bool,
}

impl MultiStart {
    /// A batch of `runs` runs, parallel when the `parallel` feature is on.
    pub fn new(runs: usize) -> Self {
        Self {
            runs,
            parallel: cfg!(feature = "parallel"),
        }
    }

    /// Enables or disables parallel execution. Ignored without the
    /// `parallel` feature.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Executes the batch.
    ///
    /// Run `i` uses the seed `derive_seed(base, i)`, where `base` is
    /// `config.seed` or a fresh random value. Ties on best cost go to the
    /// lowest run index.
    pub fn run<P: SaProblem>(
        &self,
        problem: &P,
        config: &SaConfig,
    ) -> Result<MultiStartResult<P::Solution, P::Cost>, SaError> {
        if self.runs == 0 {
            return Err(ConfigError::NoRuns.into());
        }
        config.validate()?;

        let base = config.seed.unwrap_or_else(rand::random);
        let seeds: Vec<u64> = (0..self.runs as u64).map(|i| derive_seed(base, i)).collect();
        debug!(runs = self.runs, base_seed = base, parallel = self.parallel, "starting multi-start batch");

        let results = self.execute(problem, config, &seeds)?;

        let runs: Vec<RunSummary<P::Cost>> = seeds
            .iter()
            .zip(&results)
            .map(|(&seed, r)| RunSummary {
                seed,
                best_cost: r.best_cost,
                iterations: r.iterations,
            })
            .collect();

        let mut best_run = 0;
        for (i, r) in results.iter().enumerate().skip(1) {
            if r.best_cost < results[best_run].best_cost {
                best_run = i;
            }
        }
        let best = results
            .into_iter()
            .nth(best_run)
            .ok_or(ConfigError::NoRuns)?;

        debug!(best_run, best_cost = ?best.best_cost, "multi-start batch finished");

        Ok(MultiStartResult {
            best,
            best_run,
            runs,
        })
    }

    #[cfg(feature = "parallel")]
    fn execute<P: SaProblem>(
        &self,
        problem: &P,
        config: &SaConfig,
        seeds: &[u64],
    ) -> Result<Vec<SaResult<P::Solution, P::Cost>>, SaError> {
        if self.parallel {
            seeds
                .par_iter()
                .map(|&seed| single_run(problem, config, seed))
                .collect()
        } else {
            seeds
                .iter()
                .map(|&seed| single_run(problem, config, seed))
                .collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn execute<P: SaProblem>(
        &self,
        problem: &P,
        config: &SaConfig,
        seeds: &[u64],
    ) -> Result<Vec<SaResult<P::Solution, P::Cost>>, SaError> {
        seeds
            .iter()
            .map(|&seed| single_run(problem, config, seed))
            .collect()
    }
}

fn single_run<P: SaProblem>(
    problem: &P,
    config: &SaConfig,
    seed: u64,
) -> Result<SaResult<P::Solution, P::Cost>, SaError> {
    let mut rng = create_rng(Some(seed));
    SaRunner::run_with_rng(problem, config, &mut rng)
}

/// Derives the seed of run `index` from a base seed with one SplitMix64
/// step, so neighboring indices land on unrelated generator states.
pub fn derive_seed(base: u64, index: u64) -> u64 {
    let mut z = base.wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
