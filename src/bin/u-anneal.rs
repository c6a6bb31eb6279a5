use std::fmt::Debug;
use std::num::NonZero;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use u_anneal::sa::{MultiStart, SaConfig, SaProblem, SaRunner};
use u_anneal::scheduling::{
    AdjacentSquaredGap, FlexibleJobShop, FlowShop, JobShop, OpenShop, ProjectSchedule,
    SingleMachineTardiness, UnrelatedMachines,
};

/// Problem variant, each run on its built-in demo instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Variant {
    /// Order values to minimize squared adjacent gaps.
    Sequencing,
    /// Single machine total tardiness.
    Tardiness,
    /// Single machine total weighted tardiness.
    WeightedTardiness,
    /// Single machine tardiness with sequence-dependent setups.
    SetupTardiness,
    /// Permutation flow shop makespan.
    FlowShop,
    /// Unrelated parallel machines makespan.
    ParallelMachines,
    /// Job shop makespan.
    JobShop,
    /// Job shop with sequence-dependent setup times.
    SetupJobShop,
    /// Job shop with minimum time lags between operations.
    TimeLagJobShop,
    /// Flexible job shop with a machine choice per operation.
    FlexibleJobShop,
    /// Open shop makespan.
    OpenShop,
    /// Resource-constrained project scheduling.
    Rcpsp,
}

/// Simulated annealing on classic scheduling problems.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// The problem to solve.
    variant: Variant,
    /// JSON file with an `SaConfig`; missing fields keep their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Random seed.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Starting temperature.
    #[arg(long)]
    initial_temperature: Option<f64>,
    /// Geometric cooling factor in (0, 1).
    #[arg(long)]
    cooling_factor: Option<f64>,
    /// Stop once the temperature falls to this value.
    #[arg(long)]
    min_temperature: Option<f64>,
    /// Stop after this many neighbor evaluations.
    #[arg(long)]
    max_iterations: Option<usize>,
    /// Iterations at each temperature level.
    #[arg(long)]
    iterations_per_temperature: Option<usize>,
    /// Number of independent runs; the best one is reported.
    #[arg(short, long, default_value = "1")]
    restarts: NonZero<usize>,
}

impl Cli {
    fn sa_config(&self) -> anyhow::Result<SaConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => SaConfig::default(),
        };
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(t) = self.initial_temperature {
            config = config.with_initial_temperature(t);
        }
        if let Some(alpha) = self.cooling_factor {
            config = config.with_cooling_factor(alpha);
        }
        if let Some(t) = self.min_temperature {
            config = config.with_min_temperature(t);
        }
        if let Some(n) = self.max_iterations {
            config = config.with_max_iterations(n);
        }
        if let Some(k) = self.iterations_per_temperature {
            config = config.with_iterations_per_temperature(k);
        }
        Ok(config)
    }
}

fn solve<P>(problem: &P, config: &SaConfig, restarts: NonZero<usize>) -> anyhow::Result<()>
where
    P: SaProblem,
    P::Solution: Debug,
{
    let result = if restarts.get() > 1 {
        let batch = MultiStart::new(restarts.get()).run(problem, config)?;
        info!(best_run = batch.best_run, runs = batch.runs.len(), "multi-start finished");
        batch.best
    } else {
        SaRunner::run(problem, config)?
    };

    info!(
        iterations = result.iterations,
        accepted = result.accepted_moves,
        improving = result.improving_moves,
        final_temperature = result.final_temperature,
        termination = ?result.termination,
        "annealing finished"
    );
    println!("best solution: {:?}", result.best);
    println!("best cost: {:?}", result.best_cost);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.sa_config()?;
    info!(variant = ?cli.variant, ?config, "starting");

    match cli.variant {
        Variant::Sequencing => solve(&AdjacentSquaredGap::demo(), &config, cli.restarts),
        Variant::Tardiness => solve(&SingleMachineTardiness::demo(), &config, cli.restarts),
        Variant::WeightedTardiness => {
            solve(&SingleMachineTardiness::weighted_demo(), &config, cli.restarts)
        }
        Variant::SetupTardiness => {
            solve(&SingleMachineTardiness::setup_demo(), &config, cli.restarts)
        }
        Variant::FlowShop => solve(&FlowShop::demo(), &config, cli.restarts),
        Variant::ParallelMachines => solve(&UnrelatedMachines::demo(), &config, cli.restarts),
        Variant::JobShop => solve(&JobShop::demo(), &config, cli.restarts),
        Variant::SetupJobShop => solve(&JobShop::setup_demo(), &config, cli.restarts),
        Variant::TimeLagJobShop => solve(&JobShop::time_lag_demo(), &config, cli.restarts),
        Variant::FlexibleJobShop => solve(&FlexibleJobShop::demo(), &config, cli.restarts),
        Variant::OpenShop => solve(&OpenShop::demo(), &config, cli.restarts),
        Variant::Rcpsp => solve(&ProjectSchedule::demo(), &config, cli.restarts),
    }
}
