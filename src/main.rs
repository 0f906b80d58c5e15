use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use u_linefit::data::{self, LoadOptions, RowPolicy};
use u_linefit::ga::{FitResult, FitnessMetric, HyperParams, LineFitter};
use u_linefit::LineFitError;

/// Fit y = m·x + c to a two-column CSV (x, y) with a genetic algorithm.
#[derive(Parser, Debug)]
#[command(name = "u-linefit", version, about, long_about = None)]
struct Cli {
    /// Path to the CSV data, one `x,y` pair per row
    path: PathBuf,

    /// Number of evolutionary cycles to execute
    #[arg(long, default_value_t = 1000)]
    cycles: usize,

    /// Size of the population
    #[arg(long, default_value_t = 100)]
    pop_size: usize,

    /// Smallest possible value of m
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    min_m: f64,

    /// Largest possible value of m
    #[arg(long, default_value_t = 100.0, allow_negative_numbers = true)]
    max_m: f64,

    /// Smallest possible value of c
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    min_c: f64,

    /// Largest possible value of c
    #[arg(long, default_value_t = 100.0, allow_negative_numbers = true)]
    max_c: f64,

    /// Per-gene probability of mutation, between 0 and 1
    #[arg(long, default_value_t = 0.1)]
    mutation_rate: f64,

    /// Mutation step size as a fraction of each gene's range
    #[arg(long, default_value_t = 0.05)]
    mutation_scale: f64,

    /// Number of decimal places genes are rounded to
    #[arg(long, default_value_t = 2)]
    dps: u32,

    /// Contestants per tournament
    #[arg(long, default_value_t = 3)]
    tournament_size: usize,

    /// Best genomes carried unchanged into each new generation
    #[arg(long, default_value_t = 0)]
    elite_count: usize,

    /// Probability of recombining two winners' m and c
    #[arg(long, default_value_t = 0.0)]
    crossover_rate: f64,

    /// Fraction of each generation that is freshly sampled
    #[arg(long, default_value_t = 0.0)]
    immigration_ratio: f64,

    /// Fitness metric: `sse` (squared) or `sae` (absolute)
    #[arg(long, default_value = "sse")]
    metric: FitnessMetric,

    /// Seed for a reproducible run
    #[arg(long, env = "LINEFIT_SEED")]
    seed: Option<u64>,

    /// Amount of log output, 1 (debug) to 5 (critical only)
    #[arg(long, default_value_t = 2, env = "LINEFIT_VERBOSITY",
          value_parser = clap::value_parser!(u8).range(1..=5))]
    verbosity: u8,

    /// Drop malformed rows with a warning instead of failing
    #[arg(long)]
    skip_malformed: bool,

    /// Treat the first row as a header
    #[arg(long)]
    has_headers: bool,

    /// Keep evolving after a perfect fit is found
    #[arg(long)]
    no_early_stop: bool,

    /// Evaluate genomes on all cores
    #[arg(long)]
    parallel: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn hyper_params(&self) -> Result<HyperParams, LineFitError> {
        if self.cycles == 0 {
            return Err(LineFitError::config("cycles must be at least 1"));
        }
        let mut params = HyperParams::default()
            .with_cycles(self.cycles)
            .with_population_size(self.pop_size)
            .with_m_bounds(self.min_m, self.max_m)
            .with_c_bounds(self.min_c, self.max_c)
            .with_mutation_rate(self.mutation_rate)
            .with_mutation_scale(self.mutation_scale)
            .with_dps(self.dps)
            .with_tournament_size(self.tournament_size)
            .with_elite_count(self.elite_count)
            .with_crossover_rate(self.crossover_rate)
            .with_immigration_ratio(self.immigration_ratio)
            .with_metric(self.metric)
            .with_stop_on_perfect_fit(!self.no_early_stop)
            .with_parallel(self.parallel)
            .with_verbosity(self.verbosity);
        if let Some(seed) = self.seed {
            params = params.with_seed(seed);
        }
        params.validate()?;
        Ok(params)
    }

    fn load_options(&self) -> LoadOptions {
        let policy = if self.skip_malformed {
            RowPolicy::Skip
        } else {
            RowPolicy::FailFast
        };
        LoadOptions::default()
            .with_headers(self.has_headers)
            .with_row_policy(policy)
    }
}

/// Maps the 1–5 verbosity scale onto a tracing level.
fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        1 => "debug",
        2 => "info",
        3 => "warn",
        _ => "error",
    }
}

/// `RUST_LOG` wins over the verbosity setting.
fn init_logging(verbosity: u8) {
    let level = level_for(verbosity);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, params: &HyperParams) -> anyhow::Result<FitResult> {
    tracing::info!(path = %cli.path.display(), "loading dataset");
    let points = data::load_path(&cli.path, &cli.load_options())
        .with_context(|| format!("loading {}", cli.path.display()))?;
    let result = LineFitter::run(&points, params).context("evolution aborted")?;
    Ok(result)
}

fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<LineFitError>() {
        Some(fit_err) => match fit_err.generation() {
            Some(gen) => eprintln!("{} at generation {gen}: {err:#}", fit_err.kind()),
            None => eprintln!("{}: {err:#}", fit_err.kind()),
        },
        None => eprintln!("error: {err:#}"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let params = match cli.hyper_params() {
        Ok(params) => params,
        Err(err) => {
            init_logging(cli.verbosity);
            report_error(&anyhow::Error::new(err).context("rejected hyperparameters"));
            return ExitCode::FAILURE;
        }
    };
    init_logging(params.verbosity);

    match run(&cli, &params) {
        Ok(result) => {
            if cli.json {
                match serde_json::to_string_pretty(&result) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("error: failed to encode result: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                println!(
                    "Best candidate found with fitness of {} and formula of {} after {} generations",
                    result.best_fitness, result.best, result.generations
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}
