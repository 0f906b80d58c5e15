//! Run configuration.
//!
//! [`HyperParams`] holds every parameter that controls the evolutionary loop.
//! It is built once, validated with [`HyperParams::validate`], and never
//! touched while the engine runs.

use super::fitness::FitnessMetric;
use super::types::{Bounds, SearchSpace};
use crate::error::{LineFitError, Result};

/// Hyperparameters for a line-fitting run.
///
/// # Defaults
///
/// ```
/// use u_linefit::ga::HyperParams;
///
/// let params = HyperParams::default();
/// assert_eq!(params.population_size, 100);
/// assert_eq!(params.cycles, 1000);
/// assert_eq!(params.tournament_size, 3);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_linefit::ga::HyperParams;
///
/// let params = HyperParams::default()
///     .with_population_size(200)
///     .with_cycles(500)
///     .with_m_bounds(-10.0, 10.0)
///     .with_c_bounds(-10.0, 10.0)
///     .with_seed(42);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HyperParams {
    /// Number of generation updates to run after generation 0.
    ///
    /// Zero is accepted and evaluates the initial population only.
    pub cycles: usize,

    /// Number of genomes in every generation.
    pub population_size: usize,

    /// Bounds for slope and intercept.
    pub space: SearchSpace,

    /// Per-gene probability of mutation (0.0–1.0).
    pub mutation_rate: f64,

    /// Standard deviation of a mutation delta, as a fraction of the gene's
    /// bound width.
    pub mutation_scale: f64,

    /// Decimal places genes are rounded to after sampling and mutation.
    pub dps: u32,

    /// Number of contestants per tournament. `1` means no selection pressure.
    pub tournament_size: usize,

    /// Number of best genomes copied unchanged into the next generation.
    pub elite_count: usize,

    /// Probability that a child combines `m` from one winner with `c` from a
    /// second winner. Zero gives clone-then-mutate reproduction.
    pub crossover_rate: f64,

    /// Fraction of each new generation sampled fresh from the search space.
    pub immigration_ratio: f64,

    /// How residuals are aggregated into a fitness score.
    pub metric: FitnessMetric,

    /// Stop as soon as a genome scores exactly zero.
    pub stop_on_perfect_fit: bool,

    /// Evaluate genomes in parallel (requires the `parallel` feature).
    pub parallel: bool,

    /// Random seed for reproducibility. `None` draws one from the OS.
    pub seed: Option<u64>,

    /// Logging detail on a 1–5 scale, lower is chattier.
    pub verbosity: u8,
}

impl Default for HyperParams {
    fn default() -> Self {
        Self {
            cycles: 1000,
            population_size: 100,
            space: SearchSpace::new(Bounds::new(0.0, 100.0), Bounds::new(0.0, 100.0)),
            mutation_rate: 0.1,
            mutation_scale: 0.05,
            dps: 2,
            tournament_size: 3,
            elite_count: 0,
            crossover_rate: 0.0,
            immigration_ratio: 0.0,
            metric: FitnessMetric::default(),
            stop_on_perfect_fit: true,
            parallel: false,
            seed: None,
            verbosity: 2,
        }
    }
}

impl HyperParams {
    pub fn with_cycles(mut self, n: usize) -> Self {
        self.cycles = n;
        self
    }

    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the slope bounds. Not reordered; `validate` rejects `min > max`.
    pub fn with_m_bounds(mut self, min: f64, max: f64) -> Self {
        self.space.m = Bounds::new(min, max);
        self
    }

    /// Sets the intercept bounds.
    pub fn with_c_bounds(mut self, min: f64, max: f64) -> Self {
        self.space.c = Bounds::new(min, max);
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_mutation_scale(mut self, scale: f64) -> Self {
        self.mutation_scale = scale;
        self
    }

    pub fn with_dps(mut self, dps: u32) -> Self {
        self.dps = dps;
        self
    }

    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    pub fn with_elite_count(mut self, n: usize) -> Self {
        self.elite_count = n;
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    pub fn with_immigration_ratio(mut self, ratio: f64) -> Self {
        self.immigration_ratio = ratio;
        self
    }

    pub fn with_metric(mut self, metric: FitnessMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_stop_on_perfect_fit(mut self, stop: bool) -> Self {
        self.stop_on_perfect_fit = stop;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Number of fresh genomes injected per generation.
    pub fn immigrant_count(&self) -> usize {
        (self.population_size as f64 * self.immigration_ratio).round() as usize
    }

    /// Number of tournament offspring per generation.
    pub fn offspring_count(&self) -> usize {
        self.population_size
            .saturating_sub(self.elite_count)
            .saturating_sub(self.immigrant_count())
    }

    /// Checks every parameter and their mutual consistency.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(LineFitError::config("population_size must be at least 1"));
        }
        check_bounds("m", &self.space.m)?;
        check_bounds("c", &self.space.c)?;
        check_probability("mutation_rate", self.mutation_rate)?;
        check_probability("crossover_rate", self.crossover_rate)?;
        check_probability("immigration_ratio", self.immigration_ratio)?;
        if !self.mutation_scale.is_finite() || self.mutation_scale < 0.0 {
            return Err(LineFitError::config(format!(
                "mutation_scale must be a non-negative number, got {}",
                self.mutation_scale
            )));
        }
        if self.tournament_size == 0 {
            return Err(LineFitError::config("tournament_size must be at least 1"));
        }
        if self.dps > 15 {
            return Err(LineFitError::config(format!(
                "dps must be at most 15, got {}",
                self.dps
            )));
        }
        if self.elite_count + self.immigrant_count() > self.population_size {
            return Err(LineFitError::config(format!(
                "elite_count ({}) plus immigrants ({}) exceed population_size ({})",
                self.elite_count,
                self.immigrant_count(),
                self.population_size
            )));
        }
        if !(1..=5).contains(&self.verbosity) {
            return Err(LineFitError::config(format!(
                "verbosity must be between 1 and 5, got {}",
                self.verbosity
            )));
        }
        if self.parallel && !cfg!(feature = "parallel") {
            return Err(LineFitError::config(
                "parallel evaluation requires the `parallel` feature",
            ));
        }
        Ok(())
    }
}

fn check_bounds(gene: &str, bounds: &Bounds) -> Result<()> {
    if !bounds.min.is_finite() || !bounds.max.is_finite() {
        return Err(LineFitError::config(format!(
            "bounds for {gene} must be finite, got [{}, {}]",
            bounds.min, bounds.max
        )));
    }
    if bounds.min > bounds.max {
        return Err(LineFitError::config(format!(
            "min_{gene} ({}) exceeds max_{gene} ({})",
            bounds.min, bounds.max
        )));
    }
    Ok(())
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(LineFitError::config(format!(
            "{name} must be within [0, 1], got {value}"
        )));
    }
    Ok(())
}
