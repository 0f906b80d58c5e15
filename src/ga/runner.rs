//! Evolution engine.
//!
//! [`Evolution`] drives the generational loop as an explicit state machine:
//!
//! ```text
//! Initializing → Evaluating → Selecting → Mutating → Advancing
//!                  │    ▲                                  │
//!                  │    └──────── counter < cycles ────────┤
//!                  └→ Terminated ←──── counter = cycles ───┘
//! ```
//!
//! Each of the `cycles` updates evaluates the current population, then
//! selects, mutates, and advances the generation counter. The run terminates
//! once the counter reaches `cycles`, so exactly `cycles` populations are
//! scored and the last one produced is never evaluated. With `cycles = 0`
//! only the initial population is scored. A perfect fit ends the run early
//! when `stop_on_perfect_fit` is set.
//!
//! The dataset is borrowed for the whole run and never copied or modified.
//! All randomness comes from the single RNG the engine owns.

use super::config::HyperParams;
use super::mutation::{crossover, Mutator};
use super::population::{best_index, Population};
use super::selection::Tournament;
use super::types::Genome;
use crate::data::DataPoint;
use crate::error::{LineFitError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// State of the evolution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Evaluating,
    Selecting,
    Mutating,
    Advancing,
    Terminated,
}

/// Summary of one evaluated generation, handed to observers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// Generation index, 0 for the initial population.
    pub generation: usize,
    /// Best genome of this generation.
    pub best_genome: Genome,
    /// Fitness of `best_genome`.
    pub best_fitness: f64,
    /// Mean fitness across the generation.
    pub mean_fitness: f64,
    /// Best fitness seen so far in the run.
    pub best_ever_fitness: f64,
}

/// Result of a finished run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitResult {
    /// The best genome found during the entire run.
    pub best: Genome,

    /// Fitness of `best`.
    pub best_fitness: f64,

    /// Number of generation updates completed.
    pub generations: usize,

    /// Whether the run stopped early on a zero-error genome.
    pub perfect_fit: bool,

    /// Best-ever fitness after each evaluated generation (initial included).
    pub fitness_history: Vec<f64>,
}

/// Generational GA over `(m, c)` genomes.
///
/// # Usage
///
/// ```
/// use u_linefit::data::DataPoint;
/// use u_linefit::ga::{Evolution, HyperParams};
///
/// let data: Vec<DataPoint> = (0..4).map(|i| DataPoint::new(i as f64, i as f64)).collect();
/// let params = HyperParams::default()
///     .with_cycles(50)
///     .with_m_bounds(-10.0, 10.0)
///     .with_c_bounds(-10.0, 10.0)
///     .with_seed(42);
///
/// let result = Evolution::new(&data, params).unwrap().run().unwrap();
/// assert!(result.best_fitness.is_finite());
/// ```
pub struct Evolution<'a, R: Rng = StdRng> {
    data: &'a [DataPoint],
    params: HyperParams,
    rng: R,
    selector: Tournament,
    mutator: Mutator,
    phase: Phase,
    generation: usize,
    population: Population,
    scores: Vec<f64>,
    elites: Vec<Genome>,
    pool: Vec<Genome>,
    best: Option<(Genome, f64)>,
    perfect_fit: bool,
    history: Vec<f64>,
}

impl<'a> Evolution<'a, StdRng> {
    /// Creates an engine seeded from `params.seed`, or from the OS when unset.
    ///
    /// Fails with a config error before anything is built if `params` is
    /// invalid.
    pub fn new(data: &'a [DataPoint], params: HyperParams) -> Result<Self> {
        let seed = params.seed.unwrap_or_else(rand::random);
        Self::with_rng(data, params, StdRng::seed_from_u64(seed))
    }
}

impl<'a, R: Rng> Evolution<'a, R> {
    /// Creates an engine that draws from the given RNG.
    pub fn with_rng(data: &'a [DataPoint], params: HyperParams, rng: R) -> Result<Self> {
        params.validate()?;
        let mutator = Mutator::from_params(&params)?;
        tracing::info!(?params, rows = data.len(), "evolution configured");

        Ok(Self {
            data,
            selector: Tournament::new(params.tournament_size),
            mutator,
            rng,
            phase: Phase::Initializing,
            generation: 0,
            population: Population::from_genomes(Vec::new()),
            scores: Vec::new(),
            elites: Vec::new(),
            pool: Vec::new(),
            best: None,
            perfect_fit: false,
            history: Vec::new(),
            params,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the current generation.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Best genome and fitness seen so far, if anything has been evaluated.
    pub fn best(&self) -> Option<(Genome, f64)> {
        self.best
    }

    /// Advances the state machine by exactly one state.
    ///
    /// Calling this once terminated is a no-op. Errors are fatal: the engine
    /// must not be stepped again after one.
    pub fn step(&mut self) -> Result<Phase> {
        self.advance()?;
        Ok(self.phase)
    }

    /// Runs to termination.
    pub fn run(self) -> Result<FitResult> {
        self.run_with(|_| {})
    }

    /// Runs to termination, calling `observer` after every evaluated
    /// generation.
    pub fn run_with<F>(mut self, mut observer: F) -> Result<FitResult>
    where
        F: FnMut(&GenerationStats),
    {
        while self.phase != Phase::Terminated {
            if let Some(stats) = self.advance()? {
                observer(&stats);
            }
        }
        self.result().ok_or_else(|| {
            invariant("engine", self.generation, "terminated without a best genome")
        })
    }

    /// The run's result, available once terminated.
    pub fn result(&self) -> Option<FitResult> {
        if self.phase != Phase::Terminated {
            return None;
        }
        let (best, best_fitness) = self.best?;
        Some(FitResult {
            best,
            best_fitness,
            generations: self.generation,
            perfect_fit: self.perfect_fit,
            fitness_history: self.history.clone(),
        })
    }

    /// Performs the work of the current phase and moves to the next one.
    /// Returns the generation summary when the phase was `Evaluating`.
    fn advance(&mut self) -> Result<Option<GenerationStats>> {
        let mut stats = None;
        self.phase = match self.phase {
            Phase::Initializing => {
                self.initialize();
                Phase::Evaluating
            }
            Phase::Evaluating => {
                let s = self.evaluate()?;
                let next = self.after_evaluation(&s);
                stats = Some(s);
                next
            }
            Phase::Selecting => {
                self.select()?;
                Phase::Mutating
            }
            Phase::Mutating => {
                self.mutate();
                Phase::Advancing
            }
            Phase::Advancing => {
                self.replace_population()?;
                if self.generation >= self.params.cycles {
                    self.finish()
                } else {
                    Phase::Evaluating
                }
            }
            Phase::Terminated => Phase::Terminated,
        };
        tracing::trace!(generation = self.generation, phase = ?self.phase, "phase transition");
        Ok(stats)
    }

    fn initialize(&mut self) {
        let p = &self.params;
        self.population = Population::random(&p.space, p.population_size, p.dps, &mut self.rng);
        tracing::debug!(size = self.population.len(), "initial population created");
    }

    fn evaluate(&mut self) -> Result<GenerationStats> {
        let gen = self.generation;
        let scores = self
            .population
            .evaluate(self.data, self.params.metric, self.params.parallel)
            .map_err(|e| e.at_generation(gen))?;
        let idx = best_index(&scores)
            .ok_or_else(|| invariant("evaluation", gen, "population is empty"))?;

        let gen_best = (self.population.genomes()[idx], scores[idx]);
        match self.best {
            Some((_, incumbent)) if incumbent <= gen_best.1 => {}
            _ => {
                if let Some((_, old)) = self.best {
                    tracing::debug!(generation = gen, from = old, to = gen_best.1, "new best");
                }
                self.best = Some(gen_best);
            }
        }
        let best_ever_fitness = self.best.map_or(gen_best.1, |(_, f)| f);
        self.history.push(best_ever_fitness);

        let mean_fitness = scores.iter().sum::<f64>() / scores.len() as f64;
        self.scores = scores;

        let stats = GenerationStats {
            generation: gen,
            best_genome: gen_best.0,
            best_fitness: gen_best.1,
            mean_fitness,
            best_ever_fitness,
        };
        tracing::info!(
            generation = gen,
            best_m = stats.best_genome.m,
            best_c = stats.best_genome.c,
            best_fitness = stats.best_fitness,
            mean_fitness,
            best_ever_fitness,
            "generation evaluated"
        );
        Ok(stats)
    }

    fn after_evaluation(&mut self, stats: &GenerationStats) -> Phase {
        if self.params.stop_on_perfect_fit && stats.best_ever_fitness == 0.0 {
            self.perfect_fit = true;
            tracing::info!(generation = self.generation, "perfect fit found, stopping early");
            return Phase::Terminated;
        }
        if self.params.cycles == 0 {
            return self.finish();
        }
        Phase::Selecting
    }

    fn finish(&self) -> Phase {
        if let Some((g, f)) = self.best {
            tracing::info!(m = g.m, c = g.c, fitness = f, generations = self.generation, "run finished");
        }
        Phase::Terminated
    }

    fn select(&mut self) -> Result<()> {
        let gen = self.generation;
        let genomes = self.population.genomes();
        let scores = &self.scores;
        let rng = &mut self.rng;

        self.elites = self
            .population
            .ranked(scores, self.params.elite_count)
            .into_iter()
            .map(|i| genomes[i])
            .collect();

        let offspring = self.params.offspring_count();
        let mut pool = Vec::with_capacity(offspring);
        for _ in 0..offspring {
            let a = self
                .selector
                .select(scores, rng)
                .ok_or_else(|| invariant("selection", gen, "population is empty"))?;
            let child = if self.params.crossover_rate > 0.0
                && rng.random_bool(self.params.crossover_rate)
            {
                let b = self
                    .selector
                    .select(scores, rng)
                    .ok_or_else(|| invariant("selection", gen, "population is empty"))?;
                crossover(&genomes[a], &genomes[b])
            } else {
                genomes[a]
            };
            pool.push(child);
        }
        tracing::debug!(
            generation = gen,
            elites = self.elites.len(),
            offspring = pool.len(),
            "parents selected"
        );
        self.pool = pool;
        Ok(())
    }

    fn mutate(&mut self) {
        let mutator = &self.mutator;
        let rng = &mut self.rng;
        for genome in self.pool.iter_mut() {
            *genome = mutator.mutate(genome, rng);
        }
    }

    fn replace_population(&mut self) -> Result<()> {
        let gen = self.generation;
        let p = &self.params;

        let mut next = std::mem::take(&mut self.elites);
        next.append(&mut self.pool);
        let immigrants = p.immigrant_count();
        next.extend((0..immigrants).map(|_| p.space.sample(&mut self.rng, p.dps)));

        if next.len() != p.population_size {
            return Err(invariant(
                "advance",
                gen,
                format!(
                    "next generation has {} genomes, expected {}",
                    next.len(),
                    p.population_size
                ),
            ));
        }
        if let Some(g) = next.iter().find(|g| !p.space.contains(g)) {
            return Err(invariant(
                "mutation",
                gen,
                format!("genome {g:?} lies outside {:?}", p.space),
            ));
        }

        self.population = Population::from_genomes(next);
        self.generation += 1;
        Ok(())
    }
}

fn invariant(component: &'static str, generation: usize, detail: impl Into<String>) -> LineFitError {
    LineFitError::Invariant {
        component,
        generation,
        detail: detail.into(),
    }
}

/// One-call entry point for a full run.
///
/// # Usage
///
/// ```ignore
/// let data = u_linefit::data::load_path("points.csv", &Default::default())?;
/// let params = HyperParams::default().with_seed(42);
/// let result = LineFitter::run(&data, &params)?;
/// println!("{} (fitness {})", result.best, result.best_fitness);
/// ```
pub struct LineFitter;

impl LineFitter {
    pub fn run(data: &[DataPoint], params: &HyperParams) -> Result<FitResult> {
        Evolution::new(data, params.clone())?.run()
    }

    pub fn run_with<F>(data: &[DataPoint], params: &HyperParams, observer: F) -> Result<FitResult>
    where
        F: FnMut(&GenerationStats),
    {
        Evolution::new(data, params.clone())?.run_with(observer)
    }
}

// ============================================================================
// Tests
// ============================================================================
