//! Genetic algorithm for fitting `y = m·x + c`.
//!
//! A population of `(m, c)` genomes evolves by tournament selection and
//! Gaussian mutation. Fitness is the aggregated residual over the dataset,
//! so lower is better and zero is a perfect fit.
//!
//! # Key Types
//!
//! - [`HyperParams`]: Run parameters with builder methods and validation
//! - [`Evolution`]: The generational state machine
//! - [`LineFitter`]: One-call entry point
//! - [`FitResult`]: Best genome, its fitness, and the fitness history
//!
//! # Operators
//!
//! - [`FitnessMetric`]: Sum of squared or absolute residuals
//! - [`Tournament`]: Best-of-k parent selection
//! - [`Mutator`]: Per-gene Gaussian perturbation with clamping
//! - [`crossover`]: Optional slope/intercept recombination
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*

mod config;
mod fitness;
mod mutation;
mod population;
mod runner;
mod selection;
mod types;

pub use config::HyperParams;
pub use fitness::FitnessMetric;
pub use mutation::{crossover, Mutator};
pub use population::{best_index, Population};
pub use runner::{Evolution, FitResult, GenerationStats, LineFitter, Phase};
pub use selection::Tournament;
pub use types::{round_to, Bounds, Genome, SearchSpace};
