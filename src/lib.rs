//! Linear regression by genetic algorithm.
//!
//! Fits `y = m·x + c` to a 2D dataset by evolving a population of candidate
//! `(m, c)` pairs instead of solving the least-squares equations:
//!
//! - **Dataset loading** ([`data`]): Two-column delimited files into
//!   [`DataPoint`](data::DataPoint)s, strict or lenient about bad rows.
//! - **Evolution** ([`ga`]): Tournament selection, Gaussian mutation with
//!   clamping and rounding, optional elitism, crossover, and immigration.
//! - **Errors** ([`error`]): Config, data, and invariant failures, each
//!   reported with the generation it occurred at.
//!
//! # Example
//!
//! ```
//! use u_linefit::data::DataPoint;
//! use u_linefit::ga::{HyperParams, LineFitter};
//!
//! let data: Vec<DataPoint> = (0..10)
//!     .map(|i| DataPoint::new(i as f64, 3.0 * i as f64 + 2.0))
//!     .collect();
//! let params = HyperParams::default()
//!     .with_m_bounds(0.0, 10.0)
//!     .with_c_bounds(0.0, 10.0)
//!     .with_cycles(200)
//!     .with_seed(7);
//!
//! let result = LineFitter::run(&data, &params).unwrap();
//! assert!(result.best_fitness.is_finite());
//! ```

pub mod data;
pub mod error;
pub mod ga;

pub use error::{ErrorKind, LineFitError, Result};
