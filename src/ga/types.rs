//! Core value types: gene bounds, the search space, and the genome.
//!
//! A [`Genome`] is one candidate line `y = m·x + c`. Its genes are always kept
//! inside the [`SearchSpace`] it was created for: construction, mutation, and
//! crossover all finish with a clamp.

use rand::Rng;

/// Closed interval `[min, max]` for a single gene.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Width of the interval.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Forces `value` back into the interval.
    ///
    /// Unlike [`f64::clamp`] this never panics; validated bounds always have
    /// `min <= max`.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// Samples a value uniformly from the interval.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.span() <= 0.0 {
            self.min
        } else {
            rng.random_range(self.min..=self.max)
        }
    }

    /// Samples, rounds to `dps` decimal places, then clamps.
    pub fn sample_rounded<R: Rng>(&self, rng: &mut R, dps: u32) -> f64 {
        self.clamp(round_to(self.sample(rng), dps))
    }
}

/// The rectangle `[min_m, max_m] × [min_c, max_c]` genomes live in.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchSpace {
    /// Slope bounds.
    pub m: Bounds,
    /// Intercept bounds.
    pub c: Bounds,
}

impl SearchSpace {
    pub fn new(m: Bounds, c: Bounds) -> Self {
        Self { m, c }
    }

    pub fn contains(&self, genome: &Genome) -> bool {
        self.m.contains(genome.m) && self.c.contains(genome.c)
    }

    /// Clamps both genes of `genome` into the space.
    pub fn clamp(&self, genome: Genome) -> Genome {
        Genome {
            m: self.m.clamp(genome.m),
            c: self.c.clamp(genome.c),
        }
    }

    /// Samples a genome uniformly from the space, rounded to `dps` places.
    pub fn sample<R: Rng>(&self, rng: &mut R, dps: u32) -> Genome {
        Genome {
            m: self.m.sample_rounded(rng, dps),
            c: self.c.sample_rounded(rng, dps),
        }
    }
}

/// A candidate line: slope `m` and intercept `c`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Genome {
    pub m: f64,
    pub c: f64,
}

impl Genome {
    pub fn new(m: f64, c: f64) -> Self {
        Self { m, c }
    }

    /// Evaluates the line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.m * x + self.c
    }
}

impl std::fmt::Display for Genome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.c < 0.0 {
            write!(f, "y = {}x - {}", self.m, -self.c)
        } else {
            write!(f, "y = {}x + {}", self.m, self.c)
        }
    }
}

/// Rounds `value` to `dps` decimal places (half away from zero).
pub fn round_to(value: f64, dps: u32) -> f64 {
    let factor = 10f64.powi(dps.min(15) as i32);
    (value * factor).round() / factor
}
