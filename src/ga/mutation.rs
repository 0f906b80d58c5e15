//! Reproduction operators: Gaussian gene mutation and m/c crossover.
//!
//! Operators always return a new [`Genome`]; parents are taken by reference
//! and never modified. Every produced genome is rounded to the configured
//! number of decimal places and clamped into the search space.

use super::config::HyperParams;
use super::types::{round_to, Bounds, Genome, SearchSpace};
use crate::error::{LineFitError, Result};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Per-gene Gaussian mutation.
///
/// Each gene mutates independently with probability `rate`. A mutated gene
/// receives a delta drawn from `N(0, scale · (max - min))` for its bounds.
/// A selected gene always moves by at least one `10^-dps` step unless it is
/// pinned against a bound.
#[derive(Debug, Clone)]
pub struct Mutator {
    rate: f64,
    dps: u32,
    space: SearchSpace,
    m_delta: Option<Normal<f64>>,
    c_delta: Option<Normal<f64>>,
}

impl Mutator {
    /// Builds a mutator from explicit settings.
    pub fn new(space: SearchSpace, rate: f64, scale: f64, dps: u32) -> Result<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(LineFitError::config(format!(
                "mutation_rate must be within [0, 1], got {rate}"
            )));
        }
        Ok(Self {
            rate,
            dps,
            space,
            m_delta: delta_distribution(&space.m, scale)?,
            c_delta: delta_distribution(&space.c, scale)?,
        })
    }

    /// Builds a mutator from validated hyperparameters.
    pub fn from_params(params: &HyperParams) -> Result<Self> {
        Self::new(
            params.space,
            params.mutation_rate,
            params.mutation_scale,
            params.dps,
        )
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Produces a possibly-mutated copy of `parent`.
    ///
    /// With a rate of 0 the copy is identical to the parent.
    pub fn mutate<R: Rng>(&self, parent: &Genome, rng: &mut R) -> Genome {
        if self.rate <= 0.0 {
            return *parent;
        }
        let m = self.mutate_gene(parent.m, &self.space.m, self.m_delta.as_ref(), rng);
        let c = self.mutate_gene(parent.c, &self.space.c, self.c_delta.as_ref(), rng);
        Genome { m, c }
    }

    fn mutate_gene<R: Rng>(
        &self,
        value: f64,
        bounds: &Bounds,
        delta: Option<&Normal<f64>>,
        rng: &mut R,
    ) -> f64 {
        if !rng.random_bool(self.rate) {
            return value;
        }
        let Some(delta) = delta else {
            return value;
        };
        let step = delta.sample(rng);
        let mut next = round_to(value + step, self.dps);
        if next == value {
            // The delta vanished in rounding; move one grid unit its way.
            let unit = 10f64.powi(-(self.dps.min(15) as i32));
            next = round_to(if step < 0.0 { value - unit } else { value + unit }, self.dps);
        }
        bounds.clamp(next)
    }
}

/// `None` for zero-width bounds or a zero scale, where mutation has no room.
fn delta_distribution(bounds: &Bounds, scale: f64) -> Result<Option<Normal<f64>>> {
    let std_dev = bounds.span() * scale;
    if std_dev <= 0.0 {
        return Ok(None);
    }
    Normal::new(0.0, std_dev)
        .map(Some)
        .map_err(|e| LineFitError::config(format!("invalid mutation distribution: {e}")))
}

/// Combines the slope of `a` with the intercept of `b`.
pub fn crossover(a: &Genome, b: &Genome) -> Genome {
    Genome { m: a.m, c: b.c }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn space() -> SearchSpace {
        SearchSpace::new(Bounds::new(-10.0, 10.0), Bounds::new(-10.0, 10.0))
    }

    #[test]
    fn test_zero_rate_is_identity() {
        let mutator = Mutator::new(space(), 0.0, 0.5, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let parent = Genome::new(1.2345, -6.789);
        for _ in 0..100 {
            assert_eq!(mutator.mutate(&parent, &mut rng), parent);
        }
    }

    #[test]
    fn test_full_rate_perturbs_every_gene() {
        let mutator = Mutator::new(space(), 1.0, 0.1, 6).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let parent = Genome::new(0.0, 0.0);
        for _ in 0..100 {
            let child = mutator.mutate(&parent, &mut rng);
            assert_ne!(child.m, parent.m);
            assert_ne!(child.c, parent.c);
        }
    }

    #[test]
    fn test_full_rate_perturbs_at_zero_dps() {
        // Deltas are far below 0.5, so rounding alone would undo them.
        let mutator = Mutator::new(space(), 1.0, 0.01, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let parent = Genome::new(3.0, 3.0);
        for _ in 0..1000 {
            let child = mutator.mutate(&parent, &mut rng);
            assert_ne!(child.m, parent.m);
            assert_ne!(child.c, parent.c);
            assert!((child.m - parent.m).abs() == 1.0, "{child:?}");
            assert_eq!(child.c, child.c.round());
        }
    }

    #[test]
    fn test_pinned_gene_stays_on_bound() {
        let mutator = Mutator::new(space(), 1.0, 0.001, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let child = mutator.mutate(&Genome::new(10.0, -10.0), &mut rng);
            assert!(space().contains(&child));
            assert!(child.m == 10.0 || child.m == 9.0);
        }
    }

    #[test]
    fn test_parent_is_untouched() {
        let mutator = Mutator::new(space(), 1.0, 0.1, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let parent = Genome::new(4.0, 4.0);
        let snapshot = parent;
        let _child = mutator.mutate(&parent, &mut rng);
        assert_eq!(parent, snapshot);
    }

    #[test]
    fn test_mutation_clamps_at_bounds() {
        // A huge scale pushes nearly every delta past the edge.
        let mutator = Mutator::new(space(), 1.0, 50.0, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let mut hit_edge = false;
        for _ in 0..200 {
            let child = mutator.mutate(&Genome::new(9.99, -9.99), &mut rng);
            assert!(space().contains(&child), "{child:?} out of bounds");
            hit_edge |= child.m == 10.0 || child.c == -10.0;
        }
        assert!(hit_edge);
    }

    #[test]
    fn test_mutation_rounds_to_dps() {
        let mutator = Mutator::new(space(), 1.0, 0.1, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..100 {
            let child = mutator.mutate(&Genome::new(0.0, 0.0), &mut rng);
            assert_eq!(child.m, round_to(child.m, 1));
            assert_eq!(child.c, round_to(child.c, 1));
        }
    }

    #[test]
    fn test_degenerate_bounds_never_move() {
        let fixed = SearchSpace::new(Bounds::new(2.0, 2.0), Bounds::new(-10.0, 10.0));
        let mutator = Mutator::new(fixed, 1.0, 0.1, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let child = mutator.mutate(&Genome::new(2.0, 0.0), &mut rng);
        assert_eq!(child.m, 2.0);
    }

    #[test]
    fn test_rejects_invalid_rate() {
        assert!(Mutator::new(space(), 1.5, 0.1, 2).is_err());
    }

    #[test]
    fn test_crossover_takes_m_then_c() {
        let a = Genome::new(1.0, 2.0);
        let b = Genome::new(3.0, 4.0);
        assert_eq!(crossover(&a, &b), Genome::new(1.0, 4.0));
        assert_eq!(crossover(&b, &a), Genome::new(3.0, 2.0));
    }

    proptest! {
        #[test]
        fn prop_mutated_genomes_in_bounds(
            seed in any::<u64>(),
            m in -10.0f64..=10.0,
            c in -10.0f64..=10.0,
            rate in 0.0f64..=1.0,
            scale in 0.0f64..5.0,
            dps in 0u32..8,
        ) {
            let mutator = Mutator::new(space(), rate, scale, dps).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let child = mutator.mutate(&Genome::new(m, c), &mut rng);
            prop_assert!(space().contains(&child), "{:?} outside bounds", child);
        }
    }
}
