//! Population of candidate genomes for one generation.

use super::fitness::FitnessMetric;
use super::types::{Genome, SearchSpace};
use crate::data::DataPoint;
use crate::error::{LineFitError, Result};
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// An ordered, fixed-size collection of genomes.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    genomes: Vec<Genome>,
}

impl Population {
    /// Wraps an existing list of genomes.
    pub fn from_genomes(genomes: Vec<Genome>) -> Self {
        Self { genomes }
    }

    /// Samples `size` genomes uniformly from `space`, rounded to `dps` places.
    pub fn random<R: Rng>(space: &SearchSpace, size: usize, dps: u32, rng: &mut R) -> Self {
        let genomes = (0..size).map(|_| space.sample(rng, dps)).collect();
        Self { genomes }
    }

    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    pub fn into_genomes(self) -> Vec<Genome> {
        self.genomes
    }

    /// Scores every genome against `data`, in population order.
    ///
    /// With `parallel` set (and the `parallel` feature enabled) genomes are
    /// scored concurrently. Scores are identical either way since each genome
    /// is evaluated independently.
    pub fn evaluate(
        &self,
        data: &[DataPoint],
        metric: FitnessMetric,
        parallel: bool,
    ) -> Result<Vec<f64>> {
        if parallel {
            return evaluate_parallel(&self.genomes, data, metric);
        }
        evaluate_sequential(&self.genomes, data, metric)
    }

    /// Returns the genome with the lowest fitness and its score.
    ///
    /// Ties go to the genome that comes first.
    pub fn best(&self, data: &[DataPoint], metric: FitnessMetric) -> Result<(Genome, f64)> {
        let scores = self.evaluate(data, metric, false)?;
        let idx = best_index(&scores).ok_or_else(|| LineFitError::Invariant {
            component: "population",
            generation: 0,
            detail: "cannot pick the best of an empty population".into(),
        })?;
        Ok((self.genomes[idx], scores[idx]))
    }

    /// Indices of the `n` best genomes, best first, ties in population order.
    pub fn ranked(&self, scores: &[f64], n: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.genomes.len().min(scores.len())).collect();
        // Stable sort keeps ties in population order.
        order.sort_by(|&a, &b| {
            scores[a]
                .partial_cmp(&scores[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order.truncate(n);
        order
    }
}

fn evaluate_sequential(
    genomes: &[Genome],
    data: &[DataPoint],
    metric: FitnessMetric,
) -> Result<Vec<f64>> {
    genomes.iter().map(|g| metric.evaluate(g, data)).collect()
}

#[cfg(feature = "parallel")]
fn evaluate_parallel(
    genomes: &[Genome],
    data: &[DataPoint],
    metric: FitnessMetric,
) -> Result<Vec<f64>> {
    genomes.par_iter().map(|g| metric.evaluate(g, data)).collect()
}

#[cfg(not(feature = "parallel"))]
fn evaluate_parallel(
    genomes: &[Genome],
    data: &[DataPoint],
    metric: FitnessMetric,
) -> Result<Vec<f64>> {
    evaluate_sequential(genomes, data, metric)
}

/// Index of the lowest score, first one winning ties. `None` when empty.
pub fn best_index(scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &s) in scores.iter().enumerate() {
        match best {
            Some(b) if scores[b] <= s => {}
            _ => best = Some(i),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::types::Bounds;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn space() -> SearchSpace {
        SearchSpace::new(Bounds::new(-10.0, 10.0), Bounds::new(-5.0, 5.0))
    }

    #[test]
    fn test_random_population_size_and_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let pop = Population::random(&space(), 250, 2, &mut rng);
        assert_eq!(pop.len(), 250);
        for g in pop.genomes() {
            assert!(space().contains(g), "{g:?} out of bounds");
        }
    }

    #[test]
    fn test_random_population_is_reproducible() {
        let a = Population::random(&space(), 30, 3, &mut StdRng::seed_from_u64(5));
        let b = Population::random(&space(), 30, 3, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_best_picks_lowest_score() {
        let data = vec![DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 1.0)];
        let pop = Population::from_genomes(vec![
            Genome::new(0.0, 0.0),
            Genome::new(1.0, 0.0),
            Genome::new(2.0, 0.0),
        ]);
        let (g, score) = pop.best(&data, FitnessMetric::SquaredError).unwrap();
        assert_eq!(g, Genome::new(1.0, 0.0));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_best_breaks_ties_by_order() {
        assert_eq!(best_index(&[3.0, 1.0, 1.0, 2.0]), Some(1));
        assert_eq!(best_index(&[]), None);

        // Both lines miss the single point by 1.
        let data = vec![DataPoint::new(0.0, 0.0)];
        let pop = Population::from_genomes(vec![Genome::new(0.0, 1.0), Genome::new(0.0, -1.0)]);
        let (g, _) = pop.best(&data, FitnessMetric::AbsoluteError).unwrap();
        assert_eq!(g, Genome::new(0.0, 1.0));
    }

    #[test]
    fn test_best_of_empty_population_is_invariant_violation() {
        let data = vec![DataPoint::new(0.0, 0.0)];
        let err = Population::from_genomes(Vec::new())
            .best(&data, FitnessMetric::SquaredError)
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvariantViolation);
        assert!(err.to_string().contains("population"), "{err}");
    }

    #[test]
    fn test_evaluate_propagates_empty_dataset() {
        let pop = Population::from_genomes(vec![Genome::new(1.0, 1.0)]);
        assert!(pop.evaluate(&[], FitnessMetric::SquaredError, false).is_err());
    }

    #[test]
    fn test_ranked_is_stable() {
        let pop = Population::from_genomes(vec![Genome::new(0.0, 0.0); 5]);
        let scores = [4.0, 1.0, 3.0, 1.0, 0.5];
        assert_eq!(pop.ranked(&scores, 3), vec![4, 1, 3]);
        assert_eq!(pop.ranked(&scores, 0), Vec::<usize>::new());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_scores_match_sequential() {
        let data: Vec<DataPoint> = (0..100)
            .map(|i| DataPoint::new(i as f64, 2.0 * i as f64 + 1.0))
            .collect();
        let pop = Population::random(&space(), 64, 4, &mut StdRng::seed_from_u64(3));
        let seq = pop.evaluate(&data, FitnessMetric::SquaredError, false).unwrap();
        let par = pop.evaluate(&data, FitnessMetric::SquaredError, true).unwrap();
        assert_eq!(seq, par);
    }
}
