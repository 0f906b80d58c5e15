//! Tournament selection.
//!
//! Picks a parent by drawing `k` genomes uniformly at random, with
//! replacement, and keeping the one with the lowest fitness. The tournament
//! size controls selection pressure:
//!
//! - k=1: uniform random choice, no pressure
//! - k=2: light pressure (good for diversity)
//! - k=3-5: moderate pressure (typical default)
//! - k>5: strong pressure (risk of premature convergence)
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use rand::Rng;

/// Tournament selector with a fixed tournament size.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use u_linefit::ga::Tournament;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
/// let scores = [3.0, 0.5, 2.0];
/// let idx = Tournament::new(3).select(&scores, &mut rng).unwrap();
/// assert!(idx < scores.len());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tournament {
    size: usize,
}

impl Default for Tournament {
    fn default() -> Self {
        Tournament { size: 3 }
    }
}

impl Tournament {
    /// Creates a selector. A size of 0 is treated as 1.
    pub fn new(size: usize) -> Self {
        Tournament { size: size.max(1) }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Selects a parent index given the population's fitness scores.
    ///
    /// Returns `None` when `scores` is empty. Among equal scores the
    /// contestant drawn first wins.
    ///
    /// # Complexity
    /// O(k) per selection
    pub fn select<R: Rng>(&self, scores: &[f64], rng: &mut R) -> Option<usize> {
        let n = scores.len();
        if n == 0 {
            return None;
        }

        let mut best_idx = rng.random_range(0..n);
        for _ in 1..self.size {
            let idx = rng.random_range(0..n);
            if scores[idx] < scores[best_idx] {
                best_idx = idx;
            }
        }
        Some(best_idx)
    }
}
