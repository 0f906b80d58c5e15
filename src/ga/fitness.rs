//! Fitness evaluation.
//!
//! A genome's fitness is the aggregated residual `y - (m·x + c)` over the
//! whole dataset. Lower is better; zero is a perfect fit.

use super::types::Genome;
use crate::data::DataPoint;
use crate::error::{LineFitError, Result};

/// How residuals are aggregated into a single score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitnessMetric {
    /// Sum of squared residuals.
    #[default]
    SquaredError,
    /// Sum of absolute residuals.
    AbsoluteError,
}

impl FitnessMetric {
    /// Scores `genome` against `data`.
    ///
    /// Pure and deterministic. Fails with a data error when `data` is empty or
    /// the score is not a finite number.
    pub fn evaluate(&self, genome: &Genome, data: &[DataPoint]) -> Result<f64> {
        if data.is_empty() {
            return Err(LineFitError::data("dataset is empty"));
        }

        let residuals = data.iter().map(|p| p.y - genome.predict(p.x));
        let score: f64 = match self {
            FitnessMetric::SquaredError => residuals.map(|r| r * r).sum(),
            FitnessMetric::AbsoluteError => residuals.map(f64::abs).sum(),
        };

        if !score.is_finite() {
            return Err(LineFitError::data(format!(
                "fitness of {genome} is not finite ({score})"
            )));
        }
        Ok(score)
    }
}

impl std::str::FromStr for FitnessMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sse" | "squared" | "squared-error" => Ok(FitnessMetric::SquaredError),
            "sae" | "absolute" | "absolute-error" => Ok(FitnessMetric::AbsoluteError),
            other => Err(format!("unknown fitness metric {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn line_data() -> Vec<DataPoint> {
        (0..4).map(|i| DataPoint::new(i as f64, i as f64)).collect()
    }

    #[test]
    fn test_perfect_fit_scores_zero() {
        let data = line_data();
        let g = Genome::new(1.0, 0.0);
        assert_eq!(FitnessMetric::SquaredError.evaluate(&g, &data).unwrap(), 0.0);
        assert_eq!(FitnessMetric::AbsoluteError.evaluate(&g, &data).unwrap(), 0.0);
    }

    #[test]
    fn test_squared_and_absolute_error() {
        let data = line_data();
        // Residuals against y = x + 1 are all -1.
        let g = Genome::new(1.0, 1.0);
        assert_eq!(FitnessMetric::SquaredError.evaluate(&g, &data).unwrap(), 4.0);
        assert_eq!(FitnessMetric::AbsoluteError.evaluate(&g, &data).unwrap(), 4.0);

        // Residuals against y = 0 are 0, 1, 2, 3.
        let g = Genome::new(0.0, 0.0);
        assert_eq!(FitnessMetric::SquaredError.evaluate(&g, &data).unwrap(), 14.0);
        assert_eq!(FitnessMetric::AbsoluteError.evaluate(&g, &data).unwrap(), 6.0);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let data: Vec<DataPoint> = (0..50)
            .map(|i| DataPoint::new(i as f64 * 0.37, (i as f64).sin()))
            .collect();
        let g = Genome::new(0.123, -4.56);
        let a = FitnessMetric::SquaredError.evaluate(&g, &data).unwrap();
        let b = FitnessMetric::SquaredError.evaluate(&g, &data).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_empty_dataset_is_data_error() {
        let err = FitnessMetric::SquaredError
            .evaluate(&Genome::new(1.0, 0.0), &[])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataError);
    }

    #[test]
    fn test_overflow_is_data_error() {
        let data = vec![DataPoint::new(1e200, 0.0)];
        let err = FitnessMetric::SquaredError
            .evaluate(&Genome::new(1e200, 0.0), &data)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataError);
        assert!(err.to_string().contains("not finite"));
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!("sse".parse::<FitnessMetric>().unwrap(), FitnessMetric::SquaredError);
        assert_eq!(
            "Absolute".parse::<FitnessMetric>().unwrap(),
            FitnessMetric::AbsoluteError
        );
        assert!("median".parse::<FitnessMetric>().is_err());
    }
}
