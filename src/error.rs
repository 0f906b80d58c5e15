//! Error taxonomy for line fitting.
//!
//! Every failure is deterministic given the same inputs, so nothing in the
//! crate retries. Callers classify errors with [`LineFitError::kind`].

use std::path::PathBuf;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LineFitError>;

/// Coarse classification of a [`LineFitError`], as reported to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid hyperparameters, detected before the engine starts.
    ConfigError,
    /// Empty, malformed, or non-numeric data.
    DataError,
    /// Internal contract breach (a programming defect).
    InvariantViolation,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::ConfigError => "ConfigError",
            ErrorKind::DataError => "DataError",
            ErrorKind::InvariantViolation => "InvariantViolation",
        };
        f.write_str(name)
    }
}

/// Errors produced while loading data, validating configuration, or running
/// the evolution.
#[derive(Debug, thiserror::Error)]
pub enum LineFitError {
    /// A hyperparameter is out of range or contradicts another one.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The dataset is unusable. `generation` is set when the failure surfaced
    /// during a run rather than at load time.
    #[error("{}", fmt_data(.generation, .reason))]
    Data {
        generation: Option<usize>,
        reason: String,
    },

    /// The dataset file could not be opened or read.
    #[error("failed to read dataset {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The delimited reader failed underneath a record. Rows it merely
    /// rejects are reported as [`LineFitError::Data`] with their line.
    #[error("failed to read dataset record: {0}")]
    Csv(#[from] csv::Error),

    /// An internal contract was broken.
    #[error("invariant violated in {component} at generation {generation}: {detail}")]
    Invariant {
        component: &'static str,
        generation: usize,
        detail: String,
    },
}

fn fmt_data(generation: &Option<usize>, reason: &str) -> String {
    match generation {
        Some(g) => format!("data error at generation {g}: {reason}"),
        None => format!("data error: {reason}"),
    }
}

impl LineFitError {
    /// Builds a [`LineFitError::Data`] with no generation attached.
    pub fn data(reason: impl Into<String>) -> Self {
        LineFitError::Data {
            generation: None,
            reason: reason.into(),
        }
    }

    /// Builds a [`LineFitError::Config`].
    pub fn config(reason: impl Into<String>) -> Self {
        LineFitError::Config(reason.into())
    }

    /// Returns the user-facing classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LineFitError::Config(_) => ErrorKind::ConfigError,
            LineFitError::Data { .. } | LineFitError::Io { .. } | LineFitError::Csv(_) => {
                ErrorKind::DataError
            }
            LineFitError::Invariant { .. } => ErrorKind::InvariantViolation,
        }
    }

    /// The generation at which the error occurred, if it happened mid-run.
    pub fn generation(&self) -> Option<usize> {
        match self {
            LineFitError::Data { generation, .. } => *generation,
            LineFitError::Invariant { generation, .. } => Some(*generation),
            _ => None,
        }
    }

    /// Attaches a generation index to a data error that lacks one.
    pub(crate) fn at_generation(self, gen: usize) -> Self {
        match self {
            LineFitError::Data {
                generation: None,
                reason,
            } => LineFitError::Data {
                generation: Some(gen),
                reason,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(LineFitError::config("x").kind(), ErrorKind::ConfigError);
        assert_eq!(LineFitError::data("x").kind(), ErrorKind::DataError);
        let io = LineFitError::Io {
            path: PathBuf::from("missing.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(io.kind(), ErrorKind::DataError);
        let inv = LineFitError::Invariant {
            component: "selection",
            generation: 3,
            detail: "empty population".into(),
        };
        assert_eq!(inv.kind(), ErrorKind::InvariantViolation);
        assert_eq!(inv.generation(), Some(3));
    }

    #[test]
    fn test_at_generation_only_fills_missing() {
        let err = LineFitError::data("dataset is empty").at_generation(0);
        assert_eq!(err.generation(), Some(0));
        assert_eq!(err.to_string(), "data error at generation 0: dataset is empty");

        let err = err.at_generation(7);
        assert_eq!(err.generation(), Some(0));

        let cfg = LineFitError::config("bad").at_generation(2);
        assert_eq!(cfg.generation(), None);
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            LineFitError::config("min_m (5) exceeds max_m (1)").to_string(),
            "invalid configuration: min_m (5) exceeds max_m (1)"
        );
        assert_eq!(
            LineFitError::data("row 2: expected 2 columns").to_string(),
            "data error: row 2: expected 2 columns"
        );
        assert_eq!(ErrorKind::InvariantViolation.to_string(), "InvariantViolation");
    }
}
