//! Dataset types and the delimited-file loader.
//!
//! A dataset is an ordered list of [`DataPoint`]s read from a two-column
//! delimited source: column 0 is `x`, column 1 is `y`. The loader is strict by
//! default, and any malformed row aborts the load. [`RowPolicy::Skip`] drops
//! such rows with a warning instead.

use crate::error::{LineFitError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One observation of the relationship being fitted.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

impl DataPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for DataPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// What to do with a row that cannot be parsed into a [`DataPoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Abort the load with a [`LineFitError::Data`].
    #[default]
    FailFast,
    /// Drop the row and log a warning.
    Skip,
}

/// Options controlling how a delimited dataset is read.
///
/// ```
/// use u_linefit::data::{LoadOptions, RowPolicy};
///
/// let opts = LoadOptions::default()
///     .with_headers(true)
///     .with_row_policy(RowPolicy::Skip);
/// assert_eq!(opts.delimiter, b',');
/// ```
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Whether the first row is a header to be ignored.
    pub has_headers: bool,
    /// Handling of malformed rows.
    pub row_policy: RowPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: false,
            row_policy: RowPolicy::FailFast,
        }
    }
}

impl LoadOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    pub fn with_row_policy(mut self, policy: RowPolicy) -> Self {
        self.row_policy = policy;
        self
    }
}

/// Loads a dataset from a file on disk.
pub fn load_path<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Vec<DataPoint>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LineFitError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let points = read_points(file, options)?;
    tracing::debug!(path = %path.display(), rows = points.len(), "dataset loaded");
    Ok(points)
}

/// Reads a dataset from any byte source.
///
/// Rows must have exactly two finite numeric fields. Blank lines are ignored.
pub fn read_points<R: Read>(reader: R, options: &LoadOptions) -> Result<Vec<DataPoint>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let fallback = idx as u64 + 1;
        let (line, parsed) = match record {
            Ok(record) => {
                let line = record.position().map_or(fallback, |p| p.line());
                (line, parse_record(&record))
            }
            // A failing reader is not a bad row; retrying it would never end.
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                let line = err.position().map_or(fallback, |p| p.line());
                (line, Err(err.to_string()))
            }
        };

        match parsed {
            Ok(point) => points.push(point),
            Err(reason) => match options.row_policy {
                RowPolicy::FailFast => {
                    return Err(LineFitError::data(format!("line {line}: {reason}")));
                }
                RowPolicy::Skip => {
                    tracing::warn!(line, %reason, "skipping malformed row");
                }
            },
        }
    }

    Ok(points)
}

fn parse_record(record: &csv::StringRecord) -> std::result::Result<DataPoint, String> {
    if record.len() != 2 {
        return Err(format!("expected 2 columns, found {}", record.len()));
    }
    let x = parse_field(&record[0], "x")?;
    let y = parse_field(&record[1], "y")?;
    Ok(DataPoint { x, y })
}

fn parse_field(raw: &str, name: &str) -> std::result::Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("{name} value {raw:?} is not a number"))?;
    if !value.is_finite() {
        return Err(format!("{name} value {raw:?} is not finite"));
    }
    Ok(value)
}
