//! Error type for the forecast generator.
//!
//! Variants fall into three groups:
//! - **input** errors: the history is missing or cannot be interpreted,
//! - **generation** errors: the model parameters or intermediate tables are inconsistent,
//! - **output** errors: a table could not be written or a written table is missing.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The history exists but could not be opened or decoded.
    #[error("cannot read input {}: {message}", path.display())]
    InputUnreadable { path: PathBuf, message: String },

    /// The history has no usable timestamp column, or values that cannot be coerced.
    #[error("data format error: {0}")]
    DataFormat(String),

    #[error("invalid forecast model: {0}")]
    InvalidModel(String),

    #[error("{left} and {right} tables are not row-aligned at row {row}")]
    Misaligned {
        left: &'static str,
        right: &'static str,
        row: usize,
    },

    #[error("failed to write {}: {message}", path.display())]
    Output { path: PathBuf, message: String },

    #[error("missing output files: {}", .0.join(", "))]
    MissingOutputs(Vec<String>),

    #[error("output file is empty: {0}")]
    EmptyOutput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataframe error: {0}")]
    Frame(#[from] PolarsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ForecastError {
    /// True for problems with the history file itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ForecastError::InputNotFound(_)
                | ForecastError::InputUnreadable { .. }
                | ForecastError::DataFormat(_)
        )
    }

    /// True when the failure happened while persisting or verifying outputs.
    pub fn is_output_error(&self) -> bool {
        matches!(
            self,
            ForecastError::Output { .. }
                | ForecastError::MissingOutputs(_)
                | ForecastError::EmptyOutput(_)
        )
    }
}

pub type ForecastResult<T> = Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ForecastError::InputNotFound(PathBuf::from("missing.parquet"));
        assert_eq!(err.to_string(), "input file not found: missing.parquet");
        assert!(err.is_input_error());
        assert!(!err.is_output_error());
    }

    #[test]
    fn test_missing_outputs_lists_names() {
        let err = ForecastError::MissingOutputs(vec!["a.csv".into(), "b.csv".into()]);
        assert_eq!(err.to_string(), "missing output files: a.csv, b.csv");
        assert!(err.is_output_error());
    }

    #[test]
    fn test_unreadable_input_is_an_input_error() {
        let err = ForecastError::InputUnreadable {
            path: PathBuf::from("history.parquet"),
            message: "not a parquet file".into(),
        };
        assert_eq!(
            err.to_string(),
            "cannot read input history.parquet: not a parquet file"
        );
        assert!(err.is_input_error());
        assert!(!err.is_output_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ForecastError = io_err.into();
        assert!(matches!(err, ForecastError::Io(_)));
    }
}
