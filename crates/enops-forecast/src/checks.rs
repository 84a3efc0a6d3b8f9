//! Pre- and post-run checks for the external scheduler.
//!
//! `validate_input` runs before a forecast and `check_outputs` after it; both
//! are cheap enough to call on every scheduled run.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing::{info, warn};

use enops_core::schema::ForecastTable;

use crate::error::{ForecastError, ForecastResult};
use crate::history::read_frame;
use crate::output::OutputFiles;

/// Inputs older than this are reported as stale.
pub const DEFAULT_MAX_INPUT_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputCheck {
    pub rows: usize,
    /// Time since the file was last modified.
    pub age: Duration,
    pub stale: bool,
}

/// Check that the history file exists, parses and has at least one row.
///
/// Staleness is a warning, not an error.
pub fn validate_input(path: &Path, max_age: Duration) -> ForecastResult<InputCheck> {
    let df = read_frame(path)?;
    if df.height() == 0 {
        return Err(ForecastError::DataFormat(format!(
            "{} contains no rows",
            path.display()
        )));
    }

    let modified = fs::metadata(path)?.modified()?;
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO);
    let stale = age > max_age;
    if stale {
        warn!(
            "input data is {} days old (limit {} days)",
            age.as_secs() / 86_400,
            max_age.as_secs() / 86_400
        );
    }
    info!("Input data validated: {} rows", df.height());

    Ok(InputCheck {
        rows: df.height(),
        age,
        stale,
    })
}

/// Check that all three forecast files exist under `dir` and are non-empty.
pub fn check_outputs(dir: &Path) -> ForecastResult<OutputFiles> {
    let files = OutputFiles::in_dir(dir);
    let missing: Vec<String> = files
        .iter()
        .filter(|(_, path)| !path.is_file())
        .map(|(table, _)| table.file_name().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ForecastError::MissingOutputs(missing));
    }

    for table in ForecastTable::ALL {
        let path = files.path(table);
        if fs::metadata(path)?.len() == 0 {
            return Err(ForecastError::EmptyOutput(table.file_name().to_string()));
        }
    }
    info!("All forecast outputs present in {}", dir.display());
    Ok(files)
}
