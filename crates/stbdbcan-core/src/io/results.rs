//! Result files: `<stem>_results.csv`, `.txt` and `.json`.
//!
//! All three are rendered in memory first; nothing touches the disk unless
//! every rendering succeeded.

use std::fs;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tracing::info;

use crate::error::InputError;
use crate::pipeline::RunOutcome;

use super::dataset::RawTable;

/// Column appended with the cluster label.
pub const CLUSTER_COLUMN: &str = "clusterID";

/// Column appended with the ST-BOF score when requested.
pub const SCORE_COLUMN: &str = "stbof";

/// Output locations derived from the dataset path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPaths {
    /// Input rows with the label column.
    pub csv: PathBuf,
    /// Text report.
    pub report: PathBuf,
    /// JSON summary.
    pub json: PathBuf,
}

impl ResultPaths {
    /// `<dir>/<dataset stem>_results.{csv,txt,json}`, where `<dir>` is
    /// `directory` or else the dataset's own directory.
    ///
    /// # Example
    ///
    /// ```
    /// use std::path::Path;
    /// use stbdbcan_core::io::ResultPaths;
    ///
    /// let paths = ResultPaths::for_dataset(Path::new("data/traffic.csv"), None);
    /// assert_eq!(paths.csv, Path::new("data/traffic_results.csv"));
    /// assert_eq!(paths.report, Path::new("data/traffic_results.txt"));
    /// ```
    pub fn for_dataset(dataset: &Path, directory: Option<&Path>) -> Self {
        let stem = dataset
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string());
        let dir = directory
            .map(Path::to_path_buf)
            .or_else(|| dataset.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        let base = format!("{}_results", stem);
        Self {
            csv: dir.join(format!("{}.csv", base)),
            report: dir.join(format!("{}.txt", base)),
            json: dir.join(format!("{}.json", base)),
        }
    }
}

/// Render the results CSV: every processed row in input order, unscaled,
/// with [`CLUSTER_COLUMN`] (and [`SCORE_COLUMN`] if `emit_scores`) appended.
///
/// # Errors
/// - `InputError::Write` if CSV serialization fails
pub fn render_results_csv(
    raw: &RawTable,
    outcome: &RunOutcome,
    emit_scores: bool,
) -> Result<String, InputError> {
    let target = "<results csv>";
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    let mut header: Vec<&str> = raw.headers().iter().map(String::as_str).collect();
    header.push(CLUSTER_COLUMN);
    if emit_scores {
        header.push(SCORE_COLUMN);
    }
    writer
        .write_record(&header)
        .map_err(|e| InputError::write(target, e))?;

    for result in outcome.by_row() {
        let source = raw.rows().get(result.row).ok_or_else(|| {
            InputError::write(target, format!("row {} missing from input", result.row))
        })?;
        let mut record: Vec<String> = source.clone();
        record.push(result.label.to_string());
        if emit_scores {
            record.push(result.score.to_string());
        }
        writer
            .write_record(&record)
            .map_err(|e| InputError::write(target, e))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| InputError::write(target, e.error()))?;
    String::from_utf8(bytes).map_err(|e| InputError::write(target, e))
}

/// Render and write all three result files.
///
/// # Errors
/// - `InputError::Write` if rendering or any file write fails
pub fn write_results(
    paths: &ResultPaths,
    raw: &RawTable,
    outcome: &RunOutcome,
    emit_scores: bool,
) -> Result<(), InputError> {
    let csv = render_results_csv(raw, outcome, emit_scores)?;
    let report = outcome.summary().render_report();
    let json = outcome
        .summary()
        .to_json()
        .map_err(|e| InputError::write(paths.json.display(), e))?;

    for (path, contents) in [
        (&paths.csv, csv),
        (&paths.report, report),
        (&paths.json, json),
    ] {
        fs::write(path, contents).map_err(|e| InputError::write(path.display(), e))?;
    }

    info!(
        csv = %paths.csv.display(),
        report = %paths.report.display(),
        json = %paths.json.display(),
        "Results written"
    );
    Ok(())
}
