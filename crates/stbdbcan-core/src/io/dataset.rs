//! Dataset CSV loading.
//!
//! The header must name the id column, the timestamp column and every
//! configured behavioral column; other columns are carried through to the
//! results file untouched.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::config::InputConfig;
use crate::error::InputError;
use crate::types::{Dataset, EntityId};

/// Naive timestamp layouts accepted besides RFC 3339 and Unix seconds.
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// The CSV as read, kept for writing results back in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Header fields.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows, index = observation row number.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// A dataset together with the raw rows it was parsed from.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    /// Parsed observations (raw, unscaled values).
    pub dataset: Dataset,
    /// Raw CSV content.
    pub raw: RawTable,
}

/// Load the dataset CSV at `path`.
///
/// # Errors
///
/// - `InputError::Io` if the file cannot be opened
/// - Any error of [`read_dataset`]
pub fn load_dataset(path: &Path, input: &InputConfig) -> Result<LoadedDataset, InputError> {
    let file = File::open(path).map_err(|e| InputError::io(path.display(), e))?;
    let loaded = read_dataset(file, &path.display().to_string(), input)?;
    info!(
        path = %path.display(),
        observations = loaded.dataset.len(),
        entities = loaded.dataset.entities().len(),
        dimension = loaded.dataset.dimension(),
        "Dataset loaded"
    );
    Ok(loaded)
}

/// Parse a dataset CSV from any reader. `source` names it in errors.
///
/// # Errors
///
/// - `InputError::MissingColumn` if the id or timestamp column is absent
/// - `InputError::UnknownAttribute` if a behavioral column is absent
/// - `InputError::ColumnCount` if a row has a different width than the header
/// - `InputError::InvalidNumber` / `InputError::InvalidTimestamp` for bad fields
/// - `InputError::EmptyDataset` if there are no data rows
pub fn read_dataset<R: Read>(
    reader: R,
    source: &str,
    input: &InputConfig,
) -> Result<LoadedDataset, InputError> {
    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let header = csv.headers().map_err(|e| InputError::csv(source, e))?.clone();
    let headers: Vec<String> = header.iter().map(str::to_string).collect();

    let column = |name: &str| headers.iter().position(|h| h == name);
    let id_col = column(&input.id_column).ok_or_else(|| InputError::MissingColumn {
        path: source.to_string(),
        column: input.id_column.clone(),
    })?;
    let ts_col = column(&input.timestamp_column).ok_or_else(|| InputError::MissingColumn {
        path: source.to_string(),
        column: input.timestamp_column.clone(),
    })?;
    let behavior_cols: Vec<usize> = input
        .behavioral
        .iter()
        .map(|name| {
            column(name).ok_or_else(|| InputError::UnknownAttribute { name: name.clone() })
        })
        .collect::<Result<_, _>>()?;

    let mut dataset = Dataset::new(input.behavioral.clone());
    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    let mut row = 0usize;

    while csv
        .read_record(&mut record)
        .map_err(|e| InputError::csv(source, e))?
    {
        row += 1;
        if record.len() != headers.len() {
            return Err(InputError::ColumnCount {
                path: source.to_string(),
                row,
                expected: headers.len(),
                found: record.len(),
            });
        }

        let entity = EntityId::parse(&record[id_col]);
        let raw_ts = &record[ts_col];
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| InputError::InvalidTimestamp {
            path: source.to_string(),
            row,
            value: raw_ts.to_string(),
        })?;
        let behavior = behavior_cols
            .iter()
            .zip(&input.behavioral)
            .map(|(&col, name)| parse_finite(&record[col], source, row, name))
            .collect::<Result<Vec<f64>, _>>()?;

        dataset.push(entity, timestamp, behavior)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    if dataset.is_empty() {
        return Err(InputError::EmptyDataset);
    }
    debug!(source, rows = row, "Dataset rows parsed");

    Ok(LoadedDataset {
        dataset,
        raw: RawTable { headers, rows },
    })
}

pub(crate) fn parse_finite(
    raw: &str,
    source: &str,
    row: usize,
    column: &str,
) -> Result<f64, InputError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(InputError::InvalidNumber {
            path: source.to_string(),
            row,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Parse a timestamp: RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD HH:MM`, or integer Unix seconds. Naive forms are taken as UTC.
///
/// # Example
///
/// ```
/// use stbdbcan_core::io::parse_timestamp;
///
/// let a = parse_timestamp("2024-03-01 08:15:00").unwrap();
/// let b = parse_timestamp("2024-03-01T08:15:00Z").unwrap();
/// assert_eq!(a, b);
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn input(behavioral: &[&str]) -> InputConfig {
        InputConfig {
            behavioral: behavioral.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_read_dataset_keeps_rows_and_extra_columns() {
        let csv = "id,timestamp,flow,speed,note\n\
                   1,2024-01-01 08:00:00,120,55.5,a\n\
                   S2,2024-01-01 08:05:00,80,61,b\n\
                   1,1704096600,100,58,c\n";
        let loaded = read_dataset(csv.as_bytes(), "mem.csv", &input(&["speed", "flow"])).unwrap();

        assert_eq!(loaded.dataset.len(), 3);
        assert_eq!(loaded.dataset.entities().len(), 2);
        assert_eq!(loaded.dataset.get(0).behavior(), &[55.5, 120.0]);
        assert_eq!(loaded.dataset.entity_of(1), &EntityId::Named("S2".into()));
        assert_eq!(
            loaded.dataset.get(2).timestamp(),
            Utc.with_ymd_and_hms(2024, 1, 1, 8, 10, 0).unwrap()
        );
        assert_eq!(loaded.raw.headers().len(), 5);
        assert_eq!(loaded.raw.rows()[1][4], "b");

        println!("[PASS] test_read_dataset_keeps_rows_and_extra_columns");
    }

    #[test]
    fn test_zero_padded_id_is_a_separate_entity() {
        let csv = "id,timestamp,flow\n7,2024-01-01 08:00:00,1\n07,2024-01-01 08:00:00,2\n";
        let loaded = read_dataset(csv.as_bytes(), "mem.csv", &input(&["flow"])).unwrap();

        assert_eq!(loaded.dataset.entities().len(), 2);
        assert_ne!(loaded.dataset.get(0).entity(), loaded.dataset.get(1).entity());
        assert_eq!(loaded.dataset.entity_of(1).to_string(), "07");
    }

    #[test]
    fn test_unknown_attribute() {
        let csv = "id,timestamp,flow\n1,2024-01-01 08:00:00,1\n";
        let err = read_dataset(csv.as_bytes(), "mem.csv", &input(&["speed"])).unwrap_err();
        assert!(matches!(err, InputError::UnknownAttribute { ref name } if name == "speed"));
    }

    #[test]
    fn test_missing_timestamp_column() {
        let csv = "id,time,flow\n1,2024-01-01 08:00:00,1\n";
        let err = read_dataset(csv.as_bytes(), "mem.csv", &input(&["flow"])).unwrap_err();
        assert!(matches!(err, InputError::MissingColumn { ref column, .. } if column == "timestamp"));
    }

    #[test]
    fn test_wrong_column_count() {
        let csv = "id,timestamp,flow\n1,2024-01-01 08:00:00,1\n2,2024-01-01 08:00:00\n";
        let err = read_dataset(csv.as_bytes(), "mem.csv", &input(&["flow"])).unwrap_err();
        assert!(matches!(
            err,
            InputError::ColumnCount {
                row: 2,
                expected: 3,
                found: 2,
                ..
            }
        ));
        println!("[PASS] test_wrong_column_count - {}", err);
    }

    #[test]
    fn test_bad_number_and_timestamp() {
        let csv = "id,timestamp,flow\n1,2024-01-01 08:00:00,fast\n";
        let err = read_dataset(csv.as_bytes(), "mem.csv", &input(&["flow"])).unwrap_err();
        assert!(matches!(err, InputError::InvalidNumber { row: 1, .. }));

        let csv = "id,timestamp,flow\n1,2024-01-01 08:00:00,NaN\n";
        assert!(read_dataset(csv.as_bytes(), "mem.csv", &input(&["flow"])).is_err());

        let csv = "id,timestamp,flow\n1,01/02/2024,1\n";
        let err = read_dataset(csv.as_bytes(), "mem.csv", &input(&["flow"])).unwrap_err();
        assert!(matches!(err, InputError::InvalidTimestamp { row: 1, .. }));
    }

    #[test]
    fn test_empty_dataset() {
        let csv = "id,timestamp,flow\n";
        let err = read_dataset(csv.as_bytes(), "mem.csv", &input(&["flow"])).unwrap_err();
        assert!(matches!(err, InputError::EmptyDataset));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 8, 15, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01 08:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T08:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 08:15"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T09:15:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("1709280900"), Some(expected));
        assert_eq!(parse_timestamp(""), None);
    }
}
