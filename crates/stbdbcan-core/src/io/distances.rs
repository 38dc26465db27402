//! Spatial distance table CSV loading (`id1,id2,dist`).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::info;

use crate::distance::SpatialDistanceTable;
use crate::error::InputError;
use crate::types::EntityId;

use super::dataset::parse_finite;

const COLUMNS: [&str; 3] = ["id1", "id2", "dist"];

/// Load the distance table CSV at `path`.
///
/// # Errors
///
/// - `InputError::Io` if the file cannot be opened
/// - Any error of [`read_distances`]
pub fn load_distances(path: &Path) -> Result<SpatialDistanceTable, InputError> {
    let file = File::open(path).map_err(|e| InputError::io(path.display(), e))?;
    let table = read_distances(file, &path.display().to_string())?;
    info!(path = %path.display(), pairs = table.len(), "Distance table loaded");
    Ok(table)
}

/// Parse a distance table from any reader. `source` names it in errors.
///
/// # Errors
///
/// - `InputError::MissingColumn` if `id1`, `id2` or `dist` is absent
/// - `InputError::ColumnCount` if a row has a different width than the header
/// - `InputError::InvalidNumber` if `dist` is not a finite number
/// - `InputError::PairOrder`, `InputError::DuplicatePair`,
///   `InputError::InvalidDistance` from [`SpatialDistanceTable::insert`]
pub fn read_distances<R: Read>(reader: R, source: &str) -> Result<SpatialDistanceTable, InputError> {
    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let header = csv.headers().map_err(|e| InputError::csv(source, e))?.clone();
    let mut positions = [0usize; 3];
    for (slot, name) in positions.iter_mut().zip(COLUMNS) {
        *slot = header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| InputError::MissingColumn {
                path: source.to_string(),
                column: name.to_string(),
            })?;
    }
    let [id1_col, id2_col, dist_col] = positions;

    let mut table = SpatialDistanceTable::new();
    let mut record = StringRecord::new();
    let mut row = 0usize;

    while csv
        .read_record(&mut record)
        .map_err(|e| InputError::csv(source, e))?
    {
        row += 1;
        if record.len() != header.len() {
            return Err(InputError::ColumnCount {
                path: source.to_string(),
                row,
                expected: header.len(),
                found: record.len(),
            });
        }
        let dist = parse_finite(&record[dist_col], source, row, "dist")?;
        table.insert(
            EntityId::parse(&record[id1_col]),
            EntityId::parse(&record[id2_col]),
            dist,
        )?;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_distances() {
        let csv = "id1,id2,dist\n1,2,10.5\n1,3,4\n2,S1,7\n";
        let table = read_distances(csv.as_bytes(), "d.csv").unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup(&EntityId::from(2), &EntityId::from(1)).unwrap(), 10.5);
        assert_eq!(
            table
                .lookup(&EntityId::Named("S1".into()), &EntityId::from(2))
                .unwrap(),
            7.0
        );
        assert!(table.lookup(&EntityId::from(2), &EntityId::from(3)).is_err());
        println!("[PASS] test_read_distances - {} pairs", table.len());
    }

    #[test]
    fn test_numeric_ids_compare_numerically() {
        // "10" > "9" numerically even though it sorts first as text
        let csv = "id1,id2,dist\n9,10,1\n";
        assert!(read_distances(csv.as_bytes(), "d.csv").is_ok());

        let csv = "id1,id2,dist\n10,9,1\n";
        let err = read_distances(csv.as_bytes(), "d.csv").unwrap_err();
        assert!(matches!(err, InputError::PairOrder { .. }));
    }

    #[test]
    fn test_rejects_bad_rows() {
        let err = read_distances("id1,id2,dist\n1,2,-3\n".as_bytes(), "d.csv").unwrap_err();
        assert!(matches!(err, InputError::InvalidDistance { .. }));

        let err = read_distances("id1,id2,dist\n1,2,3\n1,2,4\n".as_bytes(), "d.csv").unwrap_err();
        assert!(matches!(err, InputError::DuplicatePair { .. }));

        let err = read_distances("id1,id2,dist\n1,2,far\n".as_bytes(), "d.csv").unwrap_err();
        assert!(matches!(err, InputError::InvalidNumber { .. }));

        let err = read_distances("a,b,dist\n1,2,3\n".as_bytes(), "d.csv").unwrap_err();
        assert!(matches!(err, InputError::MissingColumn { ref column, .. } if column == "id1"));
    }
}
