//! CSV persistence and console output for merged records.

use std::fs::{self, File};
use std::path::Path;

use csv::WriterBuilder;
use tracing::{debug, info};

use crate::error::DataError;
use crate::process::SystemRecord;
use crate::table::MetricTable;

/// Logs a metric table using Rust's debug pretty-print format.
pub fn print_pretty(table: &MetricTable) {
    debug!("{:#?}", table);
}

/// Logs a metric table as one line per year.
pub fn print_table(name: &str, table: &MetricTable) {
    info!(table = name, zip_codes = ?table.zip_codes(), "Metric table");
    for year in table.years() {
        let cells: Vec<String> = table
            .zip_codes()
            .iter()
            .map(|z| {
                table
                    .get(year, z)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string())
            })
            .collect();
        info!(year, values = %cells.join(", "));
    }
}

/// Writes `records` to `path`, replacing any previous file.
///
/// Creates the parent directory if it does not already exist.
pub fn write_records(path: &Path, records: &[SystemRecord]) -> Result<(), DataError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
    }
    debug!(path = %path.display(), rows = records.len(), "Writing records");

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| DataError::csv(path, e))?;

    for record in records {
        writer
            .serialize(record)
            .map_err(|e| DataError::csv(path, e))?;
    }
    writer.flush().map_err(|e| DataError::io(path, e))?;

    Ok(())
}

pub fn read_records(path: &Path) -> Result<Vec<SystemRecord>, DataError> {
    let file = File::open(path).map_err(|e| DataError::io(path, e))?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: SystemRecord = result.map_err(|e| DataError::csv(path, e))?;
        rows.push(record);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir()
            .join(format!("brt_ridership_{}", std::process::id()))
            .join(name)
    }

    fn record(year: u16, trips: Option<f64>) -> SystemRecord {
        SystemRecord {
            system: "cleveland".to_string(),
            year,
            income: Some(31000.5),
            unlinked_passenger_trips: trips,
            ..Default::default()
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        let table = MetricTable::empty(&["2013".to_string()], &["44112".to_string()]);
        print_pretty(&table);
        print_table("income", &table);
    }

    #[test]
    fn test_write_records_creates_parent_and_header() {
        let path = temp_path("nested/records.csv");
        let _ = fs::remove_file(&path);

        write_records(&path, &[record(2013, Some(10.0))]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("system,year,income,pop"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_values_survive_reload() {
        let path = temp_path("records_reload.csv");
        let records = vec![record(2013, Some(10.0)), record(2014, None)];

        write_records(&path, &records).unwrap();
        let loaded = read_records(&path).unwrap();

        assert_eq!(loaded, records);
        fs::remove_file(&path).unwrap();
    }
}
