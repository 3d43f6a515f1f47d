use std::path::Path;

use tracing::{info, warn};

use super::types::SystemRecord;
use crate::error::DataError;
use crate::output::{read_records, write_records};
use crate::paths;
use crate::systems::System;

/// Concatenates the merged tables of `systems` into `dataset.csv`, keeping
/// only rows with a ridership figure. Systems without a merged table are
/// skipped.
#[tracing::instrument(skip_all, fields(systems = systems.len()))]
pub fn build_dataset(data_dir: &Path, systems: &[&System]) -> Result<Vec<SystemRecord>, DataError> {
    let mut rows = Vec::new();

    for system in systems {
        let path = paths::processed_path(data_dir, &system.name);
        if !path.exists() {
            warn!(system = %system.name, path = %path.display(), "No merged table, skipping");
            continue;
        }

        let mut records = read_records(&path)?;
        let before = records.len();
        records.retain(|r| r.unlinked_passenger_trips.is_some());
        info!(
            system = %system.name,
            kept = records.len(),
            dropped = before - records.len(),
            "Merged table loaded"
        );
        rows.extend(records);
    }

    let path = paths::dataset_path(data_dir);
    write_records(&path, &rows)?;
    info!(path = %path.display(), rows = rows.len(), "Dataset exported");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_data_dir(name: &str) -> std::path::PathBuf {
        let dir = env::temp_dir().join(format!("brt_ridership_{}_{}", std::process::id(), name));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn rows(system: &str, trips: [Option<f64>; 2]) -> Vec<SystemRecord> {
        trips
            .iter()
            .enumerate()
            .map(|(i, t)| SystemRecord {
                system: system.to_string(),
                year: 2013 + i as u16,
                unlinked_passenger_trips: *t,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_rows_without_ridership_are_dropped() {
        let data_dir = temp_data_dir("dataset");
        write_records(
            &paths::processed_path(&data_dir, "cleveland"),
            &rows("cleveland", [Some(10.0), None]),
        )
        .unwrap();
        write_records(
            &paths::processed_path(&data_dir, "houston"),
            &rows("houston", [None, Some(20.0)]),
        )
        .unwrap();

        let cleveland = System::new("cleveland", &[], "5015");
        let houston = System::new("houston", &[], "6008");
        let dataset = build_dataset(&data_dir, &[&cleveland, &houston]).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset[0].unlinked_passenger_trips, Some(10.0));
        assert_eq!(dataset[1].system, "houston");
        assert_eq!(read_records(&paths::dataset_path(&data_dir)).unwrap(), dataset);
    }

    #[test]
    fn test_missing_system_table_is_skipped() {
        let data_dir = temp_data_dir("dataset_missing");
        let eugene = System::new("eugene", &[], "7");
        let dataset = build_dataset(&data_dir, &[&eugene]).unwrap();
        assert!(dataset.is_empty());
        assert!(paths::dataset_path(&data_dir).exists());
    }
}
