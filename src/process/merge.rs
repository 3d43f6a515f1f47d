use std::path::{Path, PathBuf};

use tracing::info;

use super::types::{BrtAverages, NtdSummary, SystemRecord};
use super::utility::round2;
use crate::brt::Metric;
use crate::error::DataError;
use crate::output::write_records;
use crate::paths;

/// Joins the Census averages and NTD fields of one system by year, rounded
/// to two decimals. Years present on either side appear in the output.
pub fn merge_system(system: &str, brt: &BrtAverages, ntd: &NtdSummary) -> Vec<SystemRecord> {
    let mut years = brt.years();
    years.extend(ntd.rows.keys().copied());

    years
        .into_iter()
        .map(|year| {
            let mut record = SystemRecord {
                system: system.to_string(),
                year,
                ..Default::default()
            };
            for metric in Metric::ALL {
                record.set_metric(metric, brt.get(metric, year));
            }
            if let Some(fields) = ntd.get(year) {
                record.set_ntd(fields);
            }
            record.map_values(round2);
            record
        })
        .collect()
}

/// Writes a system's merged rows to `processed/<system>.csv`.
pub fn export_system(
    data_dir: &Path,
    system: &str,
    records: &[SystemRecord],
) -> Result<PathBuf, DataError> {
    let path = paths::processed_path(data_dir, system);
    write_records(&path, records)?;
    info!(path = %path.display(), rows = records.len(), "Merged table exported");
    Ok(path)
}
