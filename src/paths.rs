//! Canonical file locations under the data directory.
//!
//! ```text
//! <data>/raw/<system>/<metric>.csv
//! <data>/raw/ntd-ridership/transit_data_<year>_filtered.csv
//! <data>/processed/<system>.csv
//! <data>/dataset.csv
//! ```

use std::path::{Path, PathBuf};

pub fn raw_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("raw")
}

/// Cache directory for one system's metric tables.
pub fn system_dir(data_dir: &Path, system: &str) -> PathBuf {
    raw_dir(data_dir).join(system)
}

pub fn ntd_dir(data_dir: &Path) -> PathBuf {
    raw_dir(data_dir).join("ntd-ridership")
}

pub fn processed_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("processed")
}

/// Merged per-system output.
pub fn processed_path(data_dir: &Path, system: &str) -> PathBuf {
    processed_dir(data_dir).join(format!("{system}.csv"))
}

pub fn dataset_path(data_dir: &Path) -> PathBuf {
    data_dir.join("dataset.csv")
}

/// File stem of the filtered NTD table for `year`.
pub fn ntd_table_name(year: u16) -> String {
    format!("transit_data_{year}_filtered")
}
