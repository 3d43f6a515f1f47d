//! Cleaning, aggregation and merging of the cached data.
//!
//! Census metrics are averaged across a system's ZIP codes, the system's NTD
//! row is normalized per year, and both are joined into one table per
//! system. The per-system tables are finally concatenated into the dataset.

pub mod brt;
pub mod dataset;
pub mod merge;
pub mod ntd;
pub mod types;
pub mod utility;

pub use brt::aggregate_brt;
pub use dataset::build_dataset;
pub use merge::{export_system, merge_system};
pub use ntd::aggregate_ntd;
pub use types::{BrtAverages, NtdField, NtdFields, NtdSummary, SystemRecord};

use std::path::Path;

use crate::brt::BrtStore;
use crate::error::DataError;
use crate::ntd::NtdStore;
use crate::systems::System;

/// Aggregates both stores for `system`, merges them and exports the result.
pub fn process_system(
    data_dir: &Path,
    brt: &BrtStore,
    ntd: &NtdStore,
    system: &System,
) -> Result<Vec<SystemRecord>, DataError> {
    let averages = aggregate_brt(brt);
    let summary = aggregate_ntd(ntd, system);
    let records = merge_system(&system.name, &averages, &summary);
    export_system(data_dir, &system.name, &records)?;
    Ok(records)
}
