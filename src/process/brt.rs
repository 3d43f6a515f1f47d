use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::types::BrtAverages;
use super::utility::mean;
use crate::brt::{BrtStore, Metric};
use crate::table::MetricTable;

/// Columns where more than this share of years is exactly zero are dropped.
pub const MAX_ZERO_SHARE: f64 = 0.25;

/// Whether a ZIP code column survives cleaning.
///
/// Dropped when every value is missing, when any value is negative (Census
/// sentinels such as `-666666666`), or when more than [`MAX_ZERO_SHARE`] of
/// its rows are zero. The zero share counts missing rows in the denominator.
pub fn keep_column(values: &[Option<f64>]) -> bool {
    if values.iter().all(Option::is_none) {
        return false;
    }
    if values.iter().flatten().any(|v| *v < 0.0) {
        return false;
    }
    let zeros = values.iter().filter(|v| **v == Some(0.0)).count();
    zeros as f64 / values.len() as f64 <= MAX_ZERO_SHARE
}

/// Per-year mean of the columns of `table` that survive [`keep_column`].
pub fn average_table(table: &MetricTable) -> BTreeMap<u16, Option<f64>> {
    let columns: Vec<Vec<Option<f64>>> = (0..table.zip_codes().len())
        .map(|c| table.column(c))
        .filter(|values| keep_column(values))
        .collect();
    debug!(
        kept = columns.len(),
        dropped = table.zip_codes().len() - columns.len(),
        "Columns cleaned"
    );

    let mut series = BTreeMap::new();
    for (row, year) in table.years().iter().enumerate() {
        let Ok(year) = year.parse::<u16>() else {
            warn!(year, "Skipping row with a non-numeric year");
            continue;
        };
        let values: Vec<f64> = columns.iter().filter_map(|c| c[row]).collect();
        series.insert(year, mean(&values));
    }
    series
}

/// Averages every metric of `store` across its ZIP codes.
#[tracing::instrument(skip(store), fields(system = store.system()))]
pub fn aggregate_brt(store: &BrtStore) -> BrtAverages {
    let series = Metric::ALL
        .into_iter()
        .map(|metric| (metric, average_table(store.table(metric))))
        .collect();
    BrtAverages { series }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[(&str, &[Option<f64>])]) -> MetricTable {
        let years: Vec<String> = (2013..2013 + columns[0].1.len() as u16)
            .map(|y| y.to_string())
            .collect();
        let zips: Vec<String> = columns.iter().map(|(z, _)| z.to_string()).collect();
        let mut t = MetricTable::empty(&years, &zips);
        for (zip, values) in columns {
            for (year, value) in years.iter().zip(values.iter()) {
                t.set(year, zip, *value);
            }
        }
        t
    }

    #[test]
    fn test_negative_value_drops_whole_column() {
        assert!(!keep_column(&[Some(10.0), Some(-666666666.0), Some(12.0), Some(11.0)]));
    }

    #[test]
    fn test_zero_share_threshold() {
        // exactly 25% zeros is kept, more is dropped
        assert!(keep_column(&[Some(0.0), Some(1.0), Some(2.0), Some(3.0)]));
        assert!(!keep_column(&[Some(0.0), Some(0.0), Some(2.0), Some(3.0)]));
        // missing rows still count toward the denominator
        assert!(!keep_column(&[Some(0.0), Some(5.0), None]));
    }

    #[test]
    fn test_all_missing_column_is_dropped() {
        assert!(!keep_column(&[None, None, None, None]));
        assert!(!keep_column(&[]));
    }

    #[test]
    fn test_single_zip_average_is_the_value() {
        let t = table(&[("11111", &[Some(50000.0)])]);
        let series = average_table(&t);
        assert_eq!(series.get(&2013), Some(&Some(50000.0)));
    }

    #[test]
    fn test_average_skips_dropped_and_missing() {
        let t = table(&[
            ("11111", &[Some(10.0), Some(20.0), None, Some(40.0)]),
            ("22222", &[Some(30.0), None, None, Some(60.0)]),
            ("33333", &[Some(-1.0), Some(1000.0), Some(1000.0), Some(1000.0)]),
            ("44444", &[None, None, None, None]),
        ]);
        let series = average_table(&t);
        assert_eq!(series[&2013], Some(20.0));
        assert_eq!(series[&2014], Some(20.0));
        assert_eq!(series[&2015], None);
        assert_eq!(series[&2016], Some(50.0));
    }
}
