//! Extraction of one system's yearly row from the NTD tables.
//!
//! Header names drift across releases. Each canonical field has a legacy
//! spelling; when the legacy column carries a value it wins.

use tracing::{debug, warn};

use super::types::{NtdField, NtdFields, NtdSummary};
use super::utility::{mean, sample_stddev};
use crate::ntd::{NtdStore, RecordTable};
use crate::systems::{MagnitudeCorrection, System};
use crate::table::parse_number;

pub const NTD_YEARS: std::ops::RangeInclusive<u16> = 2013..=2020;

/// Factor applied to values recorded three orders of magnitude too small.
pub const MAGNITUDE_FACTOR: f64 = 1000.0;

const UNLINKED_PASSENGER_TRIPS: &str = "Unlinked Passenger Trips";
const UZA_POPULATION: (&str, &str) = ("UZA Population", "Primary UZA\n Population");
const VOMS: (&str, &str) = ("VOMS", "Mode VOMS");
const VEHICLE_REVENUE_MILES: (&str, &str) =
    ("Vehicle Revenue Miles", "Annual Vehicle Revenue Miles");

/// Header holding the agency identifier in a given release.
pub fn id_column(year: u16) -> &'static str {
    match year {
        2013 => "ID",
        2014 => "Legacy NTDID",
        _ => "Legacy NTD ID",
    }
}

/// Canonical form of an agency identifier: trimmed, integral numbers without
/// a fractional part, empty as `0`.
pub fn normalize_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "0".to_string();
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 => format!("{}", v as i64),
        _ => trimmed.to_string(),
    }
}

/// First row of `table` belonging to `ntd_id`.
fn find_row<'a>(table: &'a RecordTable, year: u16, ntd_id: &str) -> Option<&'a [String]> {
    let column = id_column(year);
    let Some(idx) = table.column(column) else {
        warn!(year, column, "Identifier column missing from NTD table");
        return None;
    };
    let wanted = normalize_id(ntd_id);
    table
        .rows()
        .iter()
        .find(|r| r.get(idx).is_some_and(|v| normalize_id(v) == wanted))
        .map(Vec::as_slice)
}

fn number(table: &RecordTable, row: &[String], column: &str) -> Option<f64> {
    table.value(row, column).and_then(parse_number)
}

/// Canonical column, overridden by the legacy column when that one is filled.
fn merged(table: &RecordTable, row: &[String], (canonical, legacy): (&str, &str)) -> Option<f64> {
    match table.value(row, legacy).filter(|v| !v.trim().is_empty()) {
        Some(v) => parse_number(v),
        None => number(table, row, canonical),
    }
}

/// Reads one year's fields for `ntd_id`. Absent rows or columns are missing.
pub fn extract_fields(table: &RecordTable, year: u16, ntd_id: &str) -> NtdFields {
    let Some(row) = find_row(table, year, ntd_id) else {
        debug!(year, ntd_id, "No NTD row for system");
        return NtdFields::default();
    };

    NtdFields {
        unlinked_passenger_trips: number(table, row, UNLINKED_PASSENGER_TRIPS),
        uza_population: merged(table, row, UZA_POPULATION),
        voms: merged(table, row, VOMS),
        vehicle_revenue_miles: merged(table, row, VEHICLE_REVENUE_MILES),
    }
}

/// Fields whose outlying years are rescaled.
pub const RESCALED_FIELDS: [NtdField; 2] = [
    NtdField::UnlinkedPassengerTrips,
    NtdField::VehicleRevenueMiles,
];

/// Rescales the years of one field that stray more than one sample standard
/// deviation from the field's own mean, in the years `policy` allows.
pub fn correct_magnitude(summary: &mut NtdSummary, policy: MagnitudeCorrection, field: NtdField) {
    let values: Vec<f64> = summary.rows.values().filter_map(|f| f.get(field)).collect();
    let Some(avg) = mean(&values) else {
        return;
    };
    let Some(sd) = sample_stddev(&values, avg) else {
        return;
    };

    for (year, fields) in summary.rows.iter_mut() {
        if !policy.applies_to(*year) {
            continue;
        }
        if let Some(v) = fields.get(field)
            && (avg - v).abs() > sd
        {
            debug!(year, ?field, value = v, mean = avg, stddev = sd, "Rescaling outlier");
            fields.set(field, Some(v * MAGNITUDE_FACTOR));
        }
    }
}

/// Builds the yearly NTD series for `system`. A year without a cached table
/// is missing rather than an error.
#[tracing::instrument(skip(store, system), fields(system = %system.name))]
pub fn aggregate_ntd(store: &NtdStore, system: &System) -> NtdSummary {
    let mut summary = NtdSummary::default();

    for year in NTD_YEARS {
        let fields = match store.for_year(year) {
            Ok(table) => extract_fields(table, year, &system.ntd_id),
            Err(e) => {
                warn!(year, error = %e, "NTD table unavailable");
                NtdFields::default()
            }
        };
        summary.rows.insert(year, fields);
    }

    for field in RESCALED_FIELDS {
        correct_magnitude(&mut summary, system.magnitude_correction, field);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPT: NtdField = NtdField::UnlinkedPassengerTrips;

    fn s(v: &str) -> String {
        v.to_string()
    }

    fn summary(values: &[(u16, f64)]) -> NtdSummary {
        NtdSummary {
            rows: values
                .iter()
                .map(|(y, v)| {
                    (
                        *y,
                        NtdFields {
                            unlinked_passenger_trips: Some(*v),
                            ..Default::default()
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("5015"), "5015");
        assert_eq!(normalize_id("5015.0"), "5015");
        assert_eq!(normalize_id(" 00007 "), "7");
        assert_eq!(normalize_id("8R01-013"), "8R01-013");
        assert_eq!(normalize_id(""), "0");
    }

    #[test]
    fn test_id_column_by_year() {
        assert_eq!(id_column(2013), "ID");
        assert_eq!(id_column(2014), "Legacy NTDID");
        assert_eq!(id_column(2019), "Legacy NTD ID");
    }

    #[test]
    fn test_extract_merges_legacy_columns() {
        let table = RecordTable::new(
            vec![
                s("Legacy NTD ID"),
                s("Unlinked Passenger Trips"),
                s("Primary UZA\n Population"),
                s("UZA Population"),
                s("Mode VOMS"),
                s("VOMS"),
                s("Annual Vehicle Revenue Miles"),
            ],
            vec![
                vec![s("6008"), s("1"), s("1"), s("1"), s("1"), s("1"), s("1")],
                vec![
                    s("5015"),
                    s("4,512,000"),
                    s("1,780,673"),
                    s(""),
                    s(""),
                    s("24"),
                    s("1,000,500"),
                ],
            ],
        );

        let fields = extract_fields(&table, 2016, "5015");
        assert_eq!(fields.unlinked_passenger_trips, Some(4_512_000.0));
        assert_eq!(fields.uza_population, Some(1_780_673.0));
        assert_eq!(fields.voms, Some(24.0));
        assert_eq!(fields.vehicle_revenue_miles, Some(1_000_500.0));
    }

    #[test]
    fn test_extract_missing_row_is_missing() {
        let table = RecordTable::new(vec![s("ID"), s("Unlinked Passenger Trips")], vec![]);
        assert_eq!(extract_fields(&table, 2013, "5015"), NtdFields::default());
    }

    #[test]
    fn test_outlier_is_multiplied_by_1000() {
        let mut data = summary(&[
            (2013, 4_000.0),
            (2014, 4_000_000.0),
            (2015, 4_100_000.0),
            (2016, 4_050_000.0),
            (2017, 3_900_000.0),
        ]);
        correct_magnitude(&mut data, MagnitudeCorrection::All, UPT);

        assert_eq!(data.rows[&2013].unlinked_passenger_trips, Some(4_000_000.0));
        assert_eq!(data.rows[&2014].unlinked_passenger_trips, Some(4_000_000.0));
        assert_eq!(data.rows[&2016].unlinked_passenger_trips, Some(4_050_000.0));
    }

    #[test]
    fn test_exempt_system_is_unchanged() {
        let values = [
            (2013, 4_000.0),
            (2014, 4_000_000.0),
            (2015, 4_100_000.0),
            (2016, 4_050_000.0),
        ];

        let mut exempt = summary(&values);
        correct_magnitude(&mut exempt, MagnitudeCorrection::None, UPT);
        assert_eq!(exempt, summary(&values));
    }

    #[test]
    fn test_cutoff_only_rescales_earlier_years() {
        let values = [
            (2013, 4_000.0),
            (2014, 4_000_000.0),
            (2015, 4_100_000.0),
            (2016, 4_050.0),
            (2017, 3_900_000.0),
            (2018, 4_000_000.0),
        ];

        let mut all = summary(&values);
        correct_magnitude(&mut all, MagnitudeCorrection::All, UPT);
        assert_eq!(all.rows[&2013].unlinked_passenger_trips, Some(4_000_000.0));
        assert_eq!(all.rows[&2016].unlinked_passenger_trips, Some(4_050_000.0));

        let mut cutoff = summary(&values);
        correct_magnitude(&mut cutoff, MagnitudeCorrection::Before(2015), UPT);
        assert_eq!(cutoff.rows[&2013].unlinked_passenger_trips, Some(4_000_000.0));
        assert_eq!(cutoff.rows[&2016].unlinked_passenger_trips, Some(4_050.0));
        assert_eq!(cutoff.rows[&2017].unlinked_passenger_trips, Some(3_900_000.0));
    }

    #[test]
    fn test_single_value_is_unchanged() {
        let mut data = summary(&[(2013, 4_000.0)]);
        correct_magnitude(&mut data, MagnitudeCorrection::All, UPT);
        assert_eq!(data.rows[&2013].unlinked_passenger_trips, Some(4_000.0));
    }

    fn ntd_sheet(id_column: &str, id: &str, trips: &str) -> RecordTable {
        RecordTable::new(
            vec![s(id_column), s("Mode"), s("Unlinked Passenger Trips")],
            vec![
                vec![s(id), s("RB"), s(trips)],
                vec![s(id), s("MB"), s("99")],
            ],
        )
    }

    #[test]
    fn test_aggregate_reads_each_year_id_column() {
        let dir = std::env::temp_dir().join(format!(
            "brt_ridership_{}_aggregate_ntd",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        let mut store = NtdStore::new(&dir).unwrap();

        store
            .store_filtered(2014, &ntd_sheet("Legacy NTDID", "1048", "4,000"))
            .unwrap();
        for year in [2015, 2016, 2017] {
            store
                .store_filtered(year, &ntd_sheet("Legacy NTD ID", "1048.0", "4,000,000"))
                .unwrap();
        }

        let hartford = System::new("hartford", &[], "1048")
            .with_magnitude_correction(MagnitudeCorrection::None);
        let exempt = aggregate_ntd(&store, &hartford);

        assert_eq!(exempt.rows.len(), NTD_YEARS.count());
        assert_eq!(exempt.rows[&2013], NtdFields::default());
        assert_eq!(exempt.rows[&2014].unlinked_passenger_trips, Some(4_000.0));
        assert_eq!(exempt.rows[&2016].unlinked_passenger_trips, Some(4_000_000.0));

        let corrected = aggregate_ntd(&store, &System::new("hartford", &[], "1048"));
        assert_eq!(
            corrected.rows[&2014].unlinked_passenger_trips,
            Some(4_000_000.0)
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
