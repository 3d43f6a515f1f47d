//! Versioned adapters for the Census tables the store reads.
//!
//! Each response carries a `response.data` array whose second row holds the
//! values for the requested ZIP code. Fields are located by position, and the
//! positions moved when the ACS subject tables were redesigned for the 2017
//! release. Any later layout change silently yields the wrong field.

use serde_json::Value;

use super::metric::Metric;

pub const CENSUS_TABLE_URL: &str = "https://data.census.gov/api/access/data/table";

/// Year range sharing one upstream response layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaEra {
    Pre2017,
    From2017,
}

impl SchemaEra {
    pub fn for_year(year: &str) -> Self {
        match year {
            "2013" | "2014" | "2015" | "2016" => SchemaEra::Pre2017,
            _ => SchemaEra::From2017,
        }
    }
}

/// A Census table queried once per year and ZIP code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CensusTable {
    /// ACS S1901, income in the past 12 months.
    Income,
    /// ACS S0101, age and sex.
    AgeAndSex,
    /// ACS S2501, occupancy characteristics.
    Occupancy,
    /// ACS S0802, means of transportation to work.
    Commuting,
    /// ZIP Business Patterns.
    BusinessPatterns,
}

impl CensusTable {
    pub fn url(self, year: &str, zip_code: &str) -> String {
        let geo = format!("860XX00US{zip_code}");
        match self {
            CensusTable::Income => format!("{CENSUS_TABLE_URL}?g={geo}&id=ACSST5Y{year}.S1901"),
            CensusTable::AgeAndSex => format!("{CENSUS_TABLE_URL}?g={geo}&id=ACSST5Y{year}.S0101"),
            CensusTable::Occupancy => format!("{CENSUS_TABLE_URL}?id=ACSST5Y{year}.S2501&g={geo}"),
            CensusTable::Commuting => format!("{CENSUS_TABLE_URL}?g={geo}&id=ACSST5Y{year}.S0802"),
            CensusTable::BusinessPatterns => {
                let short = year.get(2..).unwrap_or(year);
                format!("{CENSUS_TABLE_URL}?id=ZBP{year}.CB{short}00ZBP&g={geo}")
            }
        }
    }

    /// Position of each metric the table provides, in the given era.
    pub fn fields(self, era: SchemaEra) -> &'static [(Metric, usize)] {
        match (self, era) {
            (CensusTable::Income, _) => &[(Metric::Income, 161)],
            (CensusTable::AgeAndSex, SchemaEra::Pre2017) => {
                &[(Metric::Age, 140), (Metric::Population, 270)]
            }
            (CensusTable::AgeAndSex, SchemaEra::From2017) => {
                &[(Metric::Age, 111), (Metric::Population, 277)]
            }
            (CensusTable::Occupancy, SchemaEra::Pre2017) => &[
                (Metric::HouseMarried, 31),
                (Metric::HouseNonfamily, 11),
                (Metric::HouseSingleMale, 174),
                (Metric::HouseSingleFemale, 118),
            ],
            (CensusTable::Occupancy, SchemaEra::From2017) => &[
                (Metric::HouseMarried, 863),
                (Metric::HouseNonfamily, 346),
                (Metric::HouseSingleMale, 877),
                (Metric::HouseSingleFemale, 13),
            ],
            (CensusTable::Commuting, _) => &[(Metric::Car, 114)],
            (CensusTable::BusinessPatterns, _) => &[(Metric::Business, 15)],
        }
    }

    /// How many of the configured years the table is published for.
    pub fn year_limit(self) -> Option<usize> {
        match self {
            CensusTable::BusinessPatterns => Some(6),
            _ => None,
        }
    }

    pub fn metrics(self) -> Vec<Metric> {
        self.fields(SchemaEra::From2017)
            .iter()
            .map(|(m, _)| *m)
            .collect()
    }
}

/// Raw value at `response.data[1][offset]`, if present.
pub fn field_at(response: &Value, offset: usize) -> Option<&Value> {
    response.get("response")?.get("data")?.get(1)?.get(offset)
}

/// Numeric reading of a response field. Census cells arrive as strings
/// ("52,345", "(X)", "-") or numbers.
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => crate::table::parse_number(s),
        _ => None,
    }
}
