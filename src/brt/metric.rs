use std::fmt;
use std::str::FromStr;

/// One demographic or economic indicator tracked per ZIP code.
///
/// [`Metric::name`] is both the CSV file stem and the lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    /// Median household income.
    Income,
    Population,
    /// Median age.
    Age,
    HouseMarried,
    HouseNonfamily,
    HouseSingleMale,
    HouseSingleFemale,
    /// Share of public-transit commuters with no vehicle available.
    Car,
    /// Number of business establishments.
    Business,
}

impl Metric {
    pub const ALL: [Metric; 9] = [
        Metric::Income,
        Metric::Population,
        Metric::Age,
        Metric::HouseMarried,
        Metric::HouseNonfamily,
        Metric::HouseSingleMale,
        Metric::HouseSingleFemale,
        Metric::Car,
        Metric::Business,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Income => "income",
            Metric::Population => "pop",
            Metric::Age => "age",
            Metric::HouseMarried => "house_married",
            Metric::HouseNonfamily => "house_nonfam",
            Metric::HouseSingleMale => "house_m_single",
            Metric::HouseSingleFemale => "house_f_single",
            Metric::Car => "car",
            Metric::Business => "biz",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| s.to_string())
    }
}
