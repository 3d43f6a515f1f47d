//! Data types produced by the aggregation pipeline.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::brt::Metric;

/// Per-year averages of every metric across a system's ZIP codes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrtAverages {
    pub(crate) series: BTreeMap<Metric, BTreeMap<u16, Option<f64>>>,
}

impl BrtAverages {
    pub fn get(&self, metric: Metric, year: u16) -> Option<f64> {
        self.series.get(&metric)?.get(&year).copied().flatten()
    }

    pub fn years(&self) -> BTreeSet<u16> {
        self.series.values().flat_map(|s| s.keys().copied()).collect()
    }
}

/// Normalized NTD fields for one system and year.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NtdFields {
    pub unlinked_passenger_trips: Option<f64>,
    pub uza_population: Option<f64>,
    pub voms: Option<f64>,
    pub vehicle_revenue_miles: Option<f64>,
}

/// Selects one of the [`NtdFields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NtdField {
    UnlinkedPassengerTrips,
    UzaPopulation,
    Voms,
    VehicleRevenueMiles,
}

impl NtdFields {
    pub fn get(&self, field: NtdField) -> Option<f64> {
        match field {
            NtdField::UnlinkedPassengerTrips => self.unlinked_passenger_trips,
            NtdField::UzaPopulation => self.uza_population,
            NtdField::Voms => self.voms,
            NtdField::VehicleRevenueMiles => self.vehicle_revenue_miles,
        }
    }

    pub fn set(&mut self, field: NtdField, value: Option<f64>) {
        let slot = match field {
            NtdField::UnlinkedPassengerTrips => &mut self.unlinked_passenger_trips,
            NtdField::UzaPopulation => &mut self.uza_population,
            NtdField::Voms => &mut self.voms,
            NtdField::VehicleRevenueMiles => &mut self.vehicle_revenue_miles,
        };
        *slot = value;
    }
}

/// NTD fields for one system, keyed by year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NtdSummary {
    pub rows: BTreeMap<u16, NtdFields>,
}

impl NtdSummary {
    pub fn get(&self, year: u16) -> Option<&NtdFields> {
        self.rows.get(&year)
    }
}

/// One row of a system's merged output, and of the final dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemRecord {
    pub system: String,
    pub year: u16,

    // Census averages
    pub income: Option<f64>,
    pub pop: Option<f64>,
    pub age: Option<f64>,
    pub house_married: Option<f64>,
    pub house_nonfam: Option<f64>,
    pub house_m_single: Option<f64>,
    pub house_f_single: Option<f64>,
    pub car: Option<f64>,
    pub biz: Option<f64>,

    // NTD
    pub unlinked_passenger_trips: Option<f64>,
    pub uza_population: Option<f64>,
    pub voms: Option<f64>,
    pub vehicle_revenue_miles: Option<f64>,
}

impl SystemRecord {
    pub fn set_metric(&mut self, metric: Metric, value: Option<f64>) {
        let slot = match metric {
            Metric::Income => &mut self.income,
            Metric::Population => &mut self.pop,
            Metric::Age => &mut self.age,
            Metric::HouseMarried => &mut self.house_married,
            Metric::HouseNonfamily => &mut self.house_nonfam,
            Metric::HouseSingleMale => &mut self.house_m_single,
            Metric::HouseSingleFemale => &mut self.house_f_single,
            Metric::Car => &mut self.car,
            Metric::Business => &mut self.biz,
        };
        *slot = value;
    }

    pub fn set_ntd(&mut self, fields: &NtdFields) {
        self.unlinked_passenger_trips = fields.unlinked_passenger_trips;
        self.uza_population = fields.uza_population;
        self.voms = fields.voms;
        self.vehicle_revenue_miles = fields.vehicle_revenue_miles;
    }

    /// Applies `f` to every numeric field.
    pub fn map_values(&mut self, f: impl Fn(f64) -> f64) {
        for slot in [
            &mut self.income,
            &mut self.pop,
            &mut self.age,
            &mut self.house_married,
            &mut self.house_nonfam,
            &mut self.house_m_single,
            &mut self.house_f_single,
            &mut self.car,
            &mut self.biz,
            &mut self.unlinked_passenger_trips,
            &mut self.uza_population,
            &mut self.voms,
            &mut self.vehicle_revenue_miles,
        ] {
            *slot = slot.map(&f);
        }
    }
}
