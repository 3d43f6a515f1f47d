//! Per-system store of Census metrics.
//!
//! A [`BrtStore`] owns one [`MetricTable`] per [`Metric`], fills them from
//! the Census table API one request per year and ZIP code, and caches each
//! table as `<metric>.csv` in the system's raw directory.

mod metric;
pub mod schema;

pub use metric::Metric;
pub use schema::{CensusTable, SchemaEra};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::DataError;
use crate::fetch::{HttpClient, fetch_json};
use crate::paths;
use crate::systems::System;
use crate::table::MetricTable;

/// Pause between year batches when nothing else is configured.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(5);

/// The ACS 5-year releases covered by the dataset.
pub fn default_years() -> Vec<String> {
    (2013..=2020).map(|y| y.to_string()).collect()
}

pub struct BrtStore {
    system: String,
    zip_codes: Vec<String>,
    years: Vec<String>,
    dir: PathBuf,
    request_delay: Duration,
    tables: BTreeMap<Metric, MetricTable>,
}

impl BrtStore {
    /// Creates the store for `system` with empty tables, creating its cache
    /// directory under `data_dir` if needed.
    pub fn new(system: &System, data_dir: &Path) -> Result<Self, DataError> {
        Self::with_years(system, data_dir, default_years())
    }

    pub fn with_years(
        system: &System,
        data_dir: &Path,
        years: Vec<String>,
    ) -> Result<Self, DataError> {
        let dir = paths::system_dir(data_dir, &system.name);
        fs::create_dir_all(&dir).map_err(|e| DataError::io(&dir, e))?;

        let tables = Metric::ALL
            .into_iter()
            .map(|m| (m, MetricTable::empty(&years, &system.zip_codes)))
            .collect();

        Ok(Self {
            system: system.name.clone(),
            zip_codes: system.zip_codes.clone(),
            years,
            dir,
            request_delay: DEFAULT_REQUEST_DELAY,
            tables,
        })
    }

    /// Sets the courtesy pause taken after each year's batch of requests.
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn fetch_income<C: HttpClient>(&mut self, client: &C) -> Result<(), DataError> {
        self.fetch_table(client, CensusTable::Income).await
    }

    pub async fn fetch_population_and_age<C: HttpClient>(
        &mut self,
        client: &C,
    ) -> Result<(), DataError> {
        self.fetch_table(client, CensusTable::AgeAndSex).await
    }

    pub async fn fetch_household<C: HttpClient>(&mut self, client: &C) -> Result<(), DataError> {
        self.fetch_table(client, CensusTable::Occupancy).await
    }

    pub async fn fetch_car_ownership<C: HttpClient>(
        &mut self,
        client: &C,
    ) -> Result<(), DataError> {
        self.fetch_table(client, CensusTable::Commuting).await
    }

    /// Business counts are only published for the first six years.
    pub async fn fetch_business_count<C: HttpClient>(
        &mut self,
        client: &C,
    ) -> Result<(), DataError> {
        self.fetch_table(client, CensusTable::BusinessPatterns).await
    }

    /// Fills every metric `table` provides, then writes those metrics to CSV.
    ///
    /// Empty responses and unreadable fields leave their cells missing. A
    /// malformed body or a transport failure aborts the whole fetch.
    #[tracing::instrument(skip(self, client), fields(system = %self.system))]
    pub async fn fetch_table<C: HttpClient>(
        &mut self,
        client: &C,
        table: CensusTable,
    ) -> Result<(), DataError> {
        let limit = table.year_limit().unwrap_or(self.years.len());
        let years: Vec<String> = self.years.iter().take(limit).cloned().collect();

        for year in &years {
            let fields = table.fields(SchemaEra::for_year(year));

            for zip_code in &self.zip_codes {
                let url = table.url(year, zip_code);
                let Some(response) = fetch_json(client, &url).await? else {
                    debug!(year, zip_code, "Empty response, leaving cells missing");
                    continue;
                };

                for (metric, offset) in fields {
                    let value = schema::field_at(&response, *offset).and_then(schema::numeric);
                    if value.is_none() {
                        warn!(year, zip_code, %metric, offset, "No numeric value at field");
                    }
                    if let Some(t) = self.tables.get_mut(metric) {
                        t.set(year, zip_code, value);
                    }
                }
            }

            info!(year, zip_codes = self.zip_codes.len(), "Year fetched");
            if !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
        }

        for metric in table.metrics() {
            self.persist(metric)?;
        }
        Ok(())
    }

    /// Writes one metric table to `<metric>.csv`.
    pub fn persist(&self, metric: Metric) -> Result<(), DataError> {
        let path = self.dir.join(format!("{}.csv", metric.name()));
        self.table(metric).write_csv(&path)?;
        info!(path = %path.display(), %metric, "Metric table saved");
        Ok(())
    }

    /// Replaces tables with the CSVs cached in the store directory.
    ///
    /// Loaded columns are trusted as persisted; a difference from the
    /// configured ZIP codes is only logged. Returns how many tables were
    /// loaded.
    pub fn load_existing(&mut self) -> Result<usize, DataError> {
        let mut loaded = 0;

        for entry in fs::read_dir(&self.dir).map_err(|e| DataError::io(&self.dir, e))? {
            let path = entry.map_err(|e| DataError::io(&self.dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Ok(metric) = stem.parse::<Metric>() else {
                warn!(path = %path.display(), "Skipping CSV that names no metric");
                continue;
            };

            let table = MetricTable::read_csv(&path)?;
            if table.zip_codes() != self.zip_codes.as_slice() {
                warn!(
                    %metric,
                    persisted = ?table.zip_codes(),
                    configured = ?self.zip_codes,
                    "Cached ZIP codes differ from configuration"
                );
            }
            debug!(%metric, years = table.years().len(), "Loaded cached table");
            self.tables.insert(metric, table);
            loaded += 1;
        }

        info!(system = %self.system, loaded, "Cached metric tables loaded");
        Ok(loaded)
    }

    /// Looks a table up by its metric name (`income`, `pop`, ...).
    pub fn get(&self, name: &str) -> Result<&MetricTable, DataError> {
        let metric = name.parse::<Metric>().map_err(|name| DataError::UnknownTable {
            owner: "BrtStore",
            name,
        })?;
        Ok(self.table(metric))
    }

    pub fn table(&self, metric: Metric) -> &MetricTable {
        &self.tables[&metric]
    }
}
