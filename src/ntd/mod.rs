//! National Transit Database store.
//!
//! One [`NtdStore`] holds every year's agency table, filtered to bus rapid
//! transit, and caches each as `transit_data_<year>_filtered.csv`.

pub mod archive;
mod table;

pub use archive::{ArchiveSource, FETCH_YEARS};
pub use table::RecordTable;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::DataError;
use crate::fetch::{HttpClient, fetch_bytes};
use crate::paths;

pub const MODE_COLUMN: &str = "Mode";
/// NTD mode code for bus rapid transit.
pub const BRT_MODE: &str = "RB";

pub struct NtdStore {
    dir: PathBuf,
    tables: BTreeMap<String, RecordTable>,
}

impl NtdStore {
    pub fn new(data_dir: &Path) -> Result<Self, DataError> {
        let dir = paths::ntd_dir(data_dir);
        fs::create_dir_all(&dir).map_err(|e| DataError::io(&dir, e))?;
        Ok(Self {
            dir,
            tables: BTreeMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Downloads the archive for `year`, reads `member`'s metrics sheet and
    /// stores the bus rapid transit rows.
    #[tracing::instrument(skip(self, client))]
    pub async fn fetch_year<C: HttpClient>(
        &mut self,
        client: &C,
        year: u16,
        member: &str,
    ) -> Result<&RecordTable, DataError> {
        let source = ArchiveSource::for_year(year).ok_or(DataError::UnknownYear(year))?;

        info!(url = %source.url, "Downloading NTD archive");
        let bundle = fetch_bytes(client, &source.url).await?;
        let workbook = archive::read_member(&bundle, member)?;
        let sheet = archive::read_sheet(workbook, source.sheet, source.skip_rows)?;
        info!(rows = sheet.len(), sheet = source.sheet, "Sheet read");

        self.store_filtered(year, &sheet)
    }

    /// Fetches every year in [`FETCH_YEARS`].
    pub async fn fetch_all<C: HttpClient>(&mut self, client: &C) -> Result<(), DataError> {
        for year in FETCH_YEARS {
            let Some(source) = ArchiveSource::for_year(year) else {
                continue;
            };
            self.fetch_year(client, year, &source.member).await?;
        }
        Ok(())
    }

    /// Keeps the rows of `sheet` in the bus rapid transit mode, writes them to
    /// the year's CSV and holds them in memory.
    pub fn store_filtered(
        &mut self,
        year: u16,
        sheet: &RecordTable,
    ) -> Result<&RecordTable, DataError> {
        let filtered = sheet.filter_eq(MODE_COLUMN, BRT_MODE)?;
        let name = paths::ntd_table_name(year);
        let path = self.dir.join(format!("{name}.csv"));
        filtered.write_csv(&path)?;
        info!(path = %path.display(), rows = filtered.len(), "Filtered NTD table saved");

        self.tables.insert(name.clone(), filtered);
        Ok(&self.tables[&name])
    }

    /// Loads every cached CSV in the NTD directory, keyed by file stem.
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
            let table = RecordTable::read_csv(&path)?;
            self.tables.insert(stem.to_string(), table);
            loaded += 1;
        }

        if loaded == 0 {
            warn!(dir = %self.dir.display(), "No cached NTD tables found");
        }
        info!(loaded, "Cached NTD tables loaded");
        Ok(loaded)
    }

    /// Looks a table up by file stem, e.g. `transit_data_2016_filtered`.
    pub fn get(&self, name: &str) -> Result<&RecordTable, DataError> {
        self.tables.get(name).ok_or_else(|| DataError::UnknownTable {
            owner: "NtdStore",
            name: name.to_string(),
        })
    }

    pub fn for_year(&self, year: u16) -> Result<&RecordTable, DataError> {
        self.get(&paths::ntd_table_name(year))
    }
}
