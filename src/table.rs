//! Year × ZIP-code tables and their CSV persistence.
//!
//! The first CSV column holds the year; every other column is one ZIP code.
//! Empty cells are missing values.

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use crate::error::DataError;

/// One metric for one system: rows are years, columns are ZIP codes.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable {
    years: Vec<String>,
    zip_codes: Vec<String>,
    /// Row-major, `years.len() * zip_codes.len()` cells.
    cells: Vec<Option<f64>>,
}

impl MetricTable {
    /// Creates a table covering `years` × `zip_codes` with every cell missing.
    pub fn empty(years: &[String], zip_codes: &[String]) -> Self {
        Self {
            years: years.to_vec(),
            zip_codes: zip_codes.to_vec(),
            cells: vec![None; years.len() * zip_codes.len()],
        }
    }

    pub fn years(&self) -> &[String] {
        &self.years
    }

    pub fn zip_codes(&self) -> &[String] {
        &self.zip_codes
    }

    fn position(&self, year: &str, zip_code: &str) -> Option<usize> {
        let row = self.years.iter().position(|y| y == year)?;
        let col = self.zip_codes.iter().position(|z| z == zip_code)?;
        Some(row * self.zip_codes.len() + col)
    }

    pub fn get(&self, year: &str, zip_code: &str) -> Option<f64> {
        self.position(year, zip_code).and_then(|i| self.cells[i])
    }

    /// Sets a cell. Returns `false` when the year or ZIP code is not part of
    /// the table.
    pub fn set(&mut self, year: &str, zip_code: &str, value: Option<f64>) -> bool {
        match self.position(year, zip_code) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    /// Values of one ZIP code column, in year order.
    pub fn column(&self, col: usize) -> Vec<Option<f64>> {
        let width = self.zip_codes.len();
        (0..self.years.len())
            .map(|row| self.cells[row * width + col])
            .collect()
    }

    pub fn count_present(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Writes the table with a `year` index column.
    pub fn write_csv(&self, path: &Path) -> Result<(), DataError> {
        let mut writer = WriterBuilder::new()
            .from_path(path)
            .map_err(|e| DataError::csv(path, e))?;

        let mut header = vec!["year".to_string()];
        header.extend(self.zip_codes.iter().cloned());
        writer
            .write_record(&header)
            .map_err(|e| DataError::csv(path, e))?;

        let width = self.zip_codes.len();
        for (row, year) in self.years.iter().enumerate() {
            let mut record = vec![year.clone()];
            record.extend(
                self.cells[row * width..(row + 1) * width]
                    .iter()
                    .map(|c| c.map(|v| v.to_string()).unwrap_or_default()),
            );
            writer
                .write_record(&record)
                .map_err(|e| DataError::csv(path, e))?;
        }

        writer.flush().map_err(|e| DataError::io(path, e))?;
        debug!(path = %path.display(), rows = self.years.len(), "Metric table written");
        Ok(())
    }

    /// Reads a table written by [`MetricTable::write_csv`] (or any CSV whose
    /// first column is the year, whatever its header says).
    pub fn read_csv(path: &Path) -> Result<Self, DataError> {
        let file = File::open(path).map_err(|e| DataError::io(path, e))?;
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);

        let zip_codes: Vec<String> = reader
            .headers()
            .map_err(|e| DataError::csv(path, e))?
            .iter()
            .skip(1)
            .map(|h| h.trim().to_string())
            .collect();

        let mut years = Vec::new();
        let mut cells = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| DataError::csv(path, e))?;
            let mut fields = record.iter();
            let Some(year) = fields.next() else {
                continue;
            };
            years.push(year.trim().to_string());
            let mut values: Vec<Option<f64>> = fields.map(parse_number).collect();
            values.resize(zip_codes.len(), None);
            cells.extend(values);
        }

        Ok(Self {
            years,
            zip_codes,
            cells,
        })
    }
}

/// Parses a numeric cell, tolerating thousands separators. Anything else
/// (empty, `N`, `-`, `(X)`, `250,000+`) is missing.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
