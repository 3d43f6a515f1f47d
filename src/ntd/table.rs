use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::DataError;

/// Untyped rows from one NTD spreadsheet, kept as text.
///
/// Column names drift between yearly releases, so lookups are by header name
/// at the point of use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RecordTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell of `row` under header `name`, if both exist.
    pub fn value<'a>(&'a self, row: &'a [String], name: &str) -> Option<&'a str> {
        self.column(name)
            .and_then(|i| row.get(i))
            .map(String::as_str)
    }

    /// Rows whose `column` equals `value` exactly.
    pub fn filter_eq(&self, column: &str, value: &str) -> Result<RecordTable, DataError> {
        let idx = self.column(column).ok_or_else(|| DataError::MissingColumn {
            column: column.to_string(),
            context: "NTD sheet".to_string(),
        })?;

        let rows = self
            .rows
            .iter()
            .filter(|r| r.get(idx).map(String::as_str) == Some(value))
            .cloned()
            .collect();

        Ok(RecordTable::new(self.headers.clone(), rows))
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), DataError> {
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| DataError::csv(path, e))?;
        writer
            .write_record(&self.headers)
            .map_err(|e| DataError::csv(path, e))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| DataError::csv(path, e))?;
        }
        writer.flush().map_err(|e| DataError::io(path, e))?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<Self, DataError> {
        let file = File::open(path).map_err(|e| DataError::io(path, e))?;
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| DataError::csv(path, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| DataError::csv(path, e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }
}
