//! Yearly NTD bundles published by APTA: where each lives and how to read
//! its metrics sheet.

use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use zip::ZipArchive;

use super::table::RecordTable;
use crate::error::DataError;

const APTA_UPLOADS: &str = "https://www.apta.com/wp-content/uploads";

/// Years fetched automatically. 2014 has an archive but is supplied by hand.
pub const FETCH_YEARS: [u16; 7] = [2013, 2015, 2016, 2017, 2018, 2019, 2020];

/// Location and layout of one year's archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSource {
    pub year: u16,
    pub url: String,
    /// Spreadsheet path inside the zip.
    pub member: String,
    pub sheet: &'static str,
    /// Rows above the header row.
    pub skip_rows: usize,
}

impl ArchiveSource {
    pub fn for_year(year: u16) -> Option<Self> {
        let member = match year {
            2013 => "2013-Table-19-Transit-Operating-Stats.xls".to_string(),
            2014 => "2014-Table-19-Transit-Operating-Stats.xls".to_string(),
            2015 => "Metrics.xlsm".to_string(),
            2016 => "2016-NTD-Metrics_0.xlsx".to_string(),
            2017 => "Metrics_1.xlsm".to_string(),
            2018 => "Metrics_2.xlsx".to_string(),
            2019 | 2020 => format!("{year}_Annual_Database_Files/Metrics_Static.xlsx"),
            _ => return None,
        };

        let url = match year {
            2015 => format!("{APTA_UPLOADS}/2015-NTD-Tables-APTA.zip"),
            2017 => format!(
                "{APTA_UPLOADS}/Resources/resources/statistics/Documents/NTD_Data/2017-National-Transit-Database.zip"
            ),
            _ => format!("{APTA_UPLOADS}/{year}-National-Transit-Database.zip"),
        };

        let (sheet, skip_rows) = if year == 2013 {
            ("Op_Stats_Service", 1)
        } else {
            ("Metrics", 0)
        };

        Some(Self {
            year,
            url,
            member,
            sheet,
            skip_rows,
        })
    }
}

/// Extracts `member` from an in-memory zip archive.
pub fn read_member(archive: &[u8], member: &str) -> Result<Vec<u8>, DataError> {
    let mut zip = ZipArchive::new(Cursor::new(archive))?;
    let mut file = zip.by_name(member)?;

    let mut buf = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut buf)
        .map_err(|e| DataError::io(Path::new(member), e))?;
    Ok(buf)
}

/// Reads `sheet` from an `.xls`, `.xlsx` or `.xlsm` workbook. The row after
/// `skip_rows` supplies the headers.
pub fn read_sheet(
    workbook: Vec<u8>,
    sheet: &str,
    skip_rows: usize,
) -> Result<RecordTable, DataError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(workbook))?;
    let range = workbook.worksheet_range(sheet)?;

    let mut rows = range.rows().skip(skip_rows);
    let headers = rows
        .next()
        .map(|r| r.iter().map(cell_text).collect())
        .unwrap_or_default();
    let rows = rows.map(|r| r.iter().map(cell_text).collect()).collect();

    Ok(RecordTable::new(headers, rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // whole numbers come back as floats from xls; keep ids like "5015" intact
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
