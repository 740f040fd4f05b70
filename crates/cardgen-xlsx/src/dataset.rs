//! Dataset reading via calamine
//!
//! The dataset contract: a sheet literally named "Sheet1", first row holds
//! the column headers, data rows follow top to bottom.

use crate::error::dataset_error;
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use cardgen_core::{CellValue, DatasetReader, DatasetRow, Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use std::path::Path;

/// Sheet name the dataset contract requires
const DATA_SHEET: &str = "Sheet1";

/// An XLSX dataset opened for row reading
#[derive(Debug)]
pub struct XlsxDataset {
    headers: Vec<String>,
    range: Range<Data>,
}

impl XlsxDataset {
    /// Open a dataset workbook and locate its "Sheet1" data
    pub fn open(path: &Path) -> Result<Self> {
        let mut workbook: Xlsx<_> = open_workbook(path)
            .map_err(|e| Error::DataRead(format!("{}: {}", path.display(), e)))?;
        let range = workbook
            .worksheet_range(DATA_SHEET)
            .map_err(dataset_error)?;

        let headers: Vec<String> = range
            .rows()
            .next()
            .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect())
            .unwrap_or_default();
        debug!("dataset {} headers: {:?}", path.display(), headers);

        Ok(Self { headers, range })
    }
}

impl DatasetReader for XlsxDataset {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn rows(&mut self, limit: usize) -> Result<Vec<DatasetRow>> {
        let rows = self
            .range
            .rows()
            .skip(1)
            .take(limit)
            .map(|cells| {
                DatasetRow::new(
                    self.headers
                        .iter()
                        .cloned()
                        .zip(cells.iter().map(to_cell_value))
                        .collect(),
                )
            })
            .collect();
        Ok(rows)
    }
}

/// Map a calamine cell onto the engine's value model
fn to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Empty),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Parse an ISO-8601 date or date-time string; a bare date gets midnight
fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    s.parse::<NaiveDate>()
        .ok()
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_to_cell_value() {
        assert_eq!(to_cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(to_cell_value(&Data::String(String::new())), CellValue::Empty);
        assert_eq!(
            to_cell_value(&Data::String("Alice".into())),
            CellValue::Text("Alice".into())
        );
        assert_eq!(to_cell_value(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(to_cell_value(&Data::Float(3.5)), CellValue::Number(3.5));
        assert_eq!(to_cell_value(&Data::Bool(true)), CellValue::Bool(true));
    }

    #[test]
    fn test_iso_datetime_parsing() {
        let dt = parse_iso_datetime("2024-09-01T08:30:00").unwrap();
        assert_eq!(
            dt,
            NaiveDate::from_ymd_opt(2024, 9, 1)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap()
        );

        let dt = parse_iso_datetime("2024-09-01").unwrap();
        assert_eq!(dt.time(), chrono::NaiveTime::MIN);

        assert!(parse_iso_datetime("not a date").is_none());
    }
}
