//! Collaborator contracts for spreadsheet access
//!
//! The mapping engine never touches a workbook format directly; it works
//! against these traits. `cardgen-xlsx` provides the XLSX implementations,
//! tests use in-memory fakes.

use crate::cell::{CellRef, CellSpan, CellValue};
use crate::error::Result;
use std::path::Path;

/// Read-only view of a template worksheet, as needed by auto-detection
pub trait TemplateSheet {
    /// The rectangle of cells that carry any content, if the sheet is non-empty
    fn used_range(&self) -> Option<CellSpan>;

    /// Raw (untrimmed) text rendering of a cell's content, `None` when empty
    fn cell_text(&self, at: CellRef) -> Option<String>;

    /// Merged regions of the sheet
    fn merged_regions(&self) -> &[CellSpan];

    /// Whether a cell is empty or blank after trimming
    fn is_blank(&self, at: CellRef) -> bool {
        self.cell_text(at)
            .map(|s| s.trim().is_empty())
            .unwrap_or(true)
    }
}

/// One data row of the dataset: column name → scalar value, in column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetRow {
    columns: Vec<(String, CellValue)>,
}

impl DatasetRow {
    /// Build a row from (column name, value) pairs in column order
    pub fn new(columns: Vec<(String, CellValue)>) -> Self {
        Self { columns }
    }

    /// Value of a named column, if the dataset has it
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, v)| v)
    }

    /// Value of the first column (the positional name fallback)
    pub fn first_value(&self) -> Option<&CellValue> {
        self.columns.first().map(|(_, v)| v)
    }
}

/// Source of dataset rows (a "Sheet1 with a header row" contract)
pub trait DatasetReader {
    /// Column header names from the first row
    fn headers(&self) -> &[String];

    /// The first `limit` data rows, in file order
    fn rows(&mut self, limit: usize) -> Result<Vec<DatasetRow>>;
}

/// A copied template opened for cell-level editing
pub trait RecordWorkbook {
    /// Write a value into a cell
    ///
    /// Writing a non-anchor cell of a merged region must fail with
    /// [`crate::Error::MergedCellWrite`], not a generic I/O error.
    fn write_cell(&mut self, at: CellRef, value: &CellValue) -> Result<()>;

    /// Persist the workbook back to the path it was opened from
    fn save(&mut self) -> Result<()>;
}

/// Factory opening copied template files for editing
pub trait RecordBackend {
    type Workbook: RecordWorkbook;

    fn open(&self, path: &Path) -> Result<Self::Workbook>;
}
