//! Output-record editing via umya-spreadsheet
//!
//! The generator copies the template file first; this module opens the copy,
//! writes mapped values, and saves it back in place. umya-spreadsheet itself
//! will happily write into any cell of a merged region, so the non-anchor
//! guard the engine contract requires is enforced here before the write.

use crate::error::backend_error;
use crate::template::XlsxTemplate;
use cardgen_core::{
    CellRef, CellSpan, CellValue, Error, RecordBackend, RecordWorkbook, Result, TemplateSheet,
};
use std::path::{Path, PathBuf};
use umya_spreadsheet::Spreadsheet;

/// Opens copied template files for cell-level editing
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxBackend;

/// A copied template open for editing
pub struct XlsxRecordBook {
    path: PathBuf,
    book: Spreadsheet,
    merged: Vec<CellSpan>,
}

impl RecordBackend for XlsxBackend {
    type Workbook = XlsxRecordBook;

    fn open(&self, path: &Path) -> Result<Self::Workbook> {
        let book = umya_spreadsheet::reader::xlsx::read(path).map_err(backend_error)?;
        let merged = book
            .get_active_sheet()
            .get_merge_cells()
            .iter()
            .map(|range| CellSpan::parse(&range.get_range()))
            .collect::<Result<Vec<_>>>()?;
        Ok(XlsxRecordBook {
            path: path.to_path_buf(),
            book,
            merged,
        })
    }
}

impl XlsxRecordBook {
    /// The merged region a non-anchor cell belongs to, if any
    fn offending_region(&self, at: CellRef) -> Option<CellSpan> {
        self.merged
            .iter()
            .find(|region| region.contains(at) && region.start != at)
            .copied()
    }
}

impl RecordWorkbook for XlsxRecordBook {
    fn write_cell(&mut self, at: CellRef, value: &CellValue) -> Result<()> {
        if let Some(region) = self.offending_region(at) {
            return Err(Error::MergedCellWrite { cell: at, region });
        }

        let cell = self
            .book
            .get_active_sheet_mut()
            .get_cell_mut(at.to_string().as_str());
        match value {
            CellValue::Empty => {
                cell.set_value("");
            }
            CellValue::Text(s) => {
                cell.set_value(s);
            }
            CellValue::Number(n) => {
                cell.set_value_number(*n);
            }
            CellValue::Bool(b) => {
                cell.set_value_bool(*b);
            }
            // Dates are written as their formatted text, midnight collapsing
            // to the bare date
            CellValue::DateTime(_) => {
                cell.set_value(value.to_output_string());
            }
        }
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        umya_spreadsheet::writer::xlsx::write(&self.book, &self.path).map_err(backend_error)
    }
}

/// Convenience check used by operator-facing tooling: does a mapping target
/// a non-anchor merged cell of this template?
pub fn first_merged_conflict(template: &XlsxTemplate, targets: &[CellRef]) -> Option<(CellRef, CellSpan)> {
    targets.iter().find_map(|&at| {
        template
            .merged_regions()
            .iter()
            .find(|region| region.contains(at) && region.start != at)
            .map(|region| (at, *region))
    })
}
