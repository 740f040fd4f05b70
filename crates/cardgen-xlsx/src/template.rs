//! Template inspection via umya-spreadsheet

use crate::error::backend_error;
use cardgen_core::{CellRef, CellSpan, Result, TemplateSheet};
use log::debug;
use std::path::Path;
use umya_spreadsheet::Spreadsheet;

/// A template workbook's active sheet, opened read-only for auto-detection
pub struct XlsxTemplate {
    book: Spreadsheet,
    merged: Vec<CellSpan>,
}

impl XlsxTemplate {
    /// Open a template workbook
    pub fn open(path: &Path) -> Result<Self> {
        let book = umya_spreadsheet::reader::xlsx::read(path).map_err(backend_error)?;
        let merged = merged_spans(&book)?;
        debug!(
            "template {}: {} merged region(s)",
            path.display(),
            merged.len()
        );
        Ok(Self { book, merged })
    }
}

/// Collect the active sheet's merged regions as spans
fn merged_spans(book: &Spreadsheet) -> Result<Vec<CellSpan>> {
    book.get_active_sheet()
        .get_merge_cells()
        .iter()
        .map(|range| CellSpan::parse(&range.get_range()))
        .collect()
}

impl TemplateSheet for XlsxTemplate {
    fn used_range(&self) -> Option<CellSpan> {
        let sheet = self.book.get_active_sheet();
        let (max_col, max_row) = (sheet.get_highest_column(), sheet.get_highest_row());
        if max_row == 0 || max_col == 0 {
            return None;
        }
        Some(CellSpan::new(
            CellRef::new(0, 0),
            CellRef::new(max_row - 1, (max_col - 1) as u16),
        ))
    }

    fn cell_text(&self, at: CellRef) -> Option<String> {
        let text = self.book.get_active_sheet().get_value(at.to_string().as_str());
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn merged_regions(&self) -> &[CellSpan] {
        &self.merged
    }
}
