//! Heuristic auto-detection of a field mapping from a template layout
//!
//! The detector scans the template for cells whose text matches a dataset
//! column header and proposes the adjacent empty cell (right of the label,
//! then below it) as the fill target. A label that starts a merged region
//! anchors at the region's bottom-right cell: the label spans the merged
//! block and the fillable area starts after it.

use crate::cell::CellRef;
use crate::error::{Error, Result};
use crate::mapping::FieldMapping;
use crate::sheet::TemplateSheet;
use log::debug;

/// Derive a draft mapping from dataset headers and the template layout
///
/// Pure: nothing is persisted here. The caller decides whether to save the
/// draft via [`crate::MappingStore`].
///
/// Returns [`Error::AutoDetectEmpty`] when no header matched any template
/// cell (distinct from I/O failures, which the `TemplateSheet` impl raised
/// while it was being opened). A header whose label has no adjacent empty
/// cell is skipped; that is a heuristic limitation, not a failure.
pub fn detect_mapping(headers: &[String], template: &impl TemplateSheet) -> Result<FieldMapping> {
    let Some(range) = template.used_range() else {
        return Err(Error::AutoDetectEmpty);
    };

    let mut mapping = FieldMapping::new();

    for row in range.start.row..=range.end.row {
        for col in range.start.col..=range.end.col {
            let at = CellRef::new(row, col);
            let Some(text) = template.cell_text(at) else {
                continue;
            };
            let label = text.trim();
            if label.is_empty() || !headers.iter().any(|h| h == label) {
                continue;
            }

            let anchor = anchor_for(template, at);
            if let Some(target) = probe_target(template, &mapping, anchor) {
                mapping.set(target, label);
            } else {
                debug!("no empty cell adjacent to label {label:?} at {at}, skipped");
            }
        }
    }

    if mapping.is_empty() {
        return Err(Error::AutoDetectEmpty);
    }
    Ok(mapping)
}

/// Resolve the effective anchor of a label cell
///
/// A label that is the start cell of a merged region anchors at the region's
/// end cell; anything else anchors at itself.
fn anchor_for(template: &impl TemplateSheet, at: CellRef) -> CellRef {
    template
        .merged_regions()
        .iter()
        .find(|region| region.start == at)
        .map(|region| region.end)
        .unwrap_or(at)
}

/// Probe right of the anchor, then below it, for an unclaimed empty cell
fn probe_target(
    template: &impl TemplateSheet,
    mapping: &FieldMapping,
    anchor: CellRef,
) -> Option<CellRef> {
    let mut candidates = anchor.right().into_iter().chain(anchor.below());
    candidates.find(|&at| template.is_blank(at) && !mapping.contains(at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellSpan;
    use crate::sheet::TemplateSheet;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    /// In-memory template for detector tests
    #[derive(Default)]
    struct GridSheet {
        cells: BTreeMap<(u32, u16), String>,
        merged: Vec<CellSpan>,
    }

    impl GridSheet {
        fn with(mut self, at: &str, text: &str) -> Self {
            let at = CellRef::parse(at).unwrap();
            self.cells.insert((at.row, at.col), text.to_string());
            self
        }

        fn merge(mut self, span: &str) -> Self {
            self.merged.push(CellSpan::parse(span).unwrap());
            self
        }
    }

    impl TemplateSheet for GridSheet {
        fn used_range(&self) -> Option<CellSpan> {
            let rows: Vec<u32> = self.cells.keys().map(|(r, _)| *r).collect();
            let cols: Vec<u16> = self.cells.keys().map(|(_, c)| *c).collect();
            let min = CellRef::new(*rows.iter().min()?, *cols.iter().min()?);
            let max = CellRef::new(*rows.iter().max()?, *cols.iter().max()?);
            Some(CellSpan::new(min, max))
        }

        fn cell_text(&self, at: CellRef) -> Option<String> {
            self.cells.get(&(at.row, at.col)).cloned()
        }

        fn merged_regions(&self) -> &[CellSpan] {
            &self.merged
        }
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn entries(m: &FieldMapping) -> Vec<(String, String)> {
        m.iter().map(|(c, f)| (c.to_string(), f.to_string())).collect()
    }

    #[test]
    fn test_targets_cell_right_of_label() {
        let sheet = GridSheet::default().with("B2", "姓名").with("D4", "x");
        let m = detect_mapping(&headers(&["姓名"]), &sheet).unwrap();
        assert_eq!(entries(&m), [("C2".to_string(), "姓名".to_string())]);
    }

    #[test]
    fn test_falls_back_to_cell_below() {
        let sheet = GridSheet::default().with("B2", "姓名").with("C2", "taken");
        let m = detect_mapping(&headers(&["姓名"]), &sheet).unwrap();
        assert_eq!(entries(&m), [("B3".to_string(), "姓名".to_string())]);
    }

    #[test]
    fn test_both_neighbors_full_skips_header() {
        let sheet = GridSheet::default()
            .with("B2", "姓名")
            .with("C2", "taken")
            .with("B3", "also taken");
        let err = detect_mapping(&headers(&["姓名"]), &sheet).unwrap_err();
        assert!(matches!(err, Error::AutoDetectEmpty));
    }

    #[test]
    fn test_merged_label_anchors_at_region_end() {
        // Label spans B2:B3; the fillable cell is right of the merge end
        let sheet = GridSheet::default().with("B2", "姓名").merge("B2:B3");
        let m = detect_mapping(&headers(&["姓名"]), &sheet).unwrap();
        assert_eq!(entries(&m), [("C3".to_string(), "姓名".to_string())]);
    }

    #[test]
    fn test_label_text_is_trimmed() {
        let sheet = GridSheet::default().with("B2", "  姓名 ");
        let m = detect_mapping(&headers(&["姓名"]), &sheet).unwrap();
        assert_eq!(entries(&m), [("C2".to_string(), "姓名".to_string())]);
    }

    #[test]
    fn test_blank_after_trim_counts_as_empty_target() {
        let sheet = GridSheet::default().with("B2", "姓名").with("C2", "   ");
        let m = detect_mapping(&headers(&["姓名"]), &sheet).unwrap();
        assert_eq!(entries(&m), [("C2".to_string(), "姓名".to_string())]);
    }

    #[test]
    fn test_multiple_headers() {
        let sheet = GridSheet::default()
            .with("B2", "姓名")
            .with("B4", "学号");
        let m = detect_mapping(&headers(&["姓名", "学号", "班级"]), &sheet).unwrap();
        assert_eq!(
            entries(&m),
            [
                ("C2".to_string(), "姓名".to_string()),
                ("C4".to_string(), "学号".to_string()),
            ]
        );
    }

    #[test]
    fn test_earlier_label_keeps_claimed_cell() {
        // "学号" at B1 probes right (C1, occupied) then below and claims B2.
        // "姓名" at A2 probes right (B2, blank but already claimed) and falls
        // through to its below-cell A3.
        let sheet = GridSheet::default()
            .with("B1", "学号")
            .with("C1", "x")
            .with("A2", "姓名");
        let m = detect_mapping(&headers(&["姓名", "学号"]), &sheet).unwrap();
        assert_eq!(
            entries(&m),
            [
                ("B2".to_string(), "学号".to_string()),
                ("A3".to_string(), "姓名".to_string()),
            ]
        );
    }

    #[test]
    fn test_no_match_is_detect_empty() {
        let sheet = GridSheet::default().with("B2", "备注");
        let err = detect_mapping(&headers(&["姓名"]), &sheet).unwrap_err();
        assert!(matches!(err, Error::AutoDetectEmpty));
    }

    #[test]
    fn test_empty_template_is_detect_empty() {
        let sheet = GridSheet::default();
        let err = detect_mapping(&headers(&["姓名"]), &sheet).unwrap_err();
        assert!(matches!(err, Error::AutoDetectEmpty));
    }
}
