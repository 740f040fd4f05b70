//! # cardgen-core
//!
//! The field-mapping engine behind cardgen: batch-generate per-row
//! spreadsheet records by copying a template workbook and filling mapped
//! cells from a dataset.
//!
//! The crate provides:
//! - [`CellRef`], [`CellSpan`], [`CellValue`] - the cell model
//! - [`FieldMapping`] and [`MappingStore`] - the cell → column mapping and
//!   its per-dataset persistence
//! - [`detect_mapping`] - heuristic mapping detection against a template's
//!   layout, merged-cell aware
//! - [`EditorSession`] - validated mapping edits plus the confirmation gate
//! - [`Generator`] - the batch record generator
//!
//! Workbook access goes through the traits in [`sheet`]; XLSX
//! implementations live in the `cardgen-xlsx` crate.
//!
//! ## Example
//!
//! ```rust,no_run
//! use cardgen_core::{detect_mapping, EditorSession, MappingStore};
//! use std::path::Path;
//!
//! # fn run(dataset: &impl cardgen_core::sheet::DatasetReader,
//! #        template: &impl cardgen_core::sheet::TemplateSheet) -> cardgen_core::Result<()> {
//! let store = MappingStore::for_dataset(Path::new("class1.xlsx"))?;
//! let draft = detect_mapping(dataset.headers(), template)?;
//!
//! let mut session = EditorSession::with_mapping(&draft);
//! session.add_row("D5", "入学时间")?;
//! session.commit(&store)?;
//! # Ok(())
//! # }
//! ```

pub mod cell;
pub mod detect;
pub mod editor;
pub mod error;
pub mod generate;
pub mod mapping;
pub mod sheet;
pub mod store;

// Re-exports for convenience
pub use cell::{CellRef, CellSpan, CellValue};
pub use detect::detect_mapping;
pub use editor::EditorSession;
pub use error::{Error, Result};
pub use generate::{
    GenerateConfig, GenerateReport, Generator, DEFAULT_ROW_COUNT, NAME_COLUMN,
};
pub use mapping::FieldMapping;
pub use sheet::{DatasetReader, DatasetRow, RecordBackend, RecordWorkbook, TemplateSheet};
pub use store::MappingStore;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
