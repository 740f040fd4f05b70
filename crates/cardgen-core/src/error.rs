//! Error types for cardgen-core

use crate::cell::{CellRef, CellSpan};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cardgen-core
#[derive(Debug, Error)]
pub enum Error {
    /// Required configuration is missing (no dataset/template selected, etc.)
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    /// Cell reference does not match the `^[A-Z]+\d+$` contract
    #[error("Invalid cell reference: {0} (expected a form like C3)")]
    InvalidCellRef(String),

    /// Cell reference already present in the mapping being edited
    #[error("Cell reference {0} is already mapped")]
    DuplicateCellRef(String),

    /// No mapping document stored for this dataset
    #[error("No mapping stored at {}", .0.display())]
    MappingNotFound(PathBuf),

    /// Mapping document exists but cannot be parsed
    #[error("Corrupt mapping document at {}: {source}", .path.display())]
    MappingParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Auto-detection found no dataset header in the template
    #[error("No dataset column header matched any template cell")]
    AutoDetectEmpty,

    /// Generation was requested against an unconfirmed mapping
    #[error("The field mapping has not been confirmed; review and confirm it before generating")]
    MappingNotConfirmed,

    /// Write to a merged cell that is not the region's first cell
    #[error(
        "Cell {cell} is inside merged region {region} but is not its first cell; \
         map the first cell of any merged block"
    )]
    MergedCellWrite { cell: CellRef, region: CellSpan },

    /// Expected sheet missing from a workbook
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Dataset could not be read
    #[error("Failed to read dataset: {0}")]
    DataRead(String),

    /// A row of the batch failed; the remaining rows were not processed
    #[error("Record {row} ({name}) failed: {source}")]
    RowFailed {
        row: usize,
        name: String,
        #[source]
        source: Box<Error>,
    },

    /// Filesystem failure
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Spreadsheet backend failure (open/save of a workbook)
    #[error("Workbook error: {0}")]
    Backend(String),
}

impl Error {
    /// Create an I/O error tagged with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a per-row failure with the row number and derived record name
    pub fn row_failed(row: usize, name: impl Into<String>, source: Error) -> Self {
        Error::RowFailed {
            row,
            name: name.into(),
            source: Box::new(source),
        }
    }
}
