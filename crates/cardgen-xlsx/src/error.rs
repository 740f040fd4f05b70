//! Conversions from backend errors into the core taxonomy

use cardgen_core::Error;

/// Map a calamine error to the core taxonomy, keeping a missing sheet
/// distinguishable from an unreadable file
pub(crate) fn dataset_error(e: calamine::XlsxError) -> Error {
    match e {
        calamine::XlsxError::WorksheetNotFound(name) => Error::SheetNotFound(name),
        other => Error::DataRead(other.to_string()),
    }
}

/// Map a workbook open/save failure to the core taxonomy
pub(crate) fn backend_error<E: std::error::Error>(e: E) -> Error {
    Error::Backend(e.to_string())
}
