//! # cardgen-xlsx
//!
//! XLSX implementations of the cardgen-core collaborator traits:
//!
//! - [`XlsxDataset`] reads dataset rows ("Sheet1" + header row) via calamine
//! - [`XlsxTemplate`] exposes a template's cells and merged regions for
//!   auto-detection via umya-spreadsheet
//! - [`XlsxBackend`] / [`XlsxRecordBook`] open copied templates for
//!   cell-level editing and save the generated records

mod dataset;
mod error;
mod record;
mod template;

pub use dataset::XlsxDataset;
pub use record::{first_merged_conflict, XlsxBackend, XlsxRecordBook};
pub use template::XlsxTemplate;
