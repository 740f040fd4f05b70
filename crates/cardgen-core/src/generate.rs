//! Batch record generation
//!
//! For each of the first N dataset rows: derive an output name, copy the
//! template verbatim, write the mapped cells, save. Rows are processed
//! strictly in file order; the first hard failure aborts the remainder of
//! the batch and names the row that failed.

use crate::cell::CellValue;
use crate::editor::EditorSession;
use crate::error::{Error, Result};
use crate::mapping::FieldMapping;
use crate::sheet::{DatasetReader, DatasetRow, RecordBackend, RecordWorkbook};
use crate::store::MappingStore;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Column header that names the output record when the dataset has it
pub const NAME_COLUMN: &str = "姓名";

/// Default number of dataset rows to process
pub const DEFAULT_ROW_COUNT: usize = 10;

/// Configuration of one generation run
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Dataset workbook (drives the mapping store location)
    pub dataset_path: PathBuf,
    /// Template workbook, copied once per row
    pub template_path: PathBuf,
    /// Directory receiving the generated records
    pub output_dir: PathBuf,
    /// Number of rows to process, top to bottom
    pub count: usize,
}

impl GenerateConfig {
    pub fn new(
        dataset_path: impl Into<PathBuf>,
        template_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            template_path: template_path.into(),
            output_dir: output_dir.into(),
            count: DEFAULT_ROW_COUNT,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

/// Outcome of a completed generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    /// Number of records written
    pub generated: usize,
    /// Output files, in row order
    pub files: Vec<PathBuf>,
}

/// The record generator
#[derive(Debug)]
pub struct Generator {
    config: GenerateConfig,
}

impl Generator {
    pub fn new(config: GenerateConfig) -> Self {
        Self { config }
    }

    /// Run the batch
    ///
    /// The mapping is reloaded from the store at the start of the run; an
    /// in-memory copy from an earlier edit is never trusted. The session
    /// must have been committed ([`EditorSession::is_confirmed`]) or the
    /// run is refused with [`Error::MappingNotConfirmed`].
    ///
    /// Rows that derive the same output name overwrite each other, later
    /// rows winning; names are not deduplicated.
    pub fn generate<D, B>(
        &self,
        dataset: &mut D,
        backend: &B,
        store: &MappingStore,
        session: &EditorSession,
    ) -> Result<GenerateReport>
    where
        D: DatasetReader,
        B: RecordBackend,
    {
        if !session.is_confirmed() {
            return Err(Error::MappingNotConfirmed);
        }

        let mapping = store.load()?;
        let rows = dataset.rows(self.config.count)?;
        let has_name_column = dataset.headers().iter().any(|h| h == NAME_COLUMN);

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| Error::io(&self.config.output_dir, e))?;

        let extension = self
            .config
            .template_path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "xlsx".to_string());

        let mut files = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let name = derive_record_name(row, has_name_column, index);
            let out_path = self
                .config
                .output_dir
                .join(format!("{}.{}", name, extension));

            self.write_record(backend, &mapping, row, &out_path)
                .map_err(|e| Error::row_failed(index + 1, &name, e))?;

            info!("generated record {} -> {}", index + 1, out_path.display());
            files.push(out_path);
        }

        Ok(GenerateReport {
            generated: files.len(),
            files,
        })
    }

    /// Copy the template to `out_path`, fill the mapped cells, save
    fn write_record<B: RecordBackend>(
        &self,
        backend: &B,
        mapping: &FieldMapping,
        row: &DatasetRow,
        out_path: &Path,
    ) -> Result<()> {
        fs::copy(&self.config.template_path, out_path).map_err(|e| Error::io(out_path, e))?;

        let mut workbook = backend.open(out_path)?;
        for (at, field) in mapping.iter() {
            let value = resolve_value(row, field);
            debug!("writing {} <- {:?}", at, value);
            workbook.write_cell(at, &value)?;
        }
        workbook.save()
    }
}

/// Output base name for a row: the name column if present, else the first
/// column, trimmed; a blank result falls back to `Student{n}`
fn derive_record_name(row: &DatasetRow, has_name_column: bool, index: usize) -> String {
    let raw = if has_name_column {
        row.get(NAME_COLUMN)
    } else {
        row.first_value()
    };
    let name = raw
        .map(|v| v.to_output_string().trim().to_string())
        .unwrap_or_default();

    if name.is_empty() {
        format!("Student{}", index + 1)
    } else {
        name
    }
}

/// Value to write for one mapping entry
///
/// The empty field name is the explicit blank marker; a field the row does
/// not carry, or carries as null, also writes blank.
fn resolve_value(row: &DatasetRow, field: &str) -> CellValue {
    if field.is_empty() {
        return CellValue::Empty;
    }
    match row.get(field) {
        Some(value) if !value.is_empty() => value.clone(),
        _ => CellValue::Empty,
    }
}
