//! Per-dataset persistence of field mappings
//!
//! Each dataset file gets one mapping document, stored beside it in a
//! `Save/` subfolder as `<dataset-base-name>.mapping.json`. The document is
//! a UTF-8 JSON object of cell-reference → field-name pairs.

use crate::error::{Error, Result};
use crate::mapping::FieldMapping;
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Subfolder (relative to the dataset file) holding mapping documents
const STORE_DIR: &str = "Save";

/// Handle to the mapping document belonging to one dataset file
#[derive(Debug, Clone)]
pub struct MappingStore {
    path: PathBuf,
}

impl MappingStore {
    /// Derive the store location for a dataset file
    ///
    /// For `/data/class1.xlsx` the document lives at
    /// `/data/Save/class1.mapping.json`.
    pub fn for_dataset(dataset: &Path) -> Result<Self> {
        let stem = dataset
            .file_stem()
            .ok_or(Error::ConfigMissing("dataset file"))?;
        let dir = dataset.parent().unwrap_or_else(|| Path::new("."));
        let path = dir
            .join(STORE_DIR)
            .join(format!("{}.mapping.json", stem.to_string_lossy()));
        Ok(Self { path })
    }

    /// The backing document path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored mapping
    ///
    /// A missing document is [`Error::MappingNotFound`] (caller falls back to
    /// an empty or freshly detected mapping); an unparseable document is
    /// [`Error::MappingParse`] and must be surfaced to the operator.
    pub fn load(&self) -> Result<FieldMapping> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::MappingNotFound(self.path.clone()));
            }
            Err(e) => return Err(Error::io(&self.path, e)),
        };

        let mapping = serde_json::from_str(&text).map_err(|source| Error::MappingParse {
            path: self.path.clone(),
            source,
        })?;
        debug!("loaded mapping from {}", self.path.display());
        Ok(mapping)
    }

    /// Save a mapping, overwriting any existing document
    pub fn save(&self, mapping: &FieldMapping) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        // Pretty-printed so the operator can inspect/diff the document
        let text = serde_json::to_string_pretty(mapping)
            .expect("mapping serialization is infallible");
        fs::write(&self.path, text).map_err(|e| Error::io(&self.path, e))?;
        debug!("saved mapping to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellRef;
    use pretty_assertions::assert_eq;

    fn at(s: &str) -> CellRef {
        CellRef::parse(s).unwrap()
    }

    #[test]
    fn test_path_derivation() {
        let store = MappingStore::for_dataset(Path::new("/data/class1.xlsx")).unwrap();
        assert_eq!(store.path(), Path::new("/data/Save/class1.mapping.json"));

        // Relative dataset path
        let store = MappingStore::for_dataset(Path::new("class1.xlsx")).unwrap();
        assert_eq!(store.path(), Path::new("Save/class1.mapping.json"));
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("students.xlsx");
        let store = MappingStore::for_dataset(&dataset).unwrap();

        let mut mapping = FieldMapping::new();
        mapping.set(at("C2"), "姓名");
        mapping.set(at("E4"), "入学时间");
        mapping.set(at("D5"), "");

        store.save(&mapping).unwrap();
        assert!(dir.path().join("Save/students.mapping.json").exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded, mapping);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = MappingStore::for_dataset(&dir.path().join("d.xlsx")).unwrap();

        let mut first = FieldMapping::new();
        first.set(at("A1"), "x");
        store.save(&first).unwrap();

        let mut second = FieldMapping::new();
        second.set(at("B2"), "y");
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap(), second);
    }

    #[test]
    fn test_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = MappingStore::for_dataset(&dir.path().join("d.xlsx")).unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, Error::MappingNotFound(_)));
    }

    #[test]
    fn test_corrupt_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = MappingStore::for_dataset(&dir.path().join("d.xlsx")).unwrap();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, Error::MappingParse { .. }));
    }
}
