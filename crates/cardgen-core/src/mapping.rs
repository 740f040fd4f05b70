//! The cell-to-field mapping model

use crate::cell::CellRef;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A mapping from template cell references to dataset column names
///
/// An empty field name is a valid sentinel meaning "blank this cell".
/// Cell references are unique within a mapping; entries iterate in
/// row-major order. Serializes as a flat JSON object (`{"C3": "姓名"}`),
/// the same document shape older mapping files use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: BTreeMap<CellRef, String>,
}

impl FieldMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, rejecting a duplicate cell reference
    pub fn insert(&mut self, at: CellRef, field: impl Into<String>) -> Result<()> {
        if self.entries.contains_key(&at) {
            return Err(Error::DuplicateCellRef(at.to_string()));
        }
        self.entries.insert(at, field.into());
        Ok(())
    }

    /// Set an entry, replacing any existing field name for that cell
    pub fn set(&mut self, at: CellRef, field: impl Into<String>) {
        self.entries.insert(at, field.into());
    }

    /// Remove an entry, returning its field name if present
    pub fn remove(&mut self, at: CellRef) -> Option<String> {
        self.entries.remove(&at)
    }

    /// Get the field name mapped to a cell
    pub fn get(&self, at: CellRef) -> Option<&str> {
        self.entries.get(&at).map(String::as_str)
    }

    /// Whether a cell reference is already mapped
    pub fn contains(&self, at: CellRef) -> bool {
        self.entries.contains_key(&at)
    }

    /// Iterate entries in row-major cell order
    pub fn iter(&self) -> impl Iterator<Item = (CellRef, &str)> {
        self.entries.iter().map(|(at, f)| (*at, f.as_str()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a `CELL=FIELD` pair (e.g. "C3=姓名")
    ///
    /// Both sides are trimmed; the field side may be empty ("C3=" maps C3 to
    /// the blank sentinel).
    pub fn parse_entry(s: &str) -> Result<(CellRef, String)> {
        let (cell, field) = s
            .split_once('=')
            .ok_or_else(|| Error::InvalidCellRef(s.into()))?;
        let at = CellRef::parse(cell.trim())?;
        Ok((at, field.trim().to_string()))
    }
}

impl FromIterator<(CellRef, String)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (CellRef, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(s: &str) -> CellRef {
        CellRef::parse(s).unwrap()
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let mut m = FieldMapping::new();
        m.insert(at("C3"), "姓名").unwrap();

        let err = m.insert(at("C3"), "学号").unwrap_err();
        assert!(matches!(err, Error::DuplicateCellRef(ref c) if c == "C3"));

        // Existing entry is unchanged
        assert_eq!(m.get(at("C3")), Some("姓名"));
    }

    #[test]
    fn test_set_replaces() {
        let mut m = FieldMapping::new();
        m.set(at("C3"), "姓名");
        m.set(at("C3"), "学号");
        assert_eq!(m.get(at("C3")), Some("学号"));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_iter_is_row_major() {
        let mut m = FieldMapping::new();
        m.set(at("B2"), "b");
        m.set(at("A3"), "c");
        m.set(at("A1"), "a");
        let order: Vec<String> = m.iter().map(|(c, _)| c.to_string()).collect();
        assert_eq!(order, ["A1", "B2", "A3"]);
    }

    #[test]
    fn test_json_shape() {
        let mut m = FieldMapping::new();
        m.set(at("C2"), "姓名");
        m.set(at("D5"), "");

        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"C2":"姓名","D5":""}"#);

        let back: FieldMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_deserialize_rejects_bad_key() {
        let err = serde_json::from_str::<FieldMapping>(r#"{"c3": "姓名"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_parse_entry() {
        let (cell, field) = FieldMapping::parse_entry("C3=姓名").unwrap();
        assert_eq!(cell, at("C3"));
        assert_eq!(field, "姓名");

        let (cell, field) = FieldMapping::parse_entry(" D5 = ").unwrap();
        assert_eq!(cell, at("D5"));
        assert_eq!(field, "");

        assert!(FieldMapping::parse_entry("C3").is_err());
        assert!(FieldMapping::parse_entry("c3=x").is_err());
    }
}
