//! Mapping edit sessions
//!
//! An [`EditorSession`] owns the working copy of a mapping while the operator
//! edits it, validates every change (cell-reference syntax, uniqueness), and
//! carries the confirmation gate: generation refuses to run until a session
//! over the stored mapping has been committed.

use crate::cell::CellRef;
use crate::error::{Error, Result};
use crate::mapping::FieldMapping;
use crate::store::MappingStore;

/// One mapping edit session
///
/// Rows keep their visual (insertion) order while editing; the committed
/// mapping is keyed by cell reference. A pending edit registered with
/// [`stage`](Self::stage) is auto-committed — through the same validation —
/// when the session is committed, so a half-finished entry is neither lost
/// nor applied unchecked.
#[derive(Debug, Default)]
pub struct EditorSession {
    rows: Vec<(CellRef, String)>,
    staged: Option<(String, String)>,
    confirmed: bool,
}

impl EditorSession {
    /// Open a session over the stored mapping
    ///
    /// A missing store document starts an empty session; a corrupt document
    /// is an error the operator must see. The gate starts unconfirmed.
    pub fn open(store: &MappingStore) -> Result<Self> {
        let mapping = match store.load() {
            Ok(mapping) => mapping,
            Err(Error::MappingNotFound(_)) => FieldMapping::new(),
            Err(e) => return Err(e),
        };
        Ok(Self::with_mapping(&mapping))
    }

    /// Start a session from an in-memory mapping (e.g. a detection draft)
    pub fn with_mapping(mapping: &FieldMapping) -> Self {
        Self {
            rows: mapping.iter().map(|(c, f)| (c, f.to_string())).collect(),
            staged: None,
            confirmed: false,
        }
    }

    /// Current rows, in editing order
    pub fn rows(&self) -> &[(CellRef, String)] {
        &self.rows
    }

    /// Add a row; the cell text is trimmed and validated, the field name may
    /// be any string including empty
    pub fn add_row(&mut self, cell_text: &str, field: &str) -> Result<CellRef> {
        let at = self.validate_ref(cell_text, None)?;
        self.rows.push((at, field.to_string()));
        Ok(at)
    }

    /// Delete the row for a cell reference; returns whether one existed
    pub fn delete_row(&mut self, at: CellRef) -> bool {
        let before = self.rows.len();
        self.rows.retain(|(c, _)| *c != at);
        self.rows.len() != before
    }

    /// Re-point a row at a different cell reference, in place
    pub fn edit_cell_ref(&mut self, old: CellRef, new_text: &str) -> Result<CellRef> {
        let index = self
            .rows
            .iter()
            .position(|(c, _)| *c == old)
            .ok_or_else(|| Error::InvalidCellRef(old.to_string()))?;
        let at = self.validate_ref(new_text, Some(index))?;
        self.rows[index].0 = at;
        Ok(at)
    }

    /// Replace a row's field name
    pub fn edit_field(&mut self, at: CellRef, field: &str) -> Result<()> {
        let row = self
            .rows
            .iter_mut()
            .find(|(c, _)| *c == at)
            .ok_or_else(|| Error::InvalidCellRef(at.to_string()))?;
        row.1 = field.to_string();
        Ok(())
    }

    /// Register a pending, not-yet-validated entry
    ///
    /// The entry is applied (with full validation) by the next
    /// [`commit`](Self::commit); [`discard`](Self::discard) drops it.
    pub fn stage(&mut self, cell_text: &str, field: &str) {
        self.staged = Some((cell_text.to_string(), field.to_string()));
    }

    /// Commit the session: apply any staged edit, persist via the store, and
    /// flip the confirmation gate
    ///
    /// A staged edit that fails validation fails the whole commit; the gate
    /// stays unconfirmed and the store is untouched.
    pub fn commit(&mut self, store: &MappingStore) -> Result<FieldMapping> {
        if let Some((cell_text, field)) = self.staged.take() {
            self.add_row(&cell_text, &field)?;
        }

        let mapping: FieldMapping = self
            .rows
            .iter()
            .map(|(c, f)| (*c, f.trim().to_string()))
            .collect();
        store.save(&mapping)?;
        self.confirmed = true;
        Ok(mapping)
    }

    /// Close the session without saving; pending edits are dropped and the
    /// gate stays as it was
    pub fn discard(&mut self) {
        self.staged = None;
    }

    /// Whether this session's mapping has been committed (the generation gate)
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    fn validate_ref(&self, cell_text: &str, skip_row: Option<usize>) -> Result<CellRef> {
        let at = CellRef::parse(cell_text.trim())?;
        let duplicate = self
            .rows
            .iter()
            .enumerate()
            .any(|(i, (c, _))| Some(i) != skip_row && *c == at);
        if duplicate {
            return Err(Error::DuplicateCellRef(at.to_string()));
        }
        Ok(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(s: &str) -> CellRef {
        CellRef::parse(s).unwrap()
    }

    fn temp_store() -> (tempfile::TempDir, MappingStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MappingStore::for_dataset(&dir.path().join("d.xlsx")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_add_row_validates_syntax() {
        let mut session = EditorSession::default();
        assert!(session.add_row("C3", "姓名").is_ok());

        for bad in ["c3", "3C", "", "C", "3"] {
            let err = session.add_row(bad, "x").unwrap_err();
            assert!(matches!(err, Error::InvalidCellRef(_)), "{bad:?}: {err:?}");
        }
        // Trimmed before validation
        assert!(session.add_row(" D4 ", "x").is_ok());
    }

    #[test]
    fn test_add_row_rejects_duplicate() {
        let mut session = EditorSession::default();
        session.add_row("C3", "姓名").unwrap();

        let err = session.add_row("C3", "学号").unwrap_err();
        assert!(matches!(err, Error::DuplicateCellRef(ref c) if c == "C3"));
        assert_eq!(session.rows().len(), 1);
        assert_eq!(session.rows()[0].1, "姓名");
    }

    #[test]
    fn test_empty_field_name_is_allowed() {
        let mut session = EditorSession::default();
        session.add_row("D5", "").unwrap();
        assert_eq!(session.rows()[0].1, "");
    }

    #[test]
    fn test_edit_cell_ref_checks_other_rows_only() {
        let mut session = EditorSession::default();
        session.add_row("C3", "a").unwrap();
        session.add_row("D4", "b").unwrap();

        // Re-pointing at an address held by another row is a duplicate
        let err = session.edit_cell_ref(at("D4"), "C3").unwrap_err();
        assert!(matches!(err, Error::DuplicateCellRef(_)));

        // Re-writing a row's own address is fine
        session.edit_cell_ref(at("D4"), "D4").unwrap();
        session.edit_cell_ref(at("D4"), "E5").unwrap();
        assert_eq!(session.rows()[1].0, at("E5"));
    }

    #[test]
    fn test_commit_persists_and_confirms() {
        let (_dir, store) = temp_store();
        let mut session = EditorSession::open(&store).unwrap();
        assert!(!session.is_confirmed());

        session.add_row("C3", "姓名").unwrap();
        let mapping = session.commit(&store).unwrap();
        assert!(session.is_confirmed());
        assert_eq!(store.load().unwrap(), mapping);
    }

    #[test]
    fn test_staged_edit_is_applied_on_commit() {
        let (_dir, store) = temp_store();
        let mut session = EditorSession::open(&store).unwrap();
        session.stage("C3", "姓名");

        let mapping = session.commit(&store).unwrap();
        assert_eq!(mapping.get(at("C3")), Some("姓名"));
    }

    #[test]
    fn test_invalid_staged_edit_fails_commit() {
        let (_dir, store) = temp_store();
        let mut session = EditorSession::open(&store).unwrap();
        session.add_row("C3", "姓名").unwrap();
        session.stage("not-a-cell", "x");

        let err = session.commit(&store).unwrap_err();
        assert!(matches!(err, Error::InvalidCellRef(_)));
        assert!(!session.is_confirmed());
        // Nothing was persisted
        assert!(matches!(store.load(), Err(Error::MappingNotFound(_))));
    }

    #[test]
    fn test_discard_drops_staged_edit() {
        let (_dir, store) = temp_store();
        let mut session = EditorSession::open(&store).unwrap();
        session.stage("C3", "姓名");
        session.discard();

        let mapping = session.commit(&store).unwrap();
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_open_loads_stored_rows() {
        let (_dir, store) = temp_store();
        let mut mapping = FieldMapping::new();
        mapping.set(at("B2"), "学号");
        store.save(&mapping).unwrap();

        let session = EditorSession::open(&store).unwrap();
        assert_eq!(session.rows(), [(at("B2"), "学号".to_string())]);
        assert!(!session.is_confirmed());
    }
}
