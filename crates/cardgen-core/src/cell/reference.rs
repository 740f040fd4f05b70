//! Cell reference and span types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A single cell reference (e.g., "C3")
///
/// Mapping documents address template cells in plain A1 notation: one or more
/// uppercase letters followed by one or more digits, nothing else. Lowercase
/// letters and `$` markers are rejected, unlike general Excel references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., XFD=16383)
    pub col: u16,
}

impl CellRef {
    /// Create a new cell reference
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse a cell reference from strict A1 notation
    ///
    /// Accepts exactly the forms matching `^[A-Z]+\d+$`.
    ///
    /// # Examples
    /// ```
    /// use cardgen_core::CellRef;
    ///
    /// let at = CellRef::parse("C3").unwrap();
    /// assert_eq!(at.row, 2);
    /// assert_eq!(at.col, 2);
    ///
    /// assert!(CellRef::parse("c3").is_err());
    /// assert!(CellRef::parse("C").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.is_empty() {
            return Err(Error::InvalidCellRef(s.into()));
        }

        let mut pos = 0;
        while pos < bytes.len() && bytes[pos].is_ascii_uppercase() {
            pos += 1;
        }

        // Must have at least one letter, at least one digit, and nothing else
        if pos == 0 || pos == bytes.len() {
            return Err(Error::InvalidCellRef(s.into()));
        }
        if !bytes[pos..].iter().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidCellRef(s.into()));
        }

        let col = Self::letters_to_col(&s[..pos])?;
        let row_1based: u32 = s[pos..]
            .parse()
            .map_err(|_| Error::InvalidCellRef(s.into()))?;
        if row_1based == 0 || row_1based > MAX_ROWS {
            return Err(Error::InvalidCellRef(s.into()));
        }

        Ok(Self {
            row: row_1based - 1,
            col,
        })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn col_to_letters(col: u16) -> String {
        let mut result = String::new();
        let mut n = col as u32 + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert uppercase column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_col(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidCellRef(letters.into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_uppercase() {
                return Err(Error::InvalidCellRef(letters.into()));
            }
            col = col * 26 + (c as u32 - 'A' as u32 + 1);
            if col > MAX_COLS as u32 {
                return Err(Error::InvalidCellRef(letters.into()));
            }
        }

        Ok((col - 1) as u16)
    }

    /// The cell immediately to the right, if within sheet bounds
    pub fn right(&self) -> Option<CellRef> {
        if self.col + 1 < MAX_COLS {
            Some(CellRef::new(self.row, self.col + 1))
        } else {
            None
        }
    }

    /// The cell immediately below, if within sheet bounds
    pub fn below(&self) -> Option<CellRef> {
        if self.row + 1 < MAX_ROWS {
            Some(CellRef::new(self.row + 1, self.col))
        } else {
            None
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::col_to_letters(self.col), self.row + 1)
    }
}

impl FromStr for CellRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// Serialized as the A1 string so a mapping round-trips as a flat JSON object
impl Serialize for CellRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CellRefVisitor;

        impl Visitor<'_> for CellRefVisitor {
            type Value = CellRef;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a cell reference like C3")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<CellRef, E> {
                CellRef::parse(v).map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_str(CellRefVisitor)
    }
}

/// A rectangular span of cells (e.g., a merged region "B2:B3")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellSpan {
    /// Top-left cell
    pub start: CellRef,
    /// Bottom-right cell
    pub end: CellRef,
}

impl CellSpan {
    /// Create a new span, normalized so start is top-left
    pub fn new(a: CellRef, b: CellRef) -> Self {
        Self {
            start: CellRef::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellRef::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Parse from "B2:B3" notation; a bare reference is a single-cell span
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((a, b)) => Ok(Self::new(CellRef::parse(a)?, CellRef::parse(b)?)),
            None => {
                let at = CellRef::parse(s)?;
                Ok(Self::new(at, at))
            }
        }
    }

    /// Check whether a cell lies within the span
    pub fn contains(&self, at: CellRef) -> bool {
        at.row >= self.start.row
            && at.row <= self.end.row
            && at.col >= self.start.col
            && at.col <= self.end.col
    }

    /// Whether the span covers exactly one cell
    pub fn is_single(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for CellSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

impl FromStr for CellSpan {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
