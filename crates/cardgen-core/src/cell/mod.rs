//! Cell references, spans, and values

mod reference;
mod value;

pub use reference::{CellRef, CellSpan};
pub use value::CellValue;
