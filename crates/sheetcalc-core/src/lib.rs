//! sheetcalc-core - UI-agnostic workbook model + storage.

pub mod document;
pub mod error;
pub mod storage;

pub use document::{GridDimensions, Workbook};
pub use error::{Result, SheetError};

pub use sheetcalc_engine::engine::{Cell, CellRef, Value};
