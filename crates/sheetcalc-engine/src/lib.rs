//! sheetcalc_engine - Spreadsheet calculation engine.

pub mod engine;
