//! Error types for Sheetcalc core.

use thiserror::Error;

/// Errors that can occur while editing, loading or saving a workbook
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Snapshot error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid cell reference: {0}")]
    InvalidLocation(String),

    #[error("No cell at {0}")]
    UnknownLocation(String),

    #[error("Dependency link {from} -> {to} is not mirrored")]
    BrokenLink { from: String, to: String },

    #[error("Invalid grid size: {columns} columns x {rows} rows")]
    InvalidDimensions { columns: usize, rows: usize },

    #[error("No file path set")]
    NoFilePath,
}

pub type Result<T> = std::result::Result<T, SheetError>;
