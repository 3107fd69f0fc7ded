//! Storage: `.grd` text files, JSON snapshots and Markdown export.

mod md;
mod parser;
mod snapshot;
mod writer;

pub use md::{markdown_content, write_markdown};
pub use parser::{GrdEntry, parse_grd, parse_grd_content};
pub use snapshot::{Snapshot, read_snapshot, write_snapshot};
pub use writer::{write_grd, write_grd_content};

use std::path::Path;

/// On-disk workbook formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// Formula text per cell; derived state is rebuilt on load.
    Grd,
    /// Every cell field, as stored.
    Json,
}

impl Format {
    /// Pick a format from the file extension (`.json` for snapshots, `.grd` otherwise).
    pub fn from_path(path: &Path) -> Format {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Grd,
        }
    }
}
