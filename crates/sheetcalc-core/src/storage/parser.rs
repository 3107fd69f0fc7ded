//! Parser for .grd file format

use crate::error::{Result, SheetError};
use sheetcalc_engine::engine::CellRef;
use std::fs;
use std::path::Path;

/// One `LOCATION: text` line of a .grd file.
#[derive(Clone, Debug, PartialEq)]
pub struct GrdEntry {
    /// 1-based line number the entry came from
    pub line: usize,
    pub cell_ref: CellRef,
    /// Cell text exactly as it would be typed (formulas keep their `=`)
    pub text: String,
}

/// Parse a .grd file into its entries, in file order
pub fn parse_grd(path: &Path) -> Result<Vec<GrdEntry>> {
    let content = fs::read_to_string(path)?;
    parse_grd_content(&content)
}

/// Parse .grd content from a string
pub fn parse_grd_content(content: &str) -> Result<Vec<GrdEntry>> {
    let mut entries = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Parse "CELLREF: TEXT" format
        let Some((cell_ref_str, value_str)) = line.split_once(':') else {
            return Err(SheetError::Parse {
                line: line_num + 1,
                message: "Expected 'CELLREF: TEXT' format".to_string(),
            });
        };

        let cell_ref_str = cell_ref_str.trim();
        let cell_ref = CellRef::from_str(cell_ref_str).ok_or_else(|| SheetError::Parse {
            line: line_num + 1,
            message: format!("Invalid cell reference: {}", cell_ref_str),
        })?;

        entries.push(GrdEntry {
            line: line_num + 1,
            cell_ref,
            text: parse_cell_text(value_str.trim(), line_num + 1)?,
        });
    }

    Ok(entries)
}

/// Quoted text is unescaped; bare text is taken verbatim.
fn parse_cell_text(value: &str, line_num: usize) -> Result<String> {
    if let Some(quoted) = value.strip_prefix('"') {
        let Some(inner) = quoted.strip_suffix('"') else {
            return Err(SheetError::Parse {
                line: line_num,
                message: "Unterminated quoted text".to_string(),
            });
        };
        return Ok(unescape_grd_text(inner));
    }
    Ok(value.to_string())
}

fn unescape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some('n') => out.push('\n'),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
