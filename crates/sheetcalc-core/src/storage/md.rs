//! Markdown export functionality

use crate::document::Workbook;
use crate::error::Result;
use sheetcalc_engine::engine::CellRef;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Write the workbook's displayed values to a markdown file
pub fn write_markdown(path: &Path, workbook: &Workbook) -> Result<()> {
    fs::write(path, markdown_content(workbook))?;
    Ok(())
}

/// Render the smallest table covering every non-blank cell.
pub fn markdown_content(workbook: &Workbook) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", escape_markdown(&workbook.name));
    out.push('\n');

    let Some((min_row, min_col, max_row, max_col)) = find_grid_bounds(workbook) else {
        out.push_str("*Empty spreadsheet*\n");
        return out;
    };

    // Markdown table header with column letters
    out.push_str("|   |");
    for col in min_col..=max_col {
        let _ = write!(out, " {} |", CellRef::col_to_letters(col));
    }
    out.push('\n');

    out.push_str("|---|");
    for _ in min_col..=max_col {
        out.push_str("---|");
    }
    out.push('\n');

    for row in min_row..=max_row {
        let _ = write!(out, "| {} |", row + 1); // 1-based row numbers
        for col in min_col..=max_col {
            let display = workbook
                .display_value(&CellRef::new(col, row))
                .unwrap_or_default();
            if display.is_empty() {
                out.push_str("  |");
            } else {
                let _ = write!(out, " {} |", escape_markdown(&display));
            }
        }
        out.push('\n');
    }

    out
}

/// Find the bounds of the non-blank cells (min/max row/col)
fn find_grid_bounds(workbook: &Workbook) -> Option<(usize, usize, usize, usize)> {
    let mut bounds: Option<(usize, usize, usize, usize)> = None;
    for cell in workbook.cells().filter(|cell| !cell.is_blank()) {
        let CellRef { row, col } = cell.location;
        bounds = Some(match bounds {
            None => (row, col, row, col),
            Some((min_row, min_col, max_row, max_col)) => (
                min_row.min(row),
                min_col.min(col),
                max_row.max(row),
                max_col.max(col),
            ),
        });
    }
    bounds
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}
