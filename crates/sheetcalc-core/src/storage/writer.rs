//! Writer for .grd file format

use crate::document::Workbook;
use crate::error::Result;
use std::fs;
use std::path::Path;

/// Write a workbook's cell text to a .grd file
pub fn write_grd(path: &Path, workbook: &Workbook) -> Result<()> {
    let content = write_grd_content(workbook);
    fs::write(path, content)?;
    Ok(())
}

/// Write a workbook to a .grd format string.
///
/// Cells are written in row-major order, so loading replays edits in the
/// same order every time.
pub fn write_grd_content(workbook: &Workbook) -> String {
    let mut lines = vec!["# Sheetcalc Workbook".to_string()];

    for cell in workbook.cells() {
        // Skip empty cells
        if cell.formula.is_empty() {
            continue;
        }
        lines.push(format!(
            "{}: \"{}\"",
            cell.location,
            escape_grd_text(&cell.formula)
        ));
    }

    lines.join("\n") + "\n"
}

fn escape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::parse_grd_content;

    #[test]
    fn test_write_formula_and_literal() {
        let mut workbook = Workbook::default();
        workbook.set_formula_by_name("A1", "=A2+10").unwrap();
        workbook.set_formula_by_name("A2", "5").unwrap();
        let content = write_grd_content(&workbook);
        assert!(content.contains("A1: \"=A2+10\""));
        assert!(content.contains("A2: \"5\""));
    }

    #[test]
    fn test_skip_empty_cells() {
        let mut workbook = Workbook::default();
        workbook.set_formula_by_name("B1", "x").unwrap();
        let content = write_grd_content(&workbook);
        assert!(!content.contains("A1:"));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_sorted_output() {
        let mut workbook = Workbook::default();
        workbook.set_formula_by_name("B2", "3").unwrap();
        workbook.set_formula_by_name("A1", "1").unwrap();
        workbook.set_formula_by_name("B1", "2").unwrap();
        let content = write_grd_content(&workbook);
        let lines: Vec<_> = content.lines().skip(1).collect();
        assert!(lines[0].starts_with("A1"));
        assert!(lines[1].starts_with("B1"));
        assert!(lines[2].starts_with("B2"));
    }

    #[test]
    fn test_escaped_text_parses_back() {
        let mut workbook = Workbook::default();
        workbook.set_formula_by_name("C3", "say \"hi\"\\now").unwrap();
        let entries = parse_grd_content(&write_grd_content(&workbook)).unwrap();
        assert_eq!(entries[0].text, "say \"hi\"\\now");
    }
}
