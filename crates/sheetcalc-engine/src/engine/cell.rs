//! Cell data structures for the spreadsheet grid.
//!
//! - [`Cell`] - A cell with its formula text, computed value, and both sides
//!   of its dependency edges
//! - [`Grid`] - Dense storage for every addressable cell, in row-major order

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::cell_ref::CellRef;
use super::value::Value;

/// A cell in the spreadsheet grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub location: CellRef,
    /// Raw text as entered. Empty means no formula.
    pub formula: String,
    pub value: Value,
    /// Cells this cell's formula reads from.
    pub inputs: IndexSet<CellRef>,
    /// Cells whose formulas read from this cell.
    pub outputs: IndexSet<CellRef>,
    /// False while the cell is on, or feeds into, a circular reference.
    pub valid: bool,
}

impl Cell {
    pub fn new_blank(location: CellRef) -> Cell {
        Cell {
            location,
            formula: String::new(),
            value: Value::empty(),
            inputs: IndexSet::new(),
            outputs: IndexSet::new(),
            valid: true,
        }
    }

    /// True when the formula starts with `=` and is recomputed from its inputs.
    pub fn is_live(&self) -> bool {
        is_live_formula(&self.formula)
    }

    /// True when the cell holds neither a formula nor a value.
    pub fn is_blank(&self) -> bool {
        self.formula.is_empty() && self.value.is_empty()
    }
}

/// Whether formula text is interpreted as an expression rather than a literal.
pub fn is_live_formula(formula: &str) -> bool {
    formula.starts_with('=')
}

/// Location-keyed storage for every cell of the sheet.
pub type Grid = IndexMap<CellRef, Cell>;

/// Build a grid with a blank cell at every location, in row-major order.
pub fn blank_grid(columns: usize, rows: usize) -> Grid {
    let mut grid = Grid::with_capacity(columns * rows);
    for row in 0..rows {
        for col in 0..columns {
            let location = CellRef::new(col, row);
            grid.insert(location.clone(), Cell::new_blank(location));
        }
    }
    grid
}
