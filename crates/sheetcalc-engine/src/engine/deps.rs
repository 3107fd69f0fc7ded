//! Dependency extraction from formula strings.
//!
//! Finds the cells a formula reads from. This is used to build the
//! dependency graph for propagation and cycle detection.
//!
//! Handles:
//! - Simple cell references: `A1`, `b2`
//! - Repeated references, collapsed to one input
//! - References to locations outside the grid, which are ignored

use indexmap::IndexSet;

use super::cell::{Grid, is_live_formula};
use super::cell_ref::{CellRef, is_location_token};
use super::tokenize::{Token, tokenize};
use super::value::parse_number;

/// Resolve the distinct grid locations a formula reads from, in order of
/// first appearance.
///
/// Only live formulas (starting with `=`) have inputs; literal text never
/// reads from other cells.
pub fn resolve_inputs(formula: &str, grid: &Grid) -> IndexSet<CellRef> {
    if !is_live_formula(formula) {
        return IndexSet::new();
    }

    tokenize(formula)
        .into_iter()
        .filter_map(|token| match token {
            Token::Operand(text) => reference_in_grid(&text, grid),
            Token::Operator(_) => None,
        })
        .collect()
}

/// The location an operand names, if it names an existing cell.
pub(crate) fn reference_in_grid(operand: &str, grid: &Grid) -> Option<CellRef> {
    if parse_number(operand).is_some() || !is_location_token(operand) {
        return None;
    }
    CellRef::from_str(operand).filter(|cell_ref| grid.contains_key(cell_ref))
}
