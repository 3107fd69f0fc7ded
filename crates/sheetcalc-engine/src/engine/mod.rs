//! Spreadsheet engine API.
//!
//! This module provides the calculation core of the spreadsheet:
//!
//! - [`Cell`], [`Grid`] - Data structures for cell storage
//! - [`CellRef`] - Cell reference parsing (A1 notation ↔ row/col indices)
//! - [`Value`], [`CellError`] - Computed cell contents
//! - [`tokenize`] - Split a formula into operand/operator tokens
//! - [`resolve_inputs`] - Find the cells a formula reads from
//! - [`find_cycle_members`] - Circular dependency detection
//! - [`evaluate`] - Compute a cell's value from its formula
//! - [`format_number`] - Format values for display

mod cell;
mod cell_ref;
mod cycle;
mod deps;
mod eval;
mod format;
mod tokenize;
mod value;

pub use cell::{Cell, Grid, blank_grid, is_live_formula};
pub use cell_ref::{CellRef, is_location_token};
pub use cycle::find_cycle_members;
pub use deps::resolve_inputs;
pub use eval::{EvalError, EvalResult, evaluate, evaluate_formula};
pub use format::{format_number, format_value};
pub use tokenize::{Operator, Token, tokenize};
pub use value::{CellError, Value, parse_number};
