//! Formula evaluation.
//!
//! Tokens are combined strictly left to right with no operator precedence:
//! every operator applies to the running result so far. References are
//! resolved by evaluating the referenced cell.
//!
//! Numbers combine arithmetically. Text (anything empty or non-numeric)
//! only supports `+`, which concatenates; `-`, `*` and `/` on text are errors.
//! Division by zero is not an error and yields an infinite or NaN number.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::deps::reference_in_grid;
use super::format::format_number;
use super::tokenize::{Operator, Token, tokenize};
use super::value::{CellError, Value, parse_number};
use super::{Cell, CellRef, Grid};

/// Ways evaluating a single cell can fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Circular reference through {0}")]
    Cycle(CellRef),

    #[error("Cannot apply '{op}' to text")]
    UnsupportedCombination { op: Operator },

    #[error("Unsupported operator: '{0}'")]
    UnsupportedOperator(Operator),

    #[error("Referenced cell holds {0}")]
    Upstream(CellError),
}

impl EvalError {
    /// The marker stored in a cell whose evaluation failed.
    pub fn cell_error(&self) -> CellError {
        match self {
            EvalError::Cycle(_) => CellError::Cycle,
            EvalError::UnsupportedCombination { .. } => CellError::Value,
            EvalError::UnsupportedOperator(_) => CellError::Operator,
            EvalError::Upstream(err) => *err,
        }
    }
}

pub type EvalResult = std::result::Result<Value, EvalError>;

/// Compute a cell's value.
///
/// Cells without a live formula evaluate to their stored value. Referenced
/// cells are evaluated recursively; a reference back into a cell already
/// being evaluated, or into a cell flagged invalid, fails with
/// [`EvalError::Cycle`] instead of recursing.
pub fn evaluate(cell: &Cell, grid: &Grid) -> EvalResult {
    Evaluator::new(grid).eval_cell(cell)
}

/// Evaluate free-standing formula text against the grid without storing it.
pub fn evaluate_formula(formula: &str, grid: &Grid) -> EvalResult {
    if !formula.starts_with('=') {
        return Ok(literal(formula));
    }
    Evaluator::new(grid).eval_tokens(&tokenize(formula))
}

/// State for one top-level evaluation: the cells currently being evaluated
/// and the results of cells already evaluated in this pass.
struct Evaluator<'a> {
    grid: &'a Grid,
    visiting: HashSet<CellRef>,
    memo: HashMap<CellRef, EvalResult>,
}

impl<'a> Evaluator<'a> {
    fn new(grid: &'a Grid) -> Self {
        Evaluator {
            grid,
            visiting: HashSet::new(),
            memo: HashMap::new(),
        }
    }

    fn eval_cell(&mut self, cell: &Cell) -> EvalResult {
        if !cell.is_live() {
            return Ok(cell.value.clone());
        }
        if !cell.valid || !self.visiting.insert(cell.location.clone()) {
            return Err(EvalError::Cycle(cell.location.clone()));
        }

        let result = self.eval_tokens(&tokenize(&cell.formula));

        self.visiting.remove(&cell.location);
        result
    }

    fn eval_reference(&mut self, cell_ref: &CellRef) -> EvalResult {
        if let Some(result) = self.memo.get(cell_ref) {
            return result.clone();
        }
        let grid = self.grid;
        let result = match grid.get(cell_ref) {
            Some(cell) => self.eval_cell(cell),
            None => Ok(Value::empty()),
        };
        self.memo.insert(cell_ref.clone(), result.clone());
        result
    }

    fn eval_tokens(&mut self, tokens: &[Token]) -> EvalResult {
        let mut result: Option<Value> = None;
        let mut operation: Option<Operator> = None;

        for token in tokens {
            match token {
                Token::Operator(op) => operation = Some(*op),
                Token::Operand(text) => {
                    let operand = match reference_in_grid(text, self.grid) {
                        Some(cell_ref) => self.eval_reference(&cell_ref)?,
                        None => literal(text),
                    };
                    result = Some(combine(result, operation, operand)?);
                }
            }
        }

        Ok(result.unwrap_or_default())
    }
}

/// A literal operand: a number if it parses as one, text otherwise.
fn literal(text: &str) -> Value {
    match parse_number(text) {
        Some(n) => Value::Number(n),
        None => Value::Text(text.to_string()),
    }
}

fn combine(left: Option<Value>, operation: Option<Operator>, right: Value) -> EvalResult {
    if let Value::Error(err) = right {
        return Err(EvalError::Upstream(err));
    }

    let left = match (left, operation) {
        (None, None) | (None, Some(Operator::Add)) => return Ok(right),
        (None, Some(Operator::Sub | Operator::Mul | Operator::Div)) => Value::Number(0.0),
        (None, Some(op)) => return Err(EvalError::UnsupportedOperator(op)),
        (Some(left), _) => left,
    };
    let op = operation.unwrap_or(Operator::Add);

    if matches!(op, Operator::OpenParen | Operator::CloseParen) {
        return Err(EvalError::UnsupportedOperator(op));
    }

    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok(Value::Number(match op {
            Operator::Add => a + b,
            Operator::Sub => a - b,
            Operator::Mul => a * b,
            Operator::Div => a / b,
            Operator::OpenParen | Operator::CloseParen => {
                return Err(EvalError::UnsupportedOperator(op));
            }
        })),
        _ if op == Operator::Add => Ok(Value::Text(format!(
            "{}{}",
            as_text(&left),
            as_text(&right)
        ))),
        _ => Err(EvalError::UnsupportedCombination { op }),
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Number(n) => format_number(*n),
        Value::Error(err) => err.marker().to_string(),
    }
}
