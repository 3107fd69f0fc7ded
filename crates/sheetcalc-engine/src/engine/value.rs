//! Computed cell values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error markers a cell can hold in place of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellError {
    /// The cell is on, or reads through, a circular reference.
    Cycle,
    /// Text was combined with `-`, `*` or `/`.
    Value,
    /// An operator the evaluator cannot combine (parentheses).
    Operator,
}

impl CellError {
    pub fn marker(&self) -> &'static str {
        match self {
            CellError::Cycle => "#CYCLE!",
            CellError::Value => "#VALUE!",
            CellError::Operator => "#ERROR!",
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// The content of a cell after evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Text(String),
    Number(#[serde(with = "number_repr")] f64),
    Error(CellError),
}

impl Value {
    pub fn empty() -> Value {
        Value::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Text(s) if s.is_empty())
    }

    /// Numeric reading of this value, if it has one.
    ///
    /// Text counts as numeric when it is non-empty and parses as a number;
    /// the empty string is always textual.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => parse_number(s),
            Value::Error(_) => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::empty()
    }
}

/// Parse a decimal number the way formulas read literals.
///
/// Surrounding whitespace is ignored. Only plain decimal forms are accepted
/// (`10`, `-2.5`, `.5`, `1e3`); word forms like `inf` or `NaN` are text.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let first = trimmed.chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '.' | '+' | '-')) {
        return None;
    }
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// JSON has no non-finite numbers, so those are written as words.
mod number_repr {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(n: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if n.is_finite() {
            serializer.serialize_f64(*n)
        } else {
            serializer.serialize_str(&crate::engine::format_number(*n))
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Finite(f64),
        Word(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Finite(n) => Ok(n),
            Repr::Word(word) => match word.as_str() {
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                "NaN" => Ok(f64::NAN),
                other => Err(D::Error::custom(format!("not a number: {other}"))),
            },
        }
    }
}
