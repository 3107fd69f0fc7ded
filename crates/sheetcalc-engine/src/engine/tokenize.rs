//! Formula tokenization.
//!
//! A formula is split on the operator characters `+ - * / ( )`. Each operator
//! becomes its own token and the text between operators becomes an operand,
//! uppercased so `a1` and `A1` name the same cell.
//!
//! There is no escaping: an operator character always splits, even where a
//! user might have meant it as part of a larger operand.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// One of the fixed operator characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    OpenParen,
    CloseParen,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        match symbol {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Sub),
            "*" => Some(Operator::Mul),
            "/" => Some(Operator::Div),
            "(" => Some(Operator::OpenParen),
            ")" => Some(Operator::CloseParen),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::OpenParen => "(",
            Operator::CloseParen => ")",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Operand(String),
    Operator(Operator),
}

impl Token {
    pub fn as_str(&self) -> &str {
        match self {
            Token::Operand(s) => s,
            Token::Operator(op) => op.symbol(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn operator_re() -> &'static Regex {
    static OPERATOR_RE: OnceLock<Regex> = OnceLock::new();
    OPERATOR_RE.get_or_init(|| Regex::new(r"[-+*/()]").expect("operator regex must compile"))
}

/// Split a formula into operand and operator tokens, left to right.
///
/// A single leading `=` is stripped. Operands are trimmed and uppercased;
/// empty operands (between adjacent operators) are dropped.
pub fn tokenize(formula: &str) -> Vec<Token> {
    let body = formula.strip_prefix('=').unwrap_or(formula);
    let mut tokens = Vec::new();
    let mut last = 0;

    for m in operator_re().find_iter(body) {
        push_operand(&mut tokens, &body[last..m.start()]);
        if let Some(op) = Operator::from_symbol(m.as_str()) {
            tokens.push(Token::Operator(op));
        }
        last = m.end();
    }
    push_operand(&mut tokens, &body[last..]);

    tokens
}

fn push_operand(tokens: &mut Vec<Token>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        tokens.push(Token::Operand(text.to_uppercase()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(formula: &str) -> Vec<String> {
        tokenize(formula).iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_empty_formula_has_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("=").is_empty());
    }

    #[test]
    fn test_tokenize_references() {
        assert_eq!(strings("=A1+A2"), vec!["A1", "+", "A2"]);
    }

    #[test]
    fn test_tokenize_uppercases_operands() {
        assert_eq!(
            tokenize("=a1*b2"),
            vec![
                Token::Operand("A1".into()),
                Token::Operator(Operator::Mul),
                Token::Operand("B2".into()),
            ]
        );
    }

    #[test]
    fn test_tokenize_keeps_every_operator() {
        assert_eq!(
            strings("=(A1-2)/B3"),
            vec!["(", "A1", "-", "2", ")", "/", "B3"]
        );
    }

    #[test]
    fn test_tokenize_drops_empty_operands_between_operators() {
        assert_eq!(strings("=A1+-3"), vec!["A1", "+", "-", "3"]);
        assert_eq!(strings("=A1 + A2"), vec!["A1", "+", "A2"]);
    }

    #[test]
    fn test_only_leading_equals_is_stripped() {
        assert_eq!(strings("==A1"), vec!["=A1"]);
        assert_eq!(strings("A1+A2"), vec!["A1", "+", "A2"]);
    }
}
