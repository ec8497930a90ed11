//! Condition engine - parses a boolean filter expression into a binary tree
//! and evaluates it against rows

use std::cmp::Ordering;
use std::fmt::Display;

use crate::error::{Error, Result};
use crate::sql::types::Value;

/// Logical connectives joining two sub-conditions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogicalOp {
    And,
    Or,
}

/// Comparison operators, tried longest-first so that `>=` wins over `>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
    Like,
}

const COMPARE_OPS: [(CompareOp, &str); 7] = [
    (CompareOp::Eq, "=="),
    (CompareOp::Ne, "!="),
    (CompareOp::Ge, ">="),
    (CompareOp::Le, "<="),
    (CompareOp::Gt, ">"),
    (CompareOp::Lt, "<"),
    (CompareOp::Like, "LIKE"),
];

/// A parsed boolean filter expression
///
/// Built once per query and evaluated once per row; stateless and immutable
/// after construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    /// AND/OR over two subtrees
    Logical {
        op: LogicalOp,
        left: Box<ConditionNode>,
        right: Box<ConditionNode>,
    },
    /// A single column-vs-literal comparison
    Comparison {
        op: CompareOp,
        column: String,
        literal: String,
    },
}

impl ConditionNode {
    /// Parses a condition string into a condition tree.
    ///
    /// The leftmost ` AND `/` OR ` found at parenthesis depth 0 becomes the
    /// root, so logical operators are read left to right with no implicit
    /// AND-over-OR precedence; explicit parentheses change the grouping.
    pub fn parse(condition: &str) -> Result<ConditionNode> {
        let condition = strip_outer_parens(condition);
        if let Some((op, at, len)) = find_logical_split(condition) {
            let left = Self::parse(&condition[..at])?;
            let right = Self::parse(&condition[at + len..])?;
            return Ok(ConditionNode::Logical {
                op,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        Self::parse_comparison(condition)
    }

    /// Parses a single comparison (no AND/OR at depth 0 remains)
    fn parse_comparison(condition: &str) -> Result<ConditionNode> {
        let condition = strip_outer_parens(condition);
        let upper = condition.to_ascii_uppercase();
        for (op, symbol) in COMPARE_OPS {
            let Some(at) = find_outside_quotes(&upper, symbol) else {
                continue;
            };
            let column = condition[..at].trim();
            let rest = condition[at + symbol.len()..].trim();
            if column.is_empty() || rest.is_empty() {
                return Err(Error::Parse(format!(
                    "[Condition] Malformed comparison {}",
                    condition
                )));
            }
            return Ok(ConditionNode::Comparison {
                op,
                column: column.to_string(),
                literal: strip_quotes(rest).to_string(),
            });
        }
        Err(Error::Parse(format!(
            "[Condition] No recognizable operator in {}",
            condition
        )))
    }

    /// Evaluates the tree against one row, given the table's column names.
    ///
    /// Both children of a logical node are always evaluated, so AND/OR act as
    /// pure set operations on independently-computed per-row matches. Column
    /// names resolve by exact match; an absent column never matches (callers
    /// pre-validate column names, this path is only a safety net).
    pub fn evaluate(&self, row: &[String], columns: &[String]) -> bool {
        match self {
            ConditionNode::Logical { op, left, right } => {
                let l = left.evaluate(row, columns);
                let r = right.evaluate(row, columns);
                match op {
                    LogicalOp::And => l && r,
                    LogicalOp::Or => l || r,
                }
            }
            ConditionNode::Comparison { op, column, literal } => {
                let Some(index) = columns.iter().position(|c| c == column) else {
                    return false;
                };
                let Some(cell) = row.get(index) else {
                    return false;
                };
                match op {
                    CompareOp::Eq => Value::cells_equal(cell, literal),
                    CompareOp::Ne => !Value::cells_equal(cell, literal),
                    CompareOp::Gt => {
                        matches!(Value::order_cells(cell, literal), Some(Ordering::Greater))
                    }
                    CompareOp::Lt => {
                        matches!(Value::order_cells(cell, literal), Some(Ordering::Less))
                    }
                    CompareOp::Ge => matches!(
                        Value::order_cells(cell, literal),
                        Some(Ordering::Greater | Ordering::Equal)
                    ),
                    CompareOp::Le => matches!(
                        Value::order_cells(cell, literal),
                        Some(Ordering::Less | Ordering::Equal)
                    ),
                    CompareOp::Like => like_match(cell, literal),
                }
            }
        }
    }
}

impl Display for ConditionNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionNode::Logical { op, left, right } => {
                let op = match op {
                    LogicalOp::And => "AND",
                    LogicalOp::Or => "OR",
                };
                write!(f, "({} {} {})", left, op, right)
            }
            ConditionNode::Comparison { op, column, literal } => {
                let symbol = COMPARE_OPS
                    .iter()
                    .find(|(o, _)| o == op)
                    .map(|(_, s)| *s)
                    .unwrap_or("?");
                write!(f, "{} {} {}", column, symbol, literal)
            }
        }
    }
}

/// Finds the leftmost ` AND `/` OR ` at parenthesis depth 0 and outside
/// single-quoted literals, returning the operator, its byte offset, and its
/// length
fn find_logical_split(condition: &str) -> Option<(LogicalOp, usize, usize)> {
    let upper = condition.to_ascii_uppercase();
    let mut depth = 0i32;
    let mut in_quotes = false;
    for (i, c) in upper.char_indices() {
        match c {
            '\'' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => depth -= 1,
            _ => {}
        }
        if depth != 0 || in_quotes {
            continue;
        }
        if upper[i..].starts_with(" AND ") {
            return Some((LogicalOp::And, i, " AND ".len()));
        }
        if upper[i..].starts_with(" OR ") {
            return Some((LogicalOp::Or, i, " OR ".len()));
        }
    }
    None
}

/// Finds the leftmost occurrence of `symbol` outside single-quoted literals
fn find_outside_quotes(upper: &str, symbol: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (i, c) in upper.char_indices() {
        if c == '\'' {
            in_quotes = !in_quotes;
            continue;
        }
        if !in_quotes && upper[i..].starts_with(symbol) {
            return Some(i);
        }
    }
    None
}

/// Strips a fully-wrapping outer parenthesis pair (repeatedly), leaving
/// nested sub-expression parentheses intact
fn strip_outer_parens(expr: &str) -> &str {
    let expr = expr.trim();
    if !expr.starts_with('(') || !expr.ends_with(')') {
        return expr;
    }
    let inner = &expr[1..expr.len() - 1];
    let mut depth = 0i32;
    for b in inner.bytes() {
        match b {
            b'(' => depth += 1,
            b')' => depth -= 1,
            _ => {}
        }
        // The opening paren closed early, e.g. "(a == 1) AND (b == 2)"
        if depth < 0 {
            return expr;
        }
    }
    strip_outer_parens(inner)
}

/// Strips one pair of surrounding single quotes, if present
fn strip_quotes(literal: &str) -> &str {
    if literal.len() >= 2 && literal.starts_with('\'') && literal.ends_with('\'') {
        &literal[1..literal.len() - 1]
    } else {
        literal
    }
}

/// Case-insensitive glob match where `%` matches any run of characters and
/// `_` matches exactly one character
fn like_match(value: &str, pattern: &str) -> bool {
    fn glob(v: &[char], p: &[char]) -> bool {
        match p.first() {
            None => v.is_empty(),
            Some('%') => glob(v, &p[1..]) || (!v.is_empty() && glob(&v[1..], p)),
            Some('_') => !v.is_empty() && glob(&v[1..], &p[1..]),
            Some(c) => v.first() == Some(c) && glob(&v[1..], &p[1..]),
        }
    }
    let value: Vec<char> = value.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    glob(&value, &pattern)
}
