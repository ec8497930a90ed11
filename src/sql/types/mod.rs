use std::{cmp::Ordering, fmt::Display};

/// Canonical text of the null marker stored in table cells
pub const NULL_MARKER: &str = "NULL";

/// A row is a fixed-width ordered sequence of text cells, one per column
pub type Row = Vec<String>;

/// Runtime value type decoded from a literal token or a table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Decodes a literal token: quoted text, boolean keyword, NULL keyword,
    /// integer, decimal, or bare text as a fallback.
    pub fn from_literal(literal: &str) -> Self {
        let literal = literal.trim();
        if literal.len() >= 2 && literal.starts_with('\'') && literal.ends_with('\'') {
            return Self::String(literal[1..literal.len() - 1].to_string());
        }
        if literal.eq_ignore_ascii_case("TRUE") {
            return Self::Boolean(true);
        }
        if literal.eq_ignore_ascii_case("FALSE") {
            return Self::Boolean(false);
        }
        if literal.eq_ignore_ascii_case(NULL_MARKER) {
            return Self::Null;
        }
        if let Ok(i) = literal.parse::<i64>() {
            return Self::Integer(i);
        }
        // Restrict floats to digit-led text so words like "inf" stay text
        if literal.chars().next().is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-') {
            if let Ok(f) = literal.parse::<f64>() {
                return Self::Float(f);
            }
        }
        Self::String(literal.to_string())
    }

    /// Coerces a literal token to the canonical cell text stored in a table:
    /// quotes stripped, boolean/NULL keywords normalized to uppercase, and
    /// numeric literals kept exactly as written.
    pub fn canonical_cell(literal: &str) -> String {
        match Self::from_literal(literal) {
            Value::Null => NULL_MARKER.to_string(),
            Value::Boolean(true) => "TRUE".to_string(),
            Value::Boolean(false) => "FALSE".to_string(),
            Value::String(s) => s,
            Value::Integer(_) | Value::Float(_) => literal.trim().to_string(),
        }
    }

    /// Case-insensitive cell equality. The stored NULL marker equals the
    /// literal NULL and nothing else.
    pub fn cells_equal(cell: &str, literal: &str) -> bool {
        let cell_null = cell.eq_ignore_ascii_case(NULL_MARKER);
        let literal_null = literal.eq_ignore_ascii_case(NULL_MARKER);
        if cell_null || literal_null {
            return cell_null && literal_null;
        }
        cell.eq_ignore_ascii_case(literal)
    }

    /// Ordering used by the `>` `<` `>=` `<=` operators: numeric when both
    /// sides parse as numbers, FALSE < TRUE when both are boolean literals,
    /// and no ordering otherwise.
    pub fn order_cells(cell: &str, literal: &str) -> Option<Ordering> {
        Self::from_literal(cell).partial_cmp(&Self::from_literal(literal))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "{}", NULL_MARKER),
            Value::Boolean(b) if *b => write!(f, "TRUE"),
            Value::Boolean(_) => write!(f, "FALSE"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
        }
    }
}

/// Mixed-type ordering: numbers compare numerically, booleans as
/// FALSE < TRUE; NULL and text take part in no ordering.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (_, _) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::Value;

    #[test]
    fn test_from_literal() {
        assert_eq!(Value::from_literal("'John'"), Value::String("John".to_string()));
        assert_eq!(Value::from_literal("  tRuE "), Value::Boolean(true));
        assert_eq!(Value::from_literal("FALSE"), Value::Boolean(false));
        assert_eq!(Value::from_literal("null"), Value::Null);
        assert_eq!(Value::from_literal("42"), Value::Integer(42));
        assert_eq!(Value::from_literal("-7"), Value::Integer(-7));
        assert_eq!(Value::from_literal("3.25"), Value::Float(3.25));
        assert_eq!(Value::from_literal("Bristol"), Value::String("Bristol".to_string()));
        // Quoted keywords stay text
        assert_eq!(Value::from_literal("'TRUE'"), Value::String("TRUE".to_string()));
    }

    #[test]
    fn test_canonical_cell() {
        assert_eq!(Value::canonical_cell("  'John'  "), "John");
        assert_eq!(Value::canonical_cell("true"), "TRUE");
        assert_eq!(Value::canonical_cell("False"), "FALSE");
        assert_eq!(Value::canonical_cell("nUlL"), "NULL");
        // Numeric text is stored exactly as written
        assert_eq!(Value::canonical_cell("10.50"), "10.50");
        assert_eq!(Value::canonical_cell("007"), "007");
    }

    #[test]
    fn test_cells_equal() {
        assert!(Value::cells_equal("Simon", "simon"));
        assert!(!Value::cells_equal("Simon", "Sion"));
        assert!(Value::cells_equal("NULL", "null"));
        // A stored NULL only equals the literal NULL
        assert!(!Value::cells_equal("NULL", "Simon"));
        assert!(!Value::cells_equal("Simon", "NULL"));
    }

    #[test]
    fn test_order_cells() {
        assert_eq!(Value::order_cells("20", "22"), Some(Ordering::Less));
        assert_eq!(Value::order_cells("3.5", "3"), Some(Ordering::Greater));
        assert_eq!(Value::order_cells("FALSE", "TRUE"), Some(Ordering::Less));
        // No implicit string ordering across incompatible types
        assert_eq!(Value::order_cells("abc", "20"), None);
        assert_eq!(Value::order_cells("abc", "abd"), None);
        assert_eq!(Value::order_cells("NULL", "20"), None);
    }
}
