use std::fmt::Display;

/// Custom Result type for tabdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for tabdb
///
/// Every variant is recovered at the statement boundary and rendered as an
/// `[ERROR] ...` response; none are fatal to the server process.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed statement, condition or value-list syntax
    Parse(String),
    /// Unknown table/column, duplicate column, or an illegal schema change
    Schema(String),
    /// Wrong number of inserted values
    Arity(String),
    /// Statement rejected by design (e.g. unconditional delete)
    Consistency(String),
    /// Internal error (storage I/O, corrupt state)
    Internal(String),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Internal(value.to_string())
    }
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "{}", err),
            Error::Schema(err) => write!(f, "{}", err),
            Error::Arity(err) => write!(f, "{}", err),
            Error::Consistency(err) => write!(f, "{}", err),
            Error::Internal(err) => write!(f, "internal error {}", err),
        }
    }
}
