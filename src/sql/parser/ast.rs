/// Alteration kinds for ALTER TABLE
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlterKind {
    Add,
    Drop,
}

/// Parsed statement definitions
///
/// Database and table names are already lowercased by the parser; column
/// names and literal values pass through exactly as written.
#[derive(Debug, PartialEq)]
pub enum Statement {
    /// USE database
    Use { database: String },
    /// CREATE DATABASE database
    CreateDatabase { name: String },
    /// DROP DATABASE database
    DropDatabase { name: String },
    /// CREATE TABLE table [(col, ...)]
    CreateTable { name: String, columns: Vec<String> },
    /// DROP TABLE table
    DropTable { name: String },
    /// ALTER TABLE table ADD|DROP col
    AlterTable {
        table: String,
        kind: AlterKind,
        column: String,
    },
    /// INSERT INTO table VALUES (v, ...)
    Insert { table: String, values: Vec<String> },
    /// SELECT cols FROM table [WHERE condition]
    Select {
        table: String,
        columns: Vec<String>,
        condition: Option<String>,
    },
    /// UPDATE table SET col = value, ... WHERE condition
    Update {
        table: String,
        assignments: Vec<(String, String)>,
        condition: String,
    },
    /// DELETE FROM table WHERE condition
    Delete { table: String, condition: String },
    /// JOIN table AND table ON col AND col
    Join {
        left: String,
        right: String,
        left_column: String,
        right_column: String,
    },
}
