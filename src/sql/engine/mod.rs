//! Execution engine: turns parsed statements into storage calls and renders
//! the protocol responses

use std::fmt::{self, Display, Formatter};

use tracing::debug;

use crate::error::{Error, Result};
use crate::sql::parser::{Parser, ast::Statement};
use crate::storage::DatabaseManager;

/// Outcome of a successfully executed statement
#[derive(Debug, PartialEq)]
pub enum ResultSet {
    CreateDatabase { name: String },
    DropDatabase { name: String },
    UseDatabase { name: String },
    CreateTable { name: String },
    DropTable { name: String },
    AlterTable { name: String },
    Insert { id: u64 },
    Scan { columns: Vec<String>, rows: Vec<Vec<String>> },
    Update { count: usize },
    Delete { count: usize },
}

impl Display for ResultSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ResultSet::UseDatabase { name } => {
                write!(f, "[OK] Switched to database {}", name)
            }
            ResultSet::Scan { columns, rows } => {
                write!(f, "[OK]\n{}", columns.join("\t"))?;
                for row in rows {
                    write!(f, "\n{}", row.join("\t"))?;
                }
                Ok(())
            }
            _ => write!(f, "[OK]"),
        }
    }
}

/// One client's execution context: the shared storage root plus which
/// database the client has selected
pub struct Session {
    manager: DatabaseManager,
}

impl Session {
    pub fn new(manager: DatabaseManager) -> Session {
        Session { manager }
    }

    /// Executes one command line and renders the protocol response.
    /// Every failure becomes an `[ERROR]` line; this never panics.
    pub fn execute(&mut self, command: &str) -> String {
        match self.run(command) {
            Ok(result) => result.to_string(),
            Err(err) => format!("[ERROR] {}", err),
        }
    }

    fn run(&mut self, command: &str) -> Result<ResultSet> {
        let command = command.trim();
        if command.is_empty() {
            return Err(Error::Parse("Empty command".to_string()));
        }
        let Some(command) = command.strip_suffix(';') else {
            return Err(Error::Parse(
                "Semicolon missing at end of line".to_string(),
            ));
        };
        let statement = Parser::new(command).parse()?;
        debug!(?statement, "executing");

        match statement {
            Statement::Use { database } => {
                self.manager.use_database(&database)?;
                return Ok(ResultSet::UseDatabase { name: database });
            }
            Statement::CreateDatabase { name } => {
                self.manager.create_database(&name)?;
                return Ok(ResultSet::CreateDatabase { name });
            }
            Statement::DropDatabase { name } => {
                self.manager.drop_database(&name)?;
                return Ok(ResultSet::DropDatabase { name });
            }
            _ => {}
        }

        let db = self.manager.current().ok_or_else(|| {
            Error::Schema("No database selected. Use 'USE database' first".to_string())
        })?;
        match statement {
            Statement::CreateTable { name, columns } => db.create_table(&name, &columns),
            Statement::DropTable { name } => db.drop_table(&name),
            Statement::AlterTable { table, kind, column } => {
                db.alter_table(&table, kind, &column)
            }
            Statement::Insert { table, values } => db.insert_row(&table, &values),
            Statement::Select { table, columns, condition } => {
                db.select(&table, &columns, condition.as_deref())
            }
            Statement::Update { table, assignments, condition } => {
                db.update(&table, &assignments, &condition)
            }
            Statement::Delete { table, condition } => db.delete(&table, &condition),
            Statement::Join { left, right, left_column, right_column } => {
                db.join(&left, &right, &left_column, &right_column)
            }
            // USE / CREATE DATABASE / DROP DATABASE handled above
            _ => Err(Error::Internal(format!(
                "Unhandled statement {:?}",
                statement
            ))),
        }
    }
}
