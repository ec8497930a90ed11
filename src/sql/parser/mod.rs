//! Statement parser - recognizes a statement by its leading keyword and
//! extracts its parts; WHERE text is carried verbatim for the condition engine

use crate::error::{Error, Result};

pub mod ast;

use ast::{AlterKind, Statement};

/// Statement parser over one protocol line (semicolon already stripped)
pub struct Parser<'a> {
    input: &'a str,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given statement text
    pub fn new(input: &'a str) -> Self {
        Parser { input }
    }

    /// Parses the statement based on its leading keyword
    pub fn parse(&self) -> Result<Statement> {
        let text = self.input.trim();
        if text.is_empty() {
            return Err(Error::Parse("[Parser] Empty command".to_string()));
        }
        let (first, rest) = split_word(text);
        match first.to_ascii_uppercase().as_str() {
            "USE" => Ok(Statement::Use {
                database: database_name(rest)?,
            }),
            "CREATE" => {
                let (kind, rest) = split_word(rest);
                match kind.to_ascii_uppercase().as_str() {
                    "DATABASE" => Ok(Statement::CreateDatabase {
                        name: database_name(rest)?,
                    }),
                    "TABLE" => self.parse_create_table(rest),
                    _ => Err(Error::Parse(format!(
                        "[Parser] Expected DATABASE or TABLE, got {}",
                        kind
                    ))),
                }
            }
            "DROP" => {
                let (kind, rest) = split_word(rest);
                match kind.to_ascii_uppercase().as_str() {
                    "DATABASE" => Ok(Statement::DropDatabase {
                        name: database_name(rest)?,
                    }),
                    "TABLE" => Ok(Statement::DropTable {
                        name: table_name(rest)?,
                    }),
                    _ => Err(Error::Parse(format!(
                        "[Parser] Expected DATABASE or TABLE, got {}",
                        kind
                    ))),
                }
            }
            "ALTER" => self.parse_alter(rest),
            "INSERT" => self.parse_insert(rest),
            "SELECT" => self.parse_select(rest),
            "UPDATE" => self.parse_update(rest),
            "DELETE" => self.parse_delete(rest),
            "JOIN" => self.parse_join(rest),
            _ => Err(Error::Parse(format!(
                "[Parser] Unrecognized statement {}",
                first
            ))),
        }
    }

    /// CREATE TABLE name [(col, col, ...)]
    fn parse_create_table(&self, rest: &str) -> Result<Statement> {
        let Some(open) = rest.find('(') else {
            return Ok(Statement::CreateTable {
                name: table_name(rest)?,
                columns: Vec::new(),
            });
        };
        let close = rest
            .rfind(')')
            .filter(|close| *close > open)
            .ok_or_else(|| Error::Parse("[Parser] Missing closing parenthesis".to_string()))?;
        let name = table_name(&rest[..open])?;
        let columns = rest[open + 1..close]
            .split(',')
            .map(str::trim)
            .filter(|col| !col.is_empty())
            .map(column_name)
            .collect::<Result<Vec<_>>>()?;
        Ok(Statement::CreateTable { name, columns })
    }

    /// ALTER TABLE name ADD|DROP col
    fn parse_alter(&self, rest: &str) -> Result<Statement> {
        let (keyword, rest) = split_word(rest);
        if !keyword.eq_ignore_ascii_case("TABLE") {
            return Err(Error::Parse(format!(
                "[Parser] Expected TABLE, got {}",
                keyword
            )));
        }
        let (table, rest) = split_word(rest);
        let (kind, rest) = split_word(rest);
        let kind = match kind.to_ascii_uppercase().as_str() {
            "ADD" => AlterKind::Add,
            "DROP" => AlterKind::Drop,
            _ => {
                return Err(Error::Parse(format!(
                    "[Parser] Expected ADD or DROP, got {}",
                    kind
                )));
            }
        };
        Ok(Statement::AlterTable {
            table: table_name(table)?,
            kind,
            column: column_name(rest.trim())?,
        })
    }

    /// INSERT INTO name VALUES (v, v, ...)
    fn parse_insert(&self, rest: &str) -> Result<Statement> {
        let (keyword, rest) = split_word(rest);
        if !keyword.eq_ignore_ascii_case("INTO") {
            return Err(Error::Parse(format!(
                "[Parser] Expected INTO, got {}",
                keyword
            )));
        }
        let (table, rest) = split_word(rest);
        let rest = rest.trim();
        if !rest.to_ascii_uppercase().starts_with("VALUES") {
            return Err(Error::Parse("[Parser] Expected VALUES".to_string()));
        }
        let list = rest["VALUES".len()..].trim();
        if !list.starts_with('(') || !list.ends_with(')') {
            return Err(Error::Parse(
                "[Parser] Expected parenthesized value list".to_string(),
            ));
        }
        Ok(Statement::Insert {
            table: table_name(table)?,
            values: split_quoted(&list[1..list.len() - 1], ','),
        })
    }

    /// SELECT cols FROM name [WHERE condition]
    fn parse_select(&self, rest: &str) -> Result<Statement> {
        let Some((column_text, rest)) = split_on_keyword(rest, "FROM") else {
            return Err(Error::Parse("[Parser] Expected FROM".to_string()));
        };
        let (table, condition) = match split_on_keyword(rest, "WHERE") {
            Some((table, condition)) => (table, Some(condition.to_string())),
            None => (rest, None),
        };
        let columns = if column_text.trim() == "*" {
            vec!["*".to_string()]
        } else {
            column_text
                .split(',')
                .map(str::trim)
                .map(column_name)
                .collect::<Result<Vec<_>>>()?
        };
        Ok(Statement::Select {
            table: table_name(table)?,
            columns,
            condition,
        })
    }

    /// UPDATE name SET col = value, ... WHERE condition
    fn parse_update(&self, rest: &str) -> Result<Statement> {
        let (table, rest) = split_word(rest);
        let (keyword, rest) = split_word(rest);
        if !keyword.eq_ignore_ascii_case("SET") {
            return Err(Error::Parse(format!(
                "[Parser] Expected SET, got {}",
                keyword
            )));
        }
        let Some((pair_text, condition)) = split_on_keyword(rest, "WHERE") else {
            return Err(Error::Parse("[Parser] Expected WHERE".to_string()));
        };
        let mut assignments = Vec::new();
        for pair in split_quoted(pair_text, ',') {
            let Some(eq) = pair.find('=') else {
                return Err(Error::Parse(format!(
                    "[Parser] Invalid name-value pair {}",
                    pair
                )));
            };
            let column = column_name(pair[..eq].trim())?;
            let value = pair[eq + 1..].trim().to_string();
            if value.is_empty() {
                return Err(Error::Parse(format!(
                    "[Parser] Invalid name-value pair {}",
                    pair
                )));
            }
            assignments.push((column, value));
        }
        if assignments.is_empty() {
            return Err(Error::Parse("[Parser] Expected name-value pairs".to_string()));
        }
        Ok(Statement::Update {
            table: table_name(table)?,
            assignments,
            condition: condition.to_string(),
        })
    }

    /// DELETE FROM name WHERE condition
    fn parse_delete(&self, rest: &str) -> Result<Statement> {
        let (keyword, rest) = split_word(rest);
        if !keyword.eq_ignore_ascii_case("FROM") {
            return Err(Error::Parse(format!(
                "[Parser] Expected FROM, got {}",
                keyword
            )));
        }
        let (table, rest) = split_word(rest);
        let (keyword, condition) = split_word(rest);
        if !keyword.eq_ignore_ascii_case("WHERE") {
            return Err(Error::Parse(format!(
                "[Parser] Expected WHERE, got {}",
                keyword
            )));
        }
        Ok(Statement::Delete {
            table: table_name(table)?,
            condition: condition.to_string(),
        })
    }

    /// JOIN name AND name ON col AND col
    fn parse_join(&self, rest: &str) -> Result<Statement> {
        let (left, rest) = split_word(rest);
        let (and, rest) = split_word(rest);
        let (right, rest) = split_word(rest);
        let (on, rest) = split_word(rest);
        let (left_column, rest) = split_word(rest);
        let (and2, rest) = split_word(rest);
        let (right_column, rest) = split_word(rest);
        if !and.eq_ignore_ascii_case("AND")
            || !on.eq_ignore_ascii_case("ON")
            || !and2.eq_ignore_ascii_case("AND")
            || !rest.trim().is_empty()
        {
            return Err(Error::Parse(
                "[Parser] Expected JOIN table AND table ON column AND column".to_string(),
            ));
        }
        Ok(Statement::Join {
            left: table_name(left)?,
            right: table_name(right)?,
            left_column: column_name(left_column)?,
            right_column: column_name(right_column)?,
        })
    }
}

/// Splits the leading whitespace-delimited word off `text`
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(i) => (&text[..i], text[i..].trim_start()),
        None => (text, ""),
    }
}

/// Finds `keyword` as a standalone word outside single quotes
/// (case-insensitive), returning the trimmed text before and after it
fn split_on_keyword<'t>(text: &'t str, keyword: &str) -> Option<(&'t str, &'t str)> {
    let upper = text.to_ascii_uppercase();
    let needle = format!(" {} ", keyword);
    let mut in_quotes = false;
    for (i, c) in upper.char_indices() {
        if c == '\'' {
            in_quotes = !in_quotes;
        }
        if !in_quotes && upper[i..].starts_with(&needle) {
            return Some((text[..i].trim(), text[i + needle.len()..].trim()));
        }
    }
    None
}

/// Splits on `separator` outside single-quoted runs, trimming each part
fn split_quoted(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in text.chars() {
        if c == '\'' {
            in_quotes = !in_quotes;
            current.push(c);
        } else if c == separator && !in_quotes {
            parts.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// Validates a plain alphanumeric name
fn plain_ident<'a>(name: &'a str, what: &str) -> Result<&'a str> {
    let name = name.trim();
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(name)
    } else {
        Err(Error::Parse(format!(
            "[Parser] Invalid {} name: must contain only letters and digits",
            what
        )))
    }
}

/// Database names are case-normalized to lowercase
fn database_name(name: &str) -> Result<String> {
    Ok(plain_ident(name, "database")?.to_lowercase())
}

/// Table names are case-normalized to lowercase
fn table_name(name: &str) -> Result<String> {
    Ok(plain_ident(name, "table")?.to_lowercase())
}

/// Column names keep their case; `Name` and `name` are distinct columns
fn column_name(name: &str) -> Result<String> {
    Ok(plain_ident(name, "column")?.to_string())
}
