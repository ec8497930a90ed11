//! Database - owns the name-to-table mapping for one database and implements
//! each statement's table-level semantics

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Error, Result};
use crate::sql::engine::ResultSet;
use crate::sql::parser::ast::AlterKind;
use crate::storage::table::{ID_COLUMN, Table};

/// File extension of persisted tables
const TABLE_FILE_EXT: &str = "tab";

/// One database: a directory of `.tab` files and the tables loaded from them
pub struct Database {
    name: String,
    path: PathBuf,
    tables: HashMap<String, Table>,
}

impl Database {
    /// Opens a database directory, loading every persisted table.
    /// Unreadable table files are skipped with a warning, never fatal.
    pub fn open(name: &str, path: PathBuf) -> Result<Database> {
        let mut db = Database {
            name: name.to_lowercase(),
            path,
            tables: HashMap::new(),
        };
        if !db.path.is_dir() {
            fs::create_dir_all(&db.path)?;
        }
        for entry in fs::read_dir(&db.path)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TABLE_FILE_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match fs::read_to_string(&path) {
                Ok(text) => {
                    let table = Table::deserialize(&stem.to_lowercase(), &text);
                    db.tables.insert(table.name().to_string(), table);
                }
                Err(err) => warn!(table = stem, %err, "skipping unreadable table file"),
            }
        }
        Ok(db)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::Schema(format!("Table {} does not exist", name)))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::Schema(format!("Table {} does not exist", name)))
    }

    fn table_file(&self, name: &str) -> PathBuf {
        self.path.join(format!("{}.{}", name, TABLE_FILE_EXT))
    }

    /// Creates an empty table and persists it immediately; on a persistence
    /// failure no in-memory entry is left behind
    pub fn create_table(&mut self, name: &str, columns: &[String]) -> Result<ResultSet> {
        if self.tables.contains_key(name) {
            return Err(Error::Schema(format!("Table {} already exists", name)));
        }
        let mut table = Table::new(name);
        for column in columns {
            table.add_column(column)?;
        }
        persist(&self.table_file(name), &table)?;
        self.tables.insert(name.to_string(), table);
        Ok(ResultSet::CreateTable {
            name: name.to_string(),
        })
    }

    /// Removes the in-memory entry and deletes the backing file
    pub fn drop_table(&mut self, name: &str) -> Result<ResultSet> {
        if !self.tables.contains_key(name) {
            return Err(Error::Schema(format!("Table {} does not exist", name)));
        }
        let file = self.table_file(name);
        if file.exists() {
            fs::remove_file(&file)?;
        }
        self.tables.remove(name);
        Ok(ResultSet::DropTable {
            name: name.to_string(),
        })
    }

    pub fn alter_table(&mut self, name: &str, kind: AlterKind, column: &str) -> Result<ResultSet> {
        let file = self.table_file(name);
        let table = self.table_mut(name)?;
        match kind {
            AlterKind::Add => table.add_column(column)?,
            AlterKind::Drop => table.drop_column(column)?,
        }
        persist(&file, table)?;
        Ok(ResultSet::AlterTable {
            name: name.to_string(),
        })
    }

    pub fn insert_row(&mut self, name: &str, values: &[String]) -> Result<ResultSet> {
        let file = self.table_file(name);
        let table = self.table_mut(name)?;
        let id = table.add_row(values)?;
        persist(&file, table)?;
        Ok(ResultSet::Insert { id })
    }

    /// Projects the requested columns (or all of them for `*`) from the rows
    /// matching the condition
    pub fn select(
        &self,
        name: &str,
        columns: &[String],
        condition: Option<&str>,
    ) -> Result<ResultSet> {
        let table = self.table(name)?;
        let star = columns.len() == 1 && columns[0] == "*";
        let indices: Vec<usize> = if star {
            (0..table.columns().len()).collect()
        } else {
            columns
                .iter()
                .map(|c| {
                    table
                        .column_index(c)
                        .ok_or_else(|| Error::Schema(format!("Attribute does not exist: {}", c)))
                })
                .collect::<Result<Vec<_>>>()?
        };
        let header = indices
            .iter()
            .map(|&i| table.columns()[i].clone())
            .collect();
        let rows = table
            .filter(condition)?
            .into_iter()
            .map(|r| indices.iter().map(|&i| table.rows()[r][i].clone()).collect())
            .collect();
        Ok(ResultSet::Scan { columns: header, rows })
    }

    pub fn update(
        &mut self,
        name: &str,
        assignments: &[(String, String)],
        condition: &str,
    ) -> Result<ResultSet> {
        let file = self.table_file(name);
        let table = self.table_mut(name)?;
        let count = table.update_rows(assignments, condition)?;
        persist(&file, table)?;
        Ok(ResultSet::Update { count })
    }

    pub fn delete(&mut self, name: &str, condition: &str) -> Result<ResultSet> {
        let file = self.table_file(name);
        let table = self.table_mut(name)?;
        let count = table.delete_rows(condition)?;
        persist(&file, table)?;
        Ok(ResultSet::Delete { count })
    }

    /// Full nested-loop equi-join: emits one combined row for every pair
    /// whose join cells are string-equal. The result carries a fresh
    /// sequential id plus both tables' non-id, non-join columns namespaced
    /// as `table.column`.
    pub fn join(
        &self,
        left: &str,
        right: &str,
        left_column: &str,
        right_column: &str,
    ) -> Result<ResultSet> {
        let left_table = self.table(left)?;
        let right_table = self.table(right)?;
        let left_index = left_table.column_index(left_column).ok_or_else(|| {
            Error::Schema(format!(
                "Column {} does not exist in table {}",
                left_column, left
            ))
        })?;
        let right_index = right_table.column_index(right_column).ok_or_else(|| {
            Error::Schema(format!(
                "Column {} does not exist in table {}",
                right_column, right
            ))
        })?;

        let mut columns = vec![ID_COLUMN.to_string()];
        let left_keep = keep_columns(left_table, left_index, &mut columns);
        let right_keep = keep_columns(right_table, right_index, &mut columns);

        let mut rows = Vec::new();
        let mut next_id = 1u64;
        for lrow in left_table.rows() {
            for rrow in right_table.rows() {
                if lrow[left_index] != rrow[right_index] {
                    continue;
                }
                let mut row = Vec::with_capacity(columns.len());
                row.push(next_id.to_string());
                next_id += 1;
                row.extend(left_keep.iter().map(|&i| lrow[i].clone()));
                row.extend(right_keep.iter().map(|&i| rrow[i].clone()));
                rows.push(row);
            }
        }
        Ok(ResultSet::Scan { columns, rows })
    }
}

/// Collects the indices of a table's non-id, non-join columns and appends
/// their namespaced names to the join result header
fn keep_columns(table: &Table, join_index: usize, header: &mut Vec<String>) -> Vec<usize> {
    let mut keep = Vec::new();
    for (i, col) in table.columns().iter().enumerate() {
        if i != join_index && col != ID_COLUMN {
            keep.push(i);
            header.push(format!("{}.{}", table.name(), col));
        }
    }
    keep
}

/// Rewrites the whole backing file; the observable contents after every
/// mutating statement are the full serialized table
fn persist(file: &Path, table: &Table) -> Result<()> {
    fs::write(file, table.serialize())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Database;
    use crate::error::{Error, Result};
    use crate::sql::engine::ResultSet;
    use crate::sql::parser::ast::AlterKind;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_create_insert_select() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut db = Database::open("markbook", dir.path().join("markbook"))?;

        db.create_table("marks", &strings(&["name", "mark", "pass"]))?;
        assert!(matches!(
            db.create_table("marks", &[]),
            Err(Error::Schema(_))
        ));

        db.insert_row("marks", &strings(&["'Simon'", "65", "TRUE"]))?;
        db.insert_row("marks", &strings(&["'Sion'", "55", "TRUE"]))?;
        db.insert_row("marks", &strings(&["'Rob'", "35", "FALSE"]))?;

        let result = db.select("marks", &strings(&["*"]), Some("pass == TRUE"))?;
        match result {
            ResultSet::Scan { columns, rows } => {
                assert_eq!(columns, strings(&["id", "name", "mark", "pass"]));
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0], strings(&["1", "Simon", "65", "TRUE"]));
            }
            other => panic!("expected scan, got {:?}", other),
        }

        // Projection keeps the requested column order
        let result = db.select("marks", &strings(&["mark", "name"]), None)?;
        match result {
            ResultSet::Scan { columns, rows } => {
                assert_eq!(columns, strings(&["mark", "name"]));
                assert_eq!(rows[2], strings(&["35", "Rob"]));
            }
            other => panic!("expected scan, got {:?}", other),
        }

        assert!(matches!(
            db.select("marks", &strings(&["ghost"]), None),
            Err(Error::Schema(_))
        ));
        assert!(matches!(
            db.select("ghost", &strings(&["*"]), None),
            Err(Error::Schema(_))
        ));
        Ok(())
    }

    #[test]
    fn test_mutations_persist_to_reload() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("markbook");
        {
            let mut db = Database::open("markbook", path.clone())?;
            db.create_table("marks", &strings(&["name", "mark"]))?;
            db.insert_row("marks", &strings(&["'Simon'", "65"]))?;
            db.insert_row("marks", &strings(&["'Rob'", "35"]))?;
            db.update("marks", &[("mark".to_string(), "40".to_string())], "name == 'Rob'")?;
            db.delete("marks", "name == 'Simon'")?;
            db.alter_table("marks", AlterKind::Add, "pass")?;
        }

        let mut db = Database::open("markbook", path)?;
        let result = db.select("marks", &strings(&["*"]), None)?;
        match result {
            ResultSet::Scan { columns, rows } => {
                assert_eq!(columns, strings(&["id", "name", "mark", "pass"]));
                assert_eq!(rows, vec![strings(&["2", "Rob", "40", "NULL"])]);
            }
            other => panic!("expected scan, got {:?}", other),
        }

        // The id allocator survives the reload
        let inserted = db.insert_row("marks", &strings(&["'New'", "50", "TRUE"]))?;
        assert_eq!(inserted, ResultSet::Insert { id: 3 });
        Ok(())
    }

    #[test]
    fn test_drop_table_removes_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut db = Database::open("markbook", dir.path().join("markbook"))?;
        db.create_table("marks", &strings(&["name"]))?;

        let file = dir.path().join("markbook").join("marks.tab");
        assert!(file.exists());

        db.drop_table("marks")?;
        assert!(!file.exists());
        assert!(matches!(db.drop_table("marks"), Err(Error::Schema(_))));
        Ok(())
    }

    #[test]
    fn test_join() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut db = Database::open("uni", dir.path().join("uni"))?;
        db.create_table("students", &strings(&["name", "courseId"]))?;
        db.create_table("courses", &strings(&["title"]))?;
        db.insert_row("students", &strings(&["'John'", "1"]))?;
        db.insert_row("students", &strings(&["'Mary'", "2"]))?;
        db.insert_row("courses", &strings(&["'Math'"]))?;

        let result = db.join("students", "courses", "courseId", "id")?;
        match result {
            ResultSet::Scan { columns, rows } => {
                assert_eq!(
                    columns,
                    strings(&["id", "students.name", "courses.title"])
                );
                assert_eq!(rows, vec![strings(&["1", "John", "Math"])]);
            }
            other => panic!("expected scan, got {:?}", other),
        }

        assert!(matches!(
            db.join("students", "courses", "ghost", "id"),
            Err(Error::Schema(_))
        ));
        assert!(matches!(
            db.join("students", "ghost", "courseId", "id"),
            Err(Error::Schema(_))
        ));
        Ok(())
    }
}
