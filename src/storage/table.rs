//! Table engine - owns the schema, row identity, and the semantics of each
//! mutation/query operation

use crate::error::{Error, Result};
use crate::sql::condition::ConditionNode;
use crate::sql::types::{NULL_MARKER, Row, Value};

/// Name of the auto-assigned identifier column (always column 0)
pub const ID_COLUMN: &str = "id";

/// A single table: ordered column names, ordered rows of text cells, and a
/// monotonic id allocator that never reissues an id
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
    next_id: u64,
}

impl Table {
    /// Creates an empty table with only the id column
    pub fn new(name: &str) -> Self {
        Table {
            name: name.to_lowercase(),
            columns: vec![ID_COLUMN.to_string()],
            rows: Vec::new(),
            next_id: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The next id the allocator would assign
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Resolves a column name by exact match; `Name` and `name` differ
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column_exists(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Appends a column, back-filling NULL into every existing row
    pub fn add_column(&mut self, name: &str) -> Result<()> {
        if self.column_exists(name) {
            return Err(Error::Schema(format!("Column already exists: {}", name)));
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(NULL_MARKER.to_string());
        }
        Ok(())
    }

    /// Removes a column from the schema and from every row; the id column
    /// can never be dropped
    pub fn drop_column(&mut self, name: &str) -> Result<()> {
        if name.eq_ignore_ascii_case(ID_COLUMN) {
            return Err(Error::Schema("Cannot drop the id column".to_string()));
        }
        let index = self
            .column_index(name)
            .ok_or_else(|| Error::Schema(format!("Column does not exist: {}", name)))?;
        self.columns.remove(index);
        for row in &mut self.rows {
            row.remove(index);
        }
        Ok(())
    }

    /// Adds a row. The value count must match the non-id column count; each
    /// value is coerced to canonical cell text and a fresh, never-reused id
    /// is prepended. Returns the assigned id.
    pub fn add_row(&mut self, values: &[String]) -> Result<u64> {
        let expected = self.columns.len() - 1;
        if values.len() != expected {
            return Err(Error::Arity(format!(
                "Expected {} values, got {}",
                expected,
                values.len()
            )));
        }
        let id = self.next_id;
        self.next_id += 1;
        let mut row = Vec::with_capacity(self.columns.len());
        row.push(id.to_string());
        row.extend(values.iter().map(|v| Value::canonical_cell(v)));
        self.rows.push(row);
        Ok(id)
    }

    /// Returns the indices of rows matching the condition, in insertion
    /// order. Empty or absent condition text matches every row. The parsed
    /// tree is evaluated once per row over the full row set, so AND is the
    /// intersection and OR the de-duplicated union of independent matches.
    pub fn filter(&self, condition: Option<&str>) -> Result<Vec<usize>> {
        let Some(text) = condition.map(str::trim).filter(|c| !c.is_empty()) else {
            return Ok((0..self.rows.len()).collect());
        };
        let node = ConditionNode::parse(text)?;
        Ok(self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| node.evaluate(row, &self.columns))
            .map(|(i, _)| i)
            .collect())
    }

    /// Applies every `column = value` assignment to the rows matching the
    /// condition, in place. The row set is resolved once, before any cell
    /// changes, so assignments cannot affect which rows match. The id column
    /// can never be updated. Returns the changed row count.
    pub fn update_rows(&mut self, assignments: &[(String, String)], condition: &str) -> Result<usize> {
        let mut resolved = Vec::with_capacity(assignments.len());
        for (column, value) in assignments {
            if column.eq_ignore_ascii_case(ID_COLUMN) {
                return Err(Error::Schema("Cannot update the id column".to_string()));
            }
            let index = self
                .column_index(column)
                .ok_or_else(|| Error::Schema(format!("Column does not exist: {}", column)))?;
            resolved.push((index, Value::canonical_cell(value)));
        }
        let matches = self.filter(Some(condition))?;
        for &i in &matches {
            for (index, cell) in &resolved {
                self.rows[i][*index] = cell.clone();
            }
        }
        Ok(matches.len())
    }

    /// Removes every matching row. Unconditional deletes are disallowed by
    /// design; a condition matching zero rows is still a success.
    pub fn delete_rows(&mut self, condition: &str) -> Result<usize> {
        if condition.trim().is_empty() {
            return Err(Error::Consistency(
                "Unconditional DELETE is not allowed".to_string(),
            ));
        }
        let matches = self.filter(Some(condition))?;
        for &i in matches.iter().rev() {
            self.rows.remove(i);
        }
        Ok(matches.len())
    }

    /// Serializes to the persisted form: a tab-separated header line followed
    /// by one tab-separated line per row, in insertion order
    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(64 * (self.rows.len() + 1));
        out.push_str(&self.columns.join("\t"));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join("\t"));
            out.push('\n');
        }
        out
    }

    /// Rebuilds a table from its persisted form. The id allocator is
    /// re-derived from the maximum parseable id so ids are never reissued
    /// across a reload; rows lacking a parseable id get a fresh one.
    pub fn deserialize(name: &str, text: &str) -> Table {
        let mut table = Table::new(name);
        let mut lines = text.lines();
        if let Some(header) = lines.next() {
            let columns: Vec<String> = header
                .split('\t')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(|c| c.to_string())
                .collect();
            if !columns.is_empty() {
                table.columns = columns;
            }
            if !table.columns.iter().any(|c| c == ID_COLUMN) {
                table.columns.insert(0, ID_COLUMN.to_string());
            }
        }
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            table.load_row(line.split('\t').map(|c| c.to_string()).collect());
        }
        table
    }

    /// Loads one persisted row, padding or truncating to the schema width
    fn load_row(&mut self, cells: Vec<String>) {
        let mut row = cells;
        match row.first().and_then(|c| c.trim().parse::<u64>().ok()) {
            Some(id) => {
                if id >= self.next_id {
                    self.next_id = id + 1;
                }
            }
            None => {
                let id = self.next_id;
                self.next_id += 1;
                if row.is_empty() {
                    row.push(id.to_string());
                } else {
                    row[0] = id.to_string();
                }
            }
        }
        row.resize(self.columns.len(), NULL_MARKER.to_string());
        self.rows.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::{ID_COLUMN, Table};
    use crate::error::{Error, Result};

    fn values(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(c, v)| (c.to_string(), v.to_string()))
            .collect()
    }

    fn marks_table() -> Result<Table> {
        let mut table = Table::new("marks");
        table.add_column("name")?;
        table.add_column("mark")?;
        table.add_column("pass")?;
        table.add_row(&values(&["'Steve'", "65", "TRUE"]))?;
        table.add_row(&values(&["'Dave'", "55", "TRUE"]))?;
        table.add_row(&values(&["'Bob'", "35", "FALSE"]))?;
        table.add_row(&values(&["'Clive'", "20", "FALSE"]))?;
        Ok(table)
    }

    #[test]
    fn test_row_width_invariant() -> Result<()> {
        let mut table = marks_table()?;
        assert!(table.rows().iter().all(|r| r.len() == table.columns().len()));

        table.add_column("age")?;
        assert!(table.rows().iter().all(|r| r.len() == table.columns().len()));
        // Back-filled cells are NULL
        assert_eq!(table.rows()[0][4], "NULL");

        table.drop_column("mark")?;
        assert!(table.rows().iter().all(|r| r.len() == table.columns().len()));
        assert_eq!(table.columns(), &["id", "name", "pass", "age"]);
        Ok(())
    }

    #[test]
    fn test_schema_errors() -> Result<()> {
        let mut table = marks_table()?;
        assert!(matches!(table.add_column("name"), Err(Error::Schema(_))));
        assert!(matches!(table.drop_column(ID_COLUMN), Err(Error::Schema(_))));
        assert!(matches!(table.drop_column("Id"), Err(Error::Schema(_))));
        assert!(matches!(table.drop_column("ghost"), Err(Error::Schema(_))));
        Ok(())
    }

    #[test]
    fn test_ids_never_reused() -> Result<()> {
        let mut table = marks_table()?;
        assert_eq!(table.rows()[3][0], "4");

        let deleted = table.delete_rows("mark >= 0")?;
        assert_eq!(deleted, 4);
        assert!(table.rows().is_empty());

        let id = table.add_row(&values(&["'New'", "50", "TRUE"]))?;
        assert_eq!(id, 5);
        assert_eq!(table.rows()[0][0], "5");
        Ok(())
    }

    #[test]
    fn test_insert_arity() -> Result<()> {
        let mut table = marks_table()?;
        assert!(matches!(
            table.add_row(&values(&["'Tom'", "40"])),
            Err(Error::Arity(_))
        ));
        assert!(matches!(
            table.add_row(&values(&["'Tom'", "40", "TRUE", "extra"])),
            Err(Error::Arity(_))
        ));
        Ok(())
    }

    #[test]
    fn test_value_coercion_on_insert() -> Result<()> {
        let mut table = Table::new("t");
        table.add_column("a")?;
        table.add_column("b")?;
        table.add_column("c")?;
        table.add_row(&values(&["'Quoted text'", "true", "nUlL"]))?;
        assert_eq!(table.rows()[0], values(&["1", "Quoted text", "TRUE", "NULL"]));
        Ok(())
    }

    #[test]
    fn test_filter_empty_condition_matches_all() -> Result<()> {
        let table = marks_table()?;
        assert_eq!(table.filter(None)?, vec![0, 1, 2, 3]);
        assert_eq!(table.filter(Some(""))?, vec![0, 1, 2, 3]);
        assert_eq!(table.filter(Some("  "))?, vec![0, 1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_filter_set_semantics() -> Result<()> {
        let table = marks_table()?;
        assert_eq!(table.filter(Some("(pass == TRUE) AND (mark > 60)"))?, vec![0]);
        assert_eq!(
            table.filter(Some("name == 'Bob' OR mark < 30"))?,
            vec![2, 3]
        );
        // Rows matching both sides of an OR appear once
        assert_eq!(
            table.filter(Some("name == 'Bob' OR pass == FALSE"))?,
            vec![2, 3]
        );
        assert!(table.filter(Some("gibberish")).is_err());
        Ok(())
    }

    #[test]
    fn test_update_rows() -> Result<()> {
        let mut table = marks_table()?;
        let count = table.update_rows(&pairs(&[("mark", "38")]), "name == 'Clive'")?;
        assert_eq!(count, 1);
        assert_eq!(table.rows()[3][2], "38");

        assert!(matches!(
            table.update_rows(&pairs(&[("id", "9")]), "name == 'Clive'"),
            Err(Error::Schema(_))
        ));
        assert!(matches!(
            table.update_rows(&pairs(&[("ghost", "9")]), "name == 'Clive'"),
            Err(Error::Schema(_))
        ));
        Ok(())
    }

    #[test]
    fn test_update_resolves_matches_before_writing() -> Result<()> {
        // The second assignment must hit the same rows even though the first
        // one rewrites the cell the condition tested
        let mut table = marks_table()?;
        let count = table.update_rows(
            &pairs(&[("mark", "38"), ("pass", "TRUE")]),
            "mark == 35",
        )?;
        assert_eq!(count, 1);
        assert_eq!(table.rows()[2][2], "38");
        assert_eq!(table.rows()[2][3], "TRUE");
        Ok(())
    }

    #[test]
    fn test_delete_rows() -> Result<()> {
        let mut table = marks_table()?;
        assert!(matches!(
            table.delete_rows(""),
            Err(Error::Consistency(_))
        ));

        // Zero matches is still a success and leaves the table unchanged
        assert_eq!(table.delete_rows("mark > 1000")?, 0);
        assert_eq!(table.rows().len(), 4);

        assert_eq!(table.delete_rows("pass == FALSE")?, 2);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0][1], "Steve");
        assert_eq!(table.rows()[1][1], "Dave");
        Ok(())
    }

    #[test]
    fn test_serialize_round_trip() -> Result<()> {
        let mut table = marks_table()?;
        table.delete_rows("name == 'Dave'")?;

        let text = table.serialize();
        let reloaded = Table::deserialize("marks", &text);
        assert_eq!(reloaded.columns(), table.columns());
        assert_eq!(reloaded.rows(), table.rows());
        assert_eq!(reloaded.next_id(), table.next_id());
        Ok(())
    }

    #[test]
    fn test_deserialize_repairs_rows() {
        // A large id bumps the allocator; an unparseable id is replaced with
        // a fresh one; a short row is padded with NULL
        let text = "id\tname\tmark\n7\tAda\t90\nx\tBob\t55\n9\tCyd\n";
        let table = Table::deserialize("odd", text);
        assert_eq!(table.columns(), &["id", "name", "mark"]);
        assert_eq!(table.rows()[0], vec!["7", "Ada", "90"]);
        assert_eq!(table.rows()[1], vec!["8", "Bob", "55"]);
        assert_eq!(table.rows()[2], vec!["9", "Cyd", "NULL"]);
        assert_eq!(table.next_id(), 10);
    }

    #[test]
    fn test_deserialize_inserts_missing_id_column() {
        let table = Table::deserialize("bare", "name\tmark\n");
        assert_eq!(table.columns(), &["id", "name", "mark"]);
        assert!(table.rows().is_empty());
    }
}
