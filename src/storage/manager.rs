//! DatabaseManager - the storage root holding every database directory and
//! the currently selected database

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::warn;

use crate::error::{Error, Result};
use crate::storage::database::Database;

/// Owns the storage root directory. Every subdirectory is one database.
pub struct DatabaseManager {
    root: PathBuf,
    databases: HashMap<String, Database>,
    current: Option<String>,
}

impl DatabaseManager {
    /// Opens the storage root, creating it if missing, and loads every
    /// database directory found inside. Unreadable directories are skipped
    /// with a warning.
    pub fn open(root: PathBuf) -> Result<DatabaseManager> {
        fs::create_dir_all(&root)?;
        let mut manager = DatabaseManager {
            root,
            databases: HashMap::new(),
            current: None,
        };
        for entry in fs::read_dir(&manager.root)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let name = name.to_lowercase();
            match Database::open(&name, path.clone()) {
                Ok(db) => {
                    manager.databases.insert(name, db);
                }
                Err(err) => warn!(database = %name, %err, "skipping unreadable database"),
            }
        }
        Ok(manager)
    }

    pub fn create_database(&mut self, name: &str) -> Result<()> {
        if self.databases.contains_key(name) {
            return Err(Error::Schema(format!("Database {} already exists", name)));
        }
        let db = Database::open(name, self.root.join(name))?;
        self.databases.insert(name.to_string(), db);
        Ok(())
    }

    /// Deletes the database directory and everything in it. Clears the
    /// current selection if it pointed here.
    pub fn drop_database(&mut self, name: &str) -> Result<()> {
        if !self.databases.contains_key(name) {
            return Err(Error::Schema(format!("Database does not exist: {}", name)));
        }
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        let path = self.root.join(name);
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        }
        self.databases.remove(name);
        Ok(())
    }

    pub fn use_database(&mut self, name: &str) -> Result<()> {
        if !self.databases.contains_key(name) {
            return Err(Error::Schema(format!("Database does not exist: {}", name)));
        }
        self.current = Some(name.to_string());
        Ok(())
    }

    /// The currently selected database, if any
    pub fn current(&mut self) -> Option<&mut Database> {
        self.current
            .as_ref()
            .and_then(|name| self.databases.get_mut(name))
    }
}

#[cfg(test)]
mod tests {
    use super::DatabaseManager;
    use crate::error::{Error, Result};

    #[test]
    fn test_database_lifecycle() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut manager = DatabaseManager::open(dir.path().to_path_buf())?;

        assert!(manager.current().is_none());
        assert!(matches!(
            manager.use_database("markbook"),
            Err(Error::Schema(_))
        ));

        manager.create_database("markbook")?;
        assert!(dir.path().join("markbook").is_dir());
        assert!(matches!(
            manager.create_database("markbook"),
            Err(Error::Schema(_))
        ));

        manager.use_database("markbook")?;
        assert!(manager.current().is_some());

        manager.drop_database("markbook")?;
        assert!(!dir.path().join("markbook").exists());
        assert!(manager.current().is_none());
        assert!(matches!(
            manager.drop_database("markbook"),
            Err(Error::Schema(_))
        ));
        Ok(())
    }

    #[test]
    fn test_reopen_discovers_databases() -> Result<()> {
        let dir = tempfile::tempdir()?;
        {
            let mut manager = DatabaseManager::open(dir.path().to_path_buf())?;
            manager.create_database("markbook")?;
        }
        let mut manager = DatabaseManager::open(dir.path().to_path_buf())?;
        manager.use_database("markbook")?;
        assert!(manager.current().is_some());
        Ok(())
    }
}
