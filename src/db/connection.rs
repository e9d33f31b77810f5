use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rusqlite::{params, Connection};

use crate::config::Config;
use crate::error::{RecordsError, Result};
use crate::models::TableKind;

/// Connection endpoint for the records database. It holds no open handle:
/// every operation calls [`Database::connect`] and the returned connection is
/// closed when it goes out of scope, whichever way the operation exits.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(config: &Config) -> Self {
        Self::at(&config.database_path)
    }

    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a fresh connection scoped to the caller, creating the directory
    /// that holds the database file if it is missing. Foreign key enforcement
    /// is switched on for every connection.
    pub fn connect(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.unreachable(err))?;
        }

        debug!("opening connection to {}", self.path.display());
        let conn = Connection::open(&self.path).map_err(|err| self.unreachable(err))?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|err| self.unreachable(err))?;
        Ok(conn)
    }

    fn unreachable(&self, err: impl std::error::Error + Send + Sync + 'static) -> RecordsError {
        RecordsError::Connectivity {
            path: self.path.clone(),
            source: Box::new(err),
        }
    }

    /// Open and immediately release a connection, reporting whether the store
    /// is reachable.
    pub fn test_connection(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }
}

/// Create any of the three tables that are missing. Running it against an
/// already initialised database changes nothing.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    for kind in [TableKind::Students, TableKind::Courses, TableKind::Faculties] {
        if table_exists(conn, kind)? {
            continue;
        }
        conn.execute(create_statement(kind), [])?;
        info!("created table {}", kind.table_name());
    }
    Ok(())
}

/// Check the SQLite catalog for the table backing `kind`.
pub fn table_exists(conn: &Connection, kind: TableKind) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        params![kind.table_name()],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn create_statement(kind: TableKind) -> &'static str {
    match kind {
        TableKind::Students => {
            "CREATE TABLE IF NOT EXISTS students (
                ID INTEGER PRIMARY KEY AUTOINCREMENT,
                Name TEXT NOT NULL,
                Surname TEXT NOT NULL,
                Age INTEGER NOT NULL,
                Gender TEXT NOT NULL,
                Course TEXT NOT NULL,
                Started TEXT NOT NULL,
                Graduation TEXT NOT NULL
            )"
        }
        TableKind::Courses => {
            "CREATE TABLE IF NOT EXISTS courses (
                ID INTEGER PRIMARY KEY AUTOINCREMENT,
                Name TEXT NOT NULL UNIQUE,
                Faculty TEXT NOT NULL,
                Duration INTEGER NOT NULL,
                Attendees INTEGER NOT NULL DEFAULT 0
            )"
        }
        TableKind::Faculties => {
            "CREATE TABLE IF NOT EXISTS faculties (
                ID INTEGER PRIMARY KEY AUTOINCREMENT,
                Name TEXT NOT NULL UNIQUE,
                Courses INTEGER NOT NULL DEFAULT 0,
                Attendees INTEGER NOT NULL DEFAULT 0
            )"
        }
    }
}
