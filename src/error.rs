//! Error type shared by the store, the consistency engine and the registry.

use std::path::PathBuf;

use rusqlite::ffi;
use thiserror::Error;

use crate::models::TableKind;

#[derive(Error, Debug)]
pub enum RecordsError {
    /// The database file, or the directory holding it, could not be created,
    /// opened or configured.
    #[error("cannot reach database at {}: {source}", path.display())]
    Connectivity {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A statement failed on an open connection.
    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("{kind} '{name}' does not exist")]
    ReferentialGap { kind: TableKind, name: String },

    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: TableKind, name: String },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("{kind} {key} not found")]
    NotFound { kind: TableKind, key: String },

    /// Deleting a faculty that still owns courses needs the cascade to be
    /// confirmed.
    #[error("faculty '{name}' still has {courses} course(s)")]
    FacultyHasCourses { name: String, courses: i64 },
}

pub type Result<T> = std::result::Result<T, RecordsError>;

impl RecordsError {
    /// Turn a UNIQUE violation on `kind`'s Name column into `DuplicateName`,
    /// leaving every other failure (other constraints included) as a storage
    /// error.
    pub(crate) fn from_insert(err: rusqlite::Error, kind: TableKind, name: &str) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, _)
                if code.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                RecordsError::DuplicateName {
                    kind,
                    name: name.to_string(),
                }
            }
            other => RecordsError::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::*;

    fn failing_insert(sql: &str) -> rusqlite::Error {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE items (Name TEXT NOT NULL UNIQUE, Extra TEXT NOT NULL)",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO items (Name, Extra) VALUES ('CS101', 'x')", [])
            .unwrap();
        conn.execute(sql, []).unwrap_err()
    }

    #[test]
    fn unique_violation_becomes_duplicate_name() {
        let err = failing_insert("INSERT INTO items (Name, Extra) VALUES ('CS101', 'y')");
        assert!(matches!(
            RecordsError::from_insert(err, TableKind::Courses, "CS101"),
            RecordsError::DuplicateName { kind: TableKind::Courses, .. }
        ));
    }

    #[test]
    fn not_null_violation_stays_a_storage_error() {
        let err = failing_insert("INSERT INTO items (Name, Extra) VALUES ('EE201', NULL)");
        assert!(matches!(
            RecordsError::from_insert(err, TableKind::Courses, "EE201"),
            RecordsError::Storage(_)
        ));
    }
}
