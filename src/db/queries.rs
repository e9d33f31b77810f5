//! Name-keyed lookups shared by every table.

use rusqlite::{Connection, OptionalExtension};

use crate::error::{RecordsError, Result};
use crate::models::TableKind;

/// Case-sensitive exact match on the Name column of `kind`'s table.
pub fn element_exists(conn: &Connection, kind: TableKind, name: &str) -> Result<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE Name = ?1)",
        kind.table_name()
    );
    let exists = conn.query_row(&sql, [name], |row| row.get(0))?;
    Ok(exists)
}

/// Stored attendee counter of a course or faculty. The value is whatever the
/// last recompute wrote.
pub fn stored_attendees(conn: &Connection, kind: TableKind, name: &str) -> Result<i64> {
    if kind == TableKind::Students {
        return Err(RecordsError::Validation(
            "students have no attendee counter".to_string(),
        ));
    }
    let sql = format!("SELECT Attendees FROM {} WHERE Name = ?1", kind.table_name());
    conn.query_row(&sql, [name], |row| row.get(0))
        .optional()?
        .ok_or_else(|| not_found(kind, name))
}

/// Stored course counter of a faculty.
pub fn stored_course_count(conn: &Connection, faculty: &str) -> Result<i64> {
    conn.query_row(
        "SELECT Courses FROM faculties WHERE Name = ?1",
        [faculty],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| not_found(TableKind::Faculties, faculty))
}

fn not_found(kind: TableKind, name: &str) -> RecordsError {
    RecordsError::NotFound {
        kind,
        key: format!("'{name}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::TempDb;
    use crate::db::{insert_course, insert_faculty};

    #[test]
    fn existence_check_is_case_sensitive() {
        let db = TempDb::with_schema();
        let conn = db.connect().unwrap();
        insert_faculty(&conn, "Engineering").unwrap();

        assert!(element_exists(&conn, TableKind::Faculties, "Engineering").unwrap());
        assert!(!element_exists(&conn, TableKind::Faculties, "engineering").unwrap());
        assert!(!element_exists(&conn, TableKind::Courses, "Engineering").unwrap());
    }

    #[test]
    fn counters_read_stored_values() {
        let db = TempDb::with_schema();
        let conn = db.connect().unwrap();
        insert_faculty(&conn, "Engineering").unwrap();
        insert_course(&conn, "CS101", "Engineering", 6).unwrap();

        assert_eq!(stored_attendees(&conn, TableKind::Courses, "CS101").unwrap(), 0);
        // No recompute has run yet, so the faculty still reports zero courses.
        assert_eq!(stored_course_count(&conn, "Engineering").unwrap(), 0);
    }

    #[test]
    fn counters_for_unknown_names_fail() {
        let db = TempDb::with_schema();
        let conn = db.connect().unwrap();

        assert!(matches!(
            stored_attendees(&conn, TableKind::Courses, "Ghost"),
            Err(RecordsError::NotFound { .. })
        ));
        assert!(matches!(
            stored_attendees(&conn, TableKind::Students, "Ada"),
            Err(RecordsError::Validation(_))
        ));
        assert!(stored_course_count(&conn, "Ghost").is_err());
    }
}
