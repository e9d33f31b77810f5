use rusqlite::{params, Connection, Row};

use crate::error::{RecordsError, Result};
use crate::models::{Faculty, TableKind};

/// Every faculty row with its stored counters, in storage order.
pub fn fetch_faculties(conn: &Connection) -> Result<Vec<Faculty>> {
    let mut stmt = conn.prepare("SELECT ID, Name, Courses, Attendees FROM faculties ORDER BY ID")?;

    let faculties = stmt
        .query_map([], faculty_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(faculties)
}

/// Faculty names in storage order.
pub fn fetch_faculty_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT Name FROM faculties ORDER BY ID")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

/// New faculties start with both counters at zero.
pub fn insert_faculty(conn: &Connection, name: &str) -> Result<Faculty> {
    conn.execute(
        "INSERT INTO faculties (Name, Courses, Attendees) VALUES (?1, 0, 0)",
        params![name],
    )
    .map_err(|err| RecordsError::from_insert(err, TableKind::Faculties, name))?;

    Ok(Faculty {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        courses: 0,
        attendees: 0,
    })
}

/// Remove the faculty row only. Its courses are left to the caller.
pub fn delete_faculty(conn: &Connection, name: &str) -> Result<()> {
    let deleted = conn.execute("DELETE FROM faculties WHERE Name = ?1", params![name])?;

    if deleted == 0 {
        Err(RecordsError::NotFound {
            kind: TableKind::Faculties,
            key: format!("'{name}'"),
        })
    } else {
        Ok(())
    }
}

fn faculty_from_row(row: &Row<'_>) -> rusqlite::Result<Faculty> {
    Ok(Faculty {
        id: row.get(0)?,
        name: row.get(1)?,
        courses: row.get(2)?,
        attendees: row.get(3)?,
    })
}
