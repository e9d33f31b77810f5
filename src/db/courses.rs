use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{RecordsError, Result};
use crate::models::{Course, TableKind};

/// Every course in storage order.
pub fn fetch_courses(conn: &Connection) -> Result<Vec<Course>> {
    let mut stmt = conn.prepare(
        "SELECT ID, Name, Faculty, Duration, Attendees FROM courses ORDER BY ID",
    )?;

    let courses = stmt
        .query_map([], course_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(courses)
}

/// Course names in storage order, as offered in the enrollment picker.
pub fn fetch_course_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT Name FROM courses ORDER BY ID")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

/// Names of the courses owned by `faculty`.
pub fn fetch_course_names_for_faculty(conn: &Connection, faculty: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT Name FROM courses WHERE Faculty = ?1 ORDER BY ID")?;
    let names = stmt
        .query_map([faculty], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

/// Live number of course rows pointing at `faculty`, independent of the stored
/// counter.
pub fn count_courses_for_faculty(conn: &Connection, faculty: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM courses WHERE Faculty = ?1",
        [faculty],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Duration in months of the named course, or `None` when no such course
/// exists.
pub fn course_duration(conn: &Connection, name: &str) -> Result<Option<u32>> {
    let duration = conn
        .query_row(
            "SELECT Duration FROM courses WHERE Name = ?1",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(duration)
}

/// Insert a course with zero attendees. Name clashes surface as
/// `DuplicateName`.
pub fn insert_course(conn: &Connection, name: &str, faculty: &str, duration: u32) -> Result<Course> {
    conn.execute(
        "INSERT INTO courses (Name, Faculty, Duration, Attendees) VALUES (?1, ?2, ?3, 0)",
        params![name, faculty, duration],
    )
    .map_err(|err| RecordsError::from_insert(err, TableKind::Courses, name))?;

    Ok(Course {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        faculty: faculty.to_string(),
        duration,
        attendees: 0,
    })
}

/// Remove the course row only. Students attending it are left alone; the
/// cascade in the consistency engine deals with them first.
pub fn delete_course(conn: &Connection, name: &str) -> Result<()> {
    let deleted = conn.execute("DELETE FROM courses WHERE Name = ?1", params![name])?;

    if deleted == 0 {
        Err(RecordsError::NotFound {
            kind: TableKind::Courses,
            key: format!("'{name}'"),
        })
    } else {
        Ok(())
    }
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        name: row.get(1)?,
        faculty: row.get(2)?,
        duration: row.get(3)?,
        attendees: row.get(4)?,
    })
}
