use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

use crate::error::{RecordsError, Result};
use crate::models::{NewStudent, Student, StudentUpdate, TableKind};

/// Every student in insertion order. This is the row set the shell renders as
/// its main table.
pub fn fetch_students(conn: &Connection) -> Result<Vec<Student>> {
    let mut stmt = conn.prepare(
        "SELECT ID, Name, Surname, Age, Gender, Course, Started, Graduation
         FROM students
         ORDER BY ID",
    )?;

    let students = stmt
        .query_map([], student_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(students)
}

/// Students enrolled in a given course, matched by exact name.
pub fn fetch_students_for_course(conn: &Connection, course: &str) -> Result<Vec<Student>> {
    let mut stmt = conn.prepare(
        "SELECT ID, Name, Surname, Age, Gender, Course, Started, Graduation
         FROM students
         WHERE Course = ?1
         ORDER BY ID",
    )?;

    let students = stmt
        .query_map([course], student_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(students)
}

/// Insert a student whose graduation date has already been worked out. The
/// caller is responsible for the course existing and for recomputing counters
/// afterwards.
pub fn insert_student(
    conn: &Connection,
    student: &NewStudent,
    graduation: NaiveDate,
) -> Result<Student> {
    conn.execute(
        "INSERT INTO students (Name, Surname, Age, Gender, Course, Started, Graduation)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            student.name,
            student.surname,
            student.age,
            student.gender,
            student.course,
            student.started,
            graduation
        ],
    )?;

    Ok(Student {
        id: conn.last_insert_rowid(),
        name: student.name.clone(),
        surname: student.surname.clone(),
        age: student.age,
        gender: student.gender,
        course: student.course.clone(),
        started: student.started,
        graduation,
    })
}

/// Apply one cell edit. Only the personal columns are reachable here.
pub fn update_student(conn: &Connection, id: i64, update: &StudentUpdate) -> Result<()> {
    let sql = format!(
        "UPDATE students SET {} = ?1 WHERE ID = ?2",
        update.field().column()
    );
    let updated = match update {
        StudentUpdate::Name(value) | StudentUpdate::Surname(value) => {
            conn.execute(&sql, params![value, id])?
        }
        StudentUpdate::Age(age) => conn.execute(&sql, params![age, id])?,
        StudentUpdate::Gender(gender) => conn.execute(&sql, params![gender, id])?,
    };

    if updated == 0 {
        Err(student_not_found(id))
    } else {
        Ok(())
    }
}

/// Remove one student by id, failing with `NotFound` if no row matched.
pub fn delete_student(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn.execute("DELETE FROM students WHERE ID = ?1", params![id])?;

    if deleted == 0 {
        Err(student_not_found(id))
    } else {
        Ok(())
    }
}

/// Remove every student attending `course`, returning how many rows went.
pub fn delete_students_for_course(conn: &Connection, course: &str) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM students WHERE Course = ?1", params![course])?;
    Ok(deleted)
}

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        surname: row.get(2)?,
        age: row.get(3)?,
        gender: row.get(4)?,
        course: row.get(5)?,
        started: row.get(6)?,
        graduation: row.get(7)?,
    })
}

fn student_not_found(id: i64) -> RecordsError {
    RecordsError::NotFound {
        kind: TableKind::Students,
        key: id.to_string(),
    }
}
