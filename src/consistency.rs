//! Derived counter maintenance and delete cascades.
//!
//! `courses.Attendees`, `faculties.Attendees` and `faculties.Courses` are never
//! patched incrementally. After any mutation that can move them, [`recompute`]
//! zeroes them and rebuilds them from the rows that exist right now, so a
//! second run with nothing in between writes the same values and a run after a
//! halted cascade repairs whatever the halt left behind.
//!
//! Cascades are plain sequences of statements without a surrounding
//! transaction. Each step finishes before the next starts, and the first
//! failing step stops the sequence and is returned to the caller.

use log::{debug, info, warn};
use rusqlite::{params, Connection};

use crate::db;
use crate::error::{RecordsError, Result};
use crate::models::{Student, TableKind};

/// Rebuild both counter sets: courses first, then faculties from the fresh
/// course totals.
pub fn recompute(conn: &Connection) -> Result<()> {
    recompute_course_attendees(conn)?;
    recompute_faculty_counters(conn)?;
    Ok(())
}

/// Set every course's attendees to the number of students naming it.
pub fn recompute_course_attendees(conn: &Connection) -> Result<()> {
    conn.execute("UPDATE courses SET Attendees = 0", [])?;

    let mut tally = conn.prepare("SELECT Course, COUNT(*) FROM students GROUP BY Course")?;
    let counts = tally
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut update = conn.prepare("UPDATE courses SET Attendees = ?1 WHERE Name = ?2")?;
    for (course, attendees) in &counts {
        if update.execute(params![attendees, course])? == 0 {
            warn!("{attendees} student(s) reference missing course '{course}'");
        }
    }

    debug!("recomputed attendees for {} course(s)", counts.len());
    Ok(())
}

/// Set every faculty's course count and attendee sum from the course rows.
/// Reads the stored course attendees, so it must run after
/// [`recompute_course_attendees`].
pub fn recompute_faculty_counters(conn: &Connection) -> Result<()> {
    conn.execute("UPDATE faculties SET Attendees = 0, Courses = 0", [])?;

    let mut courses = conn.prepare("SELECT Faculty, Attendees FROM courses ORDER BY ID")?;
    let rows = courses
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut update = conn.prepare(
        "UPDATE faculties SET Attendees = Attendees + ?1, Courses = Courses + 1 WHERE Name = ?2",
    )?;
    for (faculty, attendees) in &rows {
        if update.execute(params![attendees, faculty])? == 0 {
            warn!("course row references missing faculty '{faculty}'");
        }
    }

    debug!("recomputed faculty counters from {} course(s)", rows.len());
    Ok(())
}

/// Delete every student of `course` and recompute, keeping the course itself.
/// Returns the students that were removed.
pub fn clear_course_enrollment(conn: &Connection, course: &str) -> Result<Vec<Student>> {
    require_course(conn, course)?;
    let enrolled = db::fetch_students_for_course(conn, course)?;
    db::delete_students_for_course(conn, course)?;
    recompute(conn)?;
    info!(
        "cleared {} student(s) from course '{course}'",
        enrolled.len()
    );
    Ok(enrolled)
}

/// Delete a course together with its students, then recompute. Returns the
/// number of students removed.
pub fn delete_course(conn: &Connection, course: &str) -> Result<usize> {
    require_course(conn, course)?;
    let removed = db::delete_students_for_course(conn, course)?;
    db::delete_course(conn, course)?;
    recompute(conn)?;
    info!("deleted course '{course}' and {removed} student(s)");
    Ok(removed)
}

/// Apply the course cascade to every course of `faculty`, then recompute.
/// Returns the names of the deleted courses. The faculty row stays.
pub fn delete_faculty_courses(conn: &Connection, faculty: &str) -> Result<Vec<String>> {
    let courses = db::fetch_course_names_for_faculty(conn, faculty)?;

    for (done, course) in courses.iter().enumerate() {
        delete_course(conn, course).inspect_err(|err| {
            warn!(
                "cascade for faculty '{faculty}' halted at course '{course}' \
                 after {done} of {} course(s): {err}",
                courses.len()
            );
        })?;
    }

    recompute(conn)?;
    info!("deleted {} course(s) of faculty '{faculty}'", courses.len());
    Ok(courses)
}

/// Delete a faculty. A faculty that still owns courses is only removed when
/// `cascade` is set, in which case its courses and their students go first.
pub fn delete_faculty(conn: &Connection, faculty: &str, cascade: bool) -> Result<()> {
    if !db::element_exists(conn, TableKind::Faculties, faculty)? {
        return Err(RecordsError::NotFound {
            kind: TableKind::Faculties,
            key: format!("'{faculty}'"),
        });
    }

    let courses = db::count_courses_for_faculty(conn, faculty)?;
    if courses > 0 {
        if !cascade {
            return Err(RecordsError::FacultyHasCourses {
                name: faculty.to_string(),
                courses,
            });
        }
        delete_faculty_courses(conn, faculty)?;
    }

    db::delete_faculty(conn, faculty)?;
    recompute(conn)?;
    info!("deleted faculty '{faculty}'");
    Ok(())
}

fn require_course(conn: &Connection, course: &str) -> Result<()> {
    if db::element_exists(conn, TableKind::Courses, course)? {
        Ok(())
    } else {
        Err(RecordsError::NotFound {
            kind: TableKind::Courses,
            key: format!("'{course}'"),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::testing::TempDb;
    use crate::models::{Gender, NewStudent};

    fn enroll(conn: &Connection, name: &str, course: &str) {
        let started = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let student = NewStudent {
            name: name.to_string(),
            surname: "Smith".to_string(),
            age: 20,
            gender: Gender::Male,
            course: course.to_string(),
            started,
        };
        db::insert_student(conn, &student, started).unwrap();
    }

    fn counters(conn: &Connection) -> (Vec<(String, i64)>, Vec<(String, i64, i64)>) {
        let courses = db::fetch_courses(conn)
            .unwrap()
            .into_iter()
            .map(|c| (c.name, c.attendees))
            .collect();
        let faculties = db::fetch_faculties(conn)
            .unwrap()
            .into_iter()
            .map(|f| (f.name, f.courses, f.attendees))
            .collect();
        (courses, faculties)
    }

    fn seed(conn: &Connection) {
        db::insert_faculty(conn, "Engineering").unwrap();
        db::insert_faculty(conn, "Arts").unwrap();
        db::insert_course(conn, "CS101", "Engineering", 6).unwrap();
        db::insert_course(conn, "EE201", "Engineering", 12).unwrap();
        db::insert_course(conn, "Painting", "Arts", 3).unwrap();
        enroll(conn, "Ada", "CS101");
        enroll(conn, "Bob", "CS101");
        enroll(conn, "Cy", "EE201");
        enroll(conn, "Di", "Painting");
    }

    #[test]
    fn recompute_rebuilds_all_counters() {
        let db = TempDb::with_schema();
        let conn = db.connect().unwrap();
        seed(&conn);

        recompute(&conn).unwrap();

        let (courses, faculties) = counters(&conn);
        assert_eq!(
            courses,
            vec![
                ("CS101".to_string(), 2),
                ("EE201".to_string(), 1),
                ("Painting".to_string(), 1)
            ]
        );
        assert_eq!(
            faculties,
            vec![
                ("Engineering".to_string(), 2, 3),
                ("Arts".to_string(), 1, 1)
            ]
        );
    }

    #[test]
    fn recompute_is_idempotent() {
        let db = TempDb::with_schema();
        let conn = db.connect().unwrap();
        seed(&conn);

        recompute(&conn).unwrap();
        let first = counters(&conn);
        recompute(&conn).unwrap();
        assert_eq!(counters(&conn), first);
    }

    #[test]
    fn recompute_repairs_drifted_counters() {
        let db = TempDb::with_schema();
        let conn = db.connect().unwrap();
        seed(&conn);
        recompute(&conn).unwrap();
        let expected = counters(&conn);

        conn.execute("UPDATE courses SET Attendees = 99", []).unwrap();
        conn.execute("UPDATE faculties SET Courses = 7, Attendees = -3", [])
            .unwrap();
        recompute(&conn).unwrap();

        assert_eq!(counters(&conn), expected);
    }

    #[test]
    fn clearing_enrollment_keeps_the_course() {
        let db = TempDb::with_schema();
        let conn = db.connect().unwrap();
        seed(&conn);

        let removed = clear_course_enrollment(&conn, "CS101").unwrap();
        let names: Vec<_> = removed.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Bob"]);

        assert!(db::element_exists(&conn, TableKind::Courses, "CS101").unwrap());
        assert_eq!(db::stored_attendees(&conn, TableKind::Courses, "CS101").unwrap(), 0);
        assert_eq!(db::stored_course_count(&conn, "Engineering").unwrap(), 2);
        assert_eq!(
            db::stored_attendees(&conn, TableKind::Faculties, "Engineering").unwrap(),
            1
        );
    }

    #[test]
    fn deleting_a_course_removes_its_students() {
        let db = TempDb::with_schema();
        let conn = db.connect().unwrap();
        seed(&conn);

        assert_eq!(delete_course(&conn, "CS101").unwrap(), 2);

        assert!(db::fetch_students_for_course(&conn, "CS101").unwrap().is_empty());
        assert!(!db::element_exists(&conn, TableKind::Courses, "CS101").unwrap());
        assert_eq!(db::stored_course_count(&conn, "Engineering").unwrap(), 1);
        assert_eq!(
            db::stored_attendees(&conn, TableKind::Faculties, "Engineering").unwrap(),
            1
        );
    }

    #[test]
    fn deleting_unknown_course_changes_nothing() {
        let db = TempDb::with_schema();
        let conn = db.connect().unwrap();
        seed(&conn);

        let err = delete_course(&conn, "cs101").unwrap_err();
        assert!(matches!(err, RecordsError::NotFound { .. }));
        assert_eq!(db::fetch_students(&conn).unwrap().len(), 4);
    }

    #[test]
    fn faculty_with_courses_needs_cascade() {
        let db = TempDb::with_schema();
        let conn = db.connect().unwrap();
        seed(&conn);
        recompute(&conn).unwrap();

        let err = delete_faculty(&conn, "Engineering", false).unwrap_err();
        assert!(matches!(
            err,
            RecordsError::FacultyHasCourses { courses: 2, .. }
        ));
        assert_eq!(db::fetch_courses(&conn).unwrap().len(), 3);
        assert_eq!(db::fetch_students(&conn).unwrap().len(), 4);
    }

    #[test]
    fn faculty_cascade_removes_courses_and_students() {
        let db = TempDb::with_schema();
        let conn = db.connect().unwrap();
        seed(&conn);

        delete_faculty(&conn, "Engineering", true).unwrap();

        assert_eq!(db::fetch_faculty_names(&conn).unwrap(), vec!["Arts"]);
        assert_eq!(db::fetch_course_names(&conn).unwrap(), vec!["Painting"]);
        let students = db::fetch_students(&conn).unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].name, "Di");
        assert_eq!(
            db::stored_attendees(&conn, TableKind::Faculties, "Arts").unwrap(),
            1
        );
    }

    #[test]
    fn empty_faculty_is_deleted_directly() {
        let db = TempDb::with_schema();
        let conn = db.connect().unwrap();
        db::insert_faculty(&conn, "Law").unwrap();

        delete_faculty(&conn, "Law", false).unwrap();
        assert!(db::fetch_faculties(&conn).unwrap().is_empty());
    }

    #[test]
    fn faculty_courses_bulk_delete_keeps_faculty_row() {
        let db = TempDb::with_schema();
        let conn = db.connect().unwrap();
        seed(&conn);

        let deleted = delete_faculty_courses(&conn, "Engineering").unwrap();

        assert_eq!(deleted, vec!["CS101", "EE201"]);
        assert!(db::element_exists(&conn, TableKind::Faculties, "Engineering").unwrap());
        assert_eq!(db::stored_course_count(&conn, "Engineering").unwrap(), 0);
        assert_eq!(
            db::stored_attendees(&conn, TableKind::Faculties, "Engineering").unwrap(),
            0
        );
    }
}
