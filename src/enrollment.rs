//! Graduation dates and the insert path for new students.

use chrono::{Months, NaiveDate};
use log::info;
use rusqlite::Connection;

use crate::db;
use crate::error::{RecordsError, Result};
use crate::models::{NewStudent, Student, TableKind};

/// `started` plus `months` calendar months. Days past the end of the target
/// month clamp to its last day, so 2024-01-31 plus one month is 2024-02-29.
pub fn graduation_date(started: NaiveDate, months: u32) -> Result<NaiveDate> {
    started.checked_add_months(Months::new(months)).ok_or_else(|| {
        RecordsError::Validation(format!(
            "{started} plus {months} month(s) is out of the supported date range"
        ))
    })
}

/// Look up the course duration, derive the graduation date and insert the
/// student. Nothing is written when the course is missing. Counters are not
/// touched here.
pub fn enroll(conn: &Connection, student: &NewStudent) -> Result<Student> {
    let duration =
        db::course_duration(conn, &student.course)?.ok_or_else(|| RecordsError::ReferentialGap {
            kind: TableKind::Courses,
            name: student.course.clone(),
        })?;

    let graduation = graduation_date(student.started, duration)?;
    let inserted = db::insert_student(conn, student, graduation)?;
    info!(
        "enrolled {} in '{}' ({} to {})",
        inserted.full_name(),
        inserted.course,
        inserted.started,
        inserted.graduation
    );
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::TempDb;
    use crate::models::Gender;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn graduation_adds_calendar_months() {
        assert_eq!(graduation_date(date(2024, 1, 15), 6).unwrap(), date(2024, 7, 15));
        assert_eq!(graduation_date(date(2023, 11, 1), 3).unwrap(), date(2024, 2, 1));
        assert_eq!(graduation_date(date(2024, 5, 5), 0).unwrap(), date(2024, 5, 5));
    }

    #[test]
    fn graduation_clamps_to_month_end() {
        assert_eq!(graduation_date(date(2024, 1, 31), 1).unwrap(), date(2024, 2, 29));
        assert_eq!(graduation_date(date(2023, 1, 31), 1).unwrap(), date(2023, 2, 28));
        assert_eq!(graduation_date(date(2024, 8, 31), 1).unwrap(), date(2024, 9, 30));
    }

    #[test]
    fn enrollment_uses_course_duration() {
        let db = TempDb::with_schema();
        let conn = db.connect().unwrap();
        db::insert_course(&conn, "CS101", "Engineering", 6).unwrap();

        let student = enroll(
            &conn,
            &NewStudent {
                name: "A".into(),
                surname: "Smith".into(),
                age: 19,
                gender: Gender::Other,
                course: "CS101".into(),
                started: date(2024, 1, 15),
            },
        )
        .unwrap();

        assert_eq!(student.graduation, date(2024, 7, 15));
        assert_eq!(db::fetch_students(&conn).unwrap(), vec![student]);
    }

    #[test]
    fn enrollment_in_missing_course_inserts_nothing() {
        let db = TempDb::with_schema();
        let conn = db.connect().unwrap();

        let err = enroll(
            &conn,
            &NewStudent {
                name: "A".into(),
                surname: "Smith".into(),
                age: 19,
                gender: Gender::Male,
                course: "Gone".into(),
                started: date(2024, 1, 15),
            },
        )
        .unwrap_err();

        assert!(matches!(err, RecordsError::ReferentialGap { .. }));
        assert!(db::fetch_students(&conn).unwrap().is_empty());
    }
}
