//! The operations a presentation shell calls. Every method opens its own
//! connection, runs one mutation or lookup followed by whatever counter
//! recompute it needs, and drops the connection before returning. Inputs come
//! in as arguments; the registry keeps no state besides the endpoint.

use log::{info, warn};
use rusqlite::Connection;

use crate::consistency;
use crate::db::{self, Database};
use crate::enrollment;
use crate::error::{RecordsError, Result};
use crate::models::{Course, Faculty, NewStudent, Student, StudentField, StudentUpdate, TableKind};

#[derive(Debug, Clone)]
pub struct Registry {
    db: Database,
}

impl Registry {
    /// Wrap an endpoint and make sure the three tables exist.
    pub fn open(database: Database) -> Result<Self> {
        let registry = Self { db: database };
        registry.run("ensure schema", db::ensure_schema)?;
        Ok(registry)
    }

    /// Endpoint this registry connects through.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Open and release a connection.
    pub fn test_connection(&self) -> Result<()> {
        self.db
            .test_connection()
            .inspect_err(|err| warn!("connection test failed: {err}"))
    }

    /// Add a faculty with both counters at zero. The name is stored exactly as
    /// given and must not already exist.
    pub fn add_faculty(&self, name: &str) -> Result<Faculty> {
        required(name, "faculty name")?;
        self.run("add faculty", |conn| {
            reject_duplicate(conn, TableKind::Faculties, name)?;
            let faculty = db::insert_faculty(conn, name)?;
            info!("added faculty '{name}'");
            Ok(faculty)
        })
    }

    /// Add a course under an existing faculty and refresh the counters so the
    /// faculty's course count includes it.
    pub fn add_course(&self, name: &str, faculty: &str, duration_months: u32) -> Result<Course> {
        required(name, "course name")?;
        required(faculty, "faculty name")?;
        if duration_months == 0 {
            return Err(RecordsError::Validation(
                "course duration must be at least one month".to_string(),
            ));
        }

        self.run("add course", |conn| {
            reject_duplicate(conn, TableKind::Courses, name)?;
            require(conn, TableKind::Faculties, faculty)?;
            let course = db::insert_course(conn, name, faculty, duration_months)?;
            consistency::recompute(conn)?;
            info!("added course '{name}' to faculty '{faculty}'");
            Ok(course)
        })
    }

    /// Enroll a student in an existing course, deriving the graduation date
    /// from the course duration, then refresh the counters.
    pub fn add_student(&self, student: &NewStudent) -> Result<Student> {
        required(&student.name, "name")?;
        required(&student.surname, "surname")?;
        required(&student.course, "course")?;
        if student.age == 0 {
            return Err(RecordsError::Validation(
                "age must be a positive integer".to_string(),
            ));
        }

        self.run("add student", |conn| {
            let inserted = enrollment::enroll(conn, student)?;
            consistency::recompute(conn)?;
            Ok(inserted)
        })
    }

    /// Delete one student by id and refresh the counters.
    pub fn delete_student(&self, id: i64) -> Result<()> {
        self.run("delete student", |conn| {
            db::delete_student(conn, id)?;
            consistency::recompute(conn)?;
            info!("deleted student {id}");
            Ok(())
        })
    }

    /// Delete a course and every student attending it. Returns how many
    /// students went with it.
    pub fn delete_course(&self, name: &str) -> Result<usize> {
        self.run("delete course", |conn| consistency::delete_course(conn, name))
    }

    /// Remove every student from a course but keep the course. Returns the
    /// students that were removed.
    pub fn clear_course_enrollment(&self, name: &str) -> Result<Vec<Student>> {
        self.run("clear course enrollment", |conn| {
            consistency::clear_course_enrollment(conn, name)
        })
    }

    /// Delete a faculty. With `cascade` unset a faculty that still has courses
    /// is refused with [`RecordsError::FacultyHasCourses`].
    pub fn delete_faculty(&self, name: &str, cascade: bool) -> Result<()> {
        self.run("delete faculty", |conn| {
            consistency::delete_faculty(conn, name, cascade)
        })
    }

    /// Delete every course of a faculty (and their students) without removing
    /// the faculty itself.
    pub fn delete_faculty_courses(&self, name: &str) -> Result<Vec<String>> {
        self.run("delete faculty courses", |conn| {
            require(conn, TableKind::Faculties, name)?;
            consistency::delete_faculty_courses(conn, name)
        })
    }

    /// Edit one of name, surname, age or gender from raw text. Any other field
    /// is rejected before the database is touched.
    pub fn update_student_field(&self, id: i64, field: &str, value: &str) -> Result<()> {
        let field: StudentField = field.parse()?;
        let update = StudentUpdate::parse(field, value)?;
        self.update_student(id, &update)
    }

    /// Apply an already parsed edit. Counters are untouched since no edit can
    /// move a student between courses.
    pub fn update_student(&self, id: i64, update: &StudentUpdate) -> Result<()> {
        self.run("update student", |conn| {
            db::update_student(conn, id, update)?;
            info!("updated {} of student {id}", update.field().column());
            Ok(())
        })
    }

    /// Rebuild every derived counter from the current rows. Safe to call at
    /// any time, and the way to recover after a cascade was halted.
    pub fn recompute(&self) -> Result<()> {
        self.run("recompute counters", consistency::recompute)
    }

    /// Every student in insertion order.
    pub fn list_students(&self) -> Result<Vec<Student>> {
        self.run("list students", db::fetch_students)
    }

    /// Course names in storage order.
    pub fn list_courses(&self) -> Result<Vec<String>> {
        self.run("list courses", db::fetch_course_names)
    }

    /// Faculty names in storage order.
    pub fn list_faculties(&self) -> Result<Vec<String>> {
        self.run("list faculties", db::fetch_faculty_names)
    }

    /// Full course rows, counters included.
    pub fn courses(&self) -> Result<Vec<Course>> {
        self.run("load courses", db::fetch_courses)
    }

    /// Full faculty rows, counters included.
    pub fn faculties(&self) -> Result<Vec<Faculty>> {
        self.run("load faculties", db::fetch_faculties)
    }

    /// Stored attendee counter for a course or faculty; may lag behind the
    /// rows until the next recompute.
    pub fn attendee_count(&self, kind: TableKind, name: &str) -> Result<i64> {
        self.run("read attendees", |conn| db::stored_attendees(conn, kind, name))
    }

    /// Stored course counter for a faculty.
    pub fn course_count(&self, faculty: &str) -> Result<i64> {
        self.run("read course count", |conn| {
            db::stored_course_count(conn, faculty)
        })
    }

    /// Case-sensitive exact match on the Name column of `kind`'s table.
    pub fn element_exists(&self, kind: TableKind, name: &str) -> Result<bool> {
        self.run("check existence", |conn| db::element_exists(conn, kind, name))
    }

    /// Connect, run `op`, and log the failure if there is one. The connection
    /// is closed when this returns.
    fn run<T>(&self, what: &str, op: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        self.db
            .connect()
            .and_then(|conn| op(&conn))
            .inspect_err(|err| warn!("{what} failed: {err}"))
    }
}

/// Reject blank input. The value itself is never rewritten, so every later
/// lookup sees the same name that was stored.
fn required(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(RecordsError::Validation(format!("{what} must not be empty")))
    } else {
        Ok(())
    }
}

fn reject_duplicate(conn: &Connection, kind: TableKind, name: &str) -> Result<()> {
    if db::element_exists(conn, kind, name)? {
        Err(RecordsError::DuplicateName {
            kind,
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

fn require(conn: &Connection, kind: TableKind, name: &str) -> Result<()> {
    if db::element_exists(conn, kind, name)? {
        Ok(())
    } else {
        Err(RecordsError::ReferentialGap {
            kind,
            name: name.to_string(),
        })
    }
}
