//! Domain models that mirror the three SQLite tables. These stay light-weight
//! data holders so the store and the consistency rules can pass them around
//! freely; anything derived (attendee and course counters) is read back from
//! the database rather than computed here.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::error::RecordsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The three tables the tool manages. Every name-based lookup (existence,
/// counters) is addressed through one of these so table names never come from
/// user input.
pub enum TableKind {
    Students,
    Courses,
    Faculties,
}

impl TableKind {
    /// SQL table name backing this kind.
    pub fn table_name(self) -> &'static str {
        match self {
            TableKind::Students => "students",
            TableKind::Courses => "courses",
            TableKind::Faculties => "faculties",
        }
    }

    /// Singular label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            TableKind::Students => "student",
            TableKind::Courses => "course",
            TableKind::Faculties => "faculty",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TableKind {
    type Err = RecordsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" | "students" => Ok(TableKind::Students),
            "course" | "courses" => Ok(TableKind::Courses),
            "faculty" | "faculties" => Ok(TableKind::Faculties),
            other => Err(RecordsError::Validation(format!(
                "unknown table '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = RecordsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(RecordsError::Validation(format!(
                "unknown gender '{other}'"
            ))),
        }
    }
}

impl ToSql for Gender {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Gender {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse()
            .map_err(|err: RecordsError| FromSqlError::Other(Box::new(err)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A row of the `students` table. `course`, `started` and `graduation` are
/// fixed at enrollment; only the personal fields can be edited afterwards.
pub struct Student {
    /// Store-assigned primary key.
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub age: u32,
    pub gender: Gender,
    /// Name of the course the student attends. Links are by exact name.
    pub course: String,
    pub started: NaiveDate,
    /// Derived from `started` plus the course duration at insert time.
    pub graduation: NaiveDate,
}

impl Student {
    /// `Name Surname`, as shown in listings.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

/// Input for a new student. The id and graduation date are assigned by the
/// store and the enrollment calculator respectively.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub surname: String,
    pub age: u32,
    pub gender: Gender,
    pub course: String,
    pub started: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A row of the `courses` table.
pub struct Course {
    pub id: i64,
    pub name: String,
    /// Name of the owning faculty.
    pub faculty: String,
    /// Length of the course in calendar months.
    pub duration: u32,
    /// Stored counter, only correct as of the last recompute.
    pub attendees: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A row of the `faculties` table. Both counters are maintained by the
/// consistency engine and never edited directly.
pub struct Faculty {
    pub id: i64,
    pub name: String,
    pub courses: i64,
    pub attendees: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Student columns that may change after enrollment.
pub enum StudentField {
    Name,
    Surname,
    Age,
    Gender,
}

impl StudentField {
    pub fn column(self) -> &'static str {
        match self {
            StudentField::Name => "Name",
            StudentField::Surname => "Surname",
            StudentField::Age => "Age",
            StudentField::Gender => "Gender",
        }
    }
}

impl FromStr for StudentField {
    type Err = RecordsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(StudentField::Name),
            "surname" => Ok(StudentField::Surname),
            "age" => Ok(StudentField::Age),
            "gender" => Ok(StudentField::Gender),
            other => Err(RecordsError::Validation(format!(
                "student field '{other}' cannot be edited"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single parsed cell edit. Building one of these is the only way to reach
/// the update query, so course and dates are unreachable by construction.
pub enum StudentUpdate {
    Name(String),
    Surname(String),
    Age(u32),
    Gender(Gender),
}

impl StudentUpdate {
    /// Parse raw shell input for `field` into a typed update.
    pub fn parse(field: StudentField, value: &str) -> Result<Self, RecordsError> {
        let value = value.trim();
        match field {
            StudentField::Name => non_empty(value, "name").map(StudentUpdate::Name),
            StudentField::Surname => non_empty(value, "surname").map(StudentUpdate::Surname),
            StudentField::Age => parse_age(value).map(StudentUpdate::Age),
            StudentField::Gender => value.parse().map(StudentUpdate::Gender),
        }
    }

    pub fn field(&self) -> StudentField {
        match self {
            StudentUpdate::Name(_) => StudentField::Name,
            StudentUpdate::Surname(_) => StudentField::Surname,
            StudentUpdate::Age(_) => StudentField::Age,
            StudentUpdate::Gender(_) => StudentField::Gender,
        }
    }
}

fn non_empty(value: &str, what: &str) -> Result<String, RecordsError> {
    if value.is_empty() {
        Err(RecordsError::Validation(format!("{what} must not be empty")))
    } else {
        Ok(value.to_string())
    }
}

/// Ages are positive integers; zero and anything unparsable are rejected.
pub fn parse_age(value: &str) -> Result<u32, RecordsError> {
    match value.trim().parse::<u32>() {
        Ok(age) if age > 0 => Ok(age),
        _ => Err(RecordsError::Validation(format!(
            "age '{value}' is not a positive integer"
        ))),
    }
}
