//! Command-line front end. Each subcommand parses and validates its input,
//! then makes exactly one call into the [`Registry`].
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use student_records::{Config, Database, Gender, NewStudent, Registry, TableKind};

#[derive(Parser)]
#[command(name = "student-records", about = "Manage students, courses and faculties")]
struct Cli {
    /// SQLite file to use instead of the configured one.
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the database can be opened.
    Ping,
    AddFaculty {
        name: String,
    },
    AddCourse {
        name: String,
        #[arg(long)]
        faculty: String,
        /// Length in months.
        #[arg(long)]
        duration: u32,
    },
    AddStudent {
        #[arg(long)]
        name: String,
        #[arg(long)]
        surname: String,
        #[arg(long, value_parser = parse_age)]
        age: u32,
        #[arg(long)]
        gender: Gender,
        #[arg(long)]
        course: String,
        /// Enrollment date, YYYY-MM-DD.
        #[arg(long, value_parser = parse_date)]
        started: NaiveDate,
    },
    DeleteStudent {
        id: i64,
    },
    /// Delete a course and every student attending it.
    DeleteCourse {
        name: String,
    },
    /// Remove every student from a course, keeping the course.
    ClearCourse {
        name: String,
    },
    DeleteFaculty {
        name: String,
        /// Also delete the faculty's courses and their students.
        #[arg(long)]
        cascade: bool,
    },
    /// Edit name, surname, age or gender of a student.
    UpdateStudent {
        id: i64,
        field: String,
        value: String,
    },
    Students,
    Courses,
    Faculties,
    /// Stored attendee count of a course or faculty.
    Attendees {
        kind: TableKind,
        name: String,
    },
    /// Stored course count of a faculty.
    CourseCount {
        faculty: String,
    },
    Exists {
        kind: TableKind,
        name: String,
    },
    /// Rebuild every derived counter.
    Recompute,
}

fn parse_age(raw: &str) -> Result<u32, String> {
    student_records::models::parse_age(raw).map_err(|err| err.to_string())
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("'{raw}' is not a valid YYYY-MM-DD date"))
}

/// Resolve the configuration, bring up the schema, and run one command.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::load(cli.database)?;

    let registry =
        Registry::open(Database::new(&config)).context("failed to open records database")?;
    run(&registry, cli.command)
}

fn run(registry: &Registry, command: Command) -> Result<()> {
    match command {
        Command::Ping => {
            registry.test_connection()?;
            println!("Connection successful: {}", registry.database().path().display());
        }
        Command::AddFaculty { name } => {
            let faculty = registry.add_faculty(&name)?;
            println!("Added faculty {} (#{})", faculty.name, faculty.id);
        }
        Command::AddCourse {
            name,
            faculty,
            duration,
        } => {
            let course = registry.add_course(&name, &faculty, duration)?;
            println!(
                "Added course {} to {} ({} months)",
                course.name, course.faculty, course.duration
            );
        }
        Command::AddStudent {
            name,
            surname,
            age,
            gender,
            course,
            started,
        } => {
            let student = registry.add_student(&NewStudent {
                name,
                surname,
                age,
                gender,
                course,
                started,
            })?;
            println!(
                "Enrolled {} (#{}) in {}, graduating {}",
                student.full_name(),
                student.id,
                student.course,
                student.graduation
            );
        }
        Command::DeleteStudent { id } => {
            registry.delete_student(id)?;
            println!("Deleted student #{id}");
        }
        Command::DeleteCourse { name } => {
            let removed = registry.delete_course(&name)?;
            println!("Deleted course {name} and {removed} student(s)");
        }
        Command::ClearCourse { name } => {
            let removed = registry.clear_course_enrollment(&name)?;
            for student in &removed {
                println!("Removed #{} {}", student.id, student.full_name());
            }
            println!("Removed {} student(s) from {name}", removed.len());
        }
        Command::DeleteFaculty { name, cascade } => {
            registry.delete_faculty(&name, cascade)?;
            println!("Deleted faculty {name}");
        }
        Command::UpdateStudent { id, field, value } => {
            registry.update_student_field(id, &field, &value)?;
            println!("Updated {field} of student #{id}");
        }
        Command::Students => {
            for s in registry.list_students()? {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    s.id, s.name, s.surname, s.age, s.gender, s.course, s.started, s.graduation
                );
            }
        }
        Command::Courses => {
            for course in registry.courses()? {
                println!(
                    "{}\t{}\t{} months\t{} attendee(s)",
                    course.name, course.faculty, course.duration, course.attendees
                );
            }
        }
        Command::Faculties => {
            for faculty in registry.faculties()? {
                println!(
                    "{}\t{} course(s)\t{} attendee(s)",
                    faculty.name, faculty.courses, faculty.attendees
                );
            }
        }
        Command::Attendees { kind, name } => {
            println!("{}", registry.attendee_count(kind, &name)?);
        }
        Command::CourseCount { faculty } => {
            println!("{}", registry.course_count(&faculty)?);
        }
        Command::Exists { kind, name } => {
            println!("{}", registry.element_exists(kind, &name)?);
        }
        Command::Recompute => {
            registry.recompute()?;
            println!("Counters rebuilt");
        }
    }
    Ok(())
}
