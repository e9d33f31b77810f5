//! Core library surface for the student records tool.
//!
//! Students, courses and faculties live in three SQLite tables. Courses and
//! faculties carry counters derived from the other tables; [`consistency`]
//! keeps them right across inserts, edits and cascading deletes, and
//! [`Registry`] bundles everything a front end needs behind one handle.
pub mod config;
pub mod consistency;
pub mod db;
pub mod enrollment;
pub mod error;
pub mod models;
pub mod registry;

/// Where the database lives.
pub use config::Config;
/// Handle to the SQLite file backing the registry.
pub use db::Database;
/// The crate-wide error type and its result alias.
pub use error::{RecordsError, Result};
/// Row types and the inputs used to create or edit them.
pub use models::{Course, Faculty, Gender, NewStudent, Student, StudentField, StudentUpdate, TableKind};
/// The entry point front ends use for every operation.
pub use registry::Registry;
