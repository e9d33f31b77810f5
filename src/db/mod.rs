//! Persistence module split across logical submodules. Functions here take a
//! borrowed connection and touch rows only; keeping the derived counters in
//! line is the job of [`crate::consistency`].

mod connection;
mod courses;
mod faculties;
mod queries;
mod students;

pub use connection::{ensure_schema, table_exists, Database};
pub use courses::{
    count_courses_for_faculty, course_duration, delete_course, fetch_course_names,
    fetch_course_names_for_faculty, fetch_courses, insert_course,
};
pub use faculties::{delete_faculty, fetch_faculties, fetch_faculty_names, insert_faculty};
pub use queries::{element_exists, stored_attendees, stored_course_count};
pub use students::{
    delete_student, delete_students_for_course, fetch_students, fetch_students_for_course,
    insert_student, update_student,
};
