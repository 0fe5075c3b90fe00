pub mod access;
pub mod attendance;
pub mod courses;
pub mod health;
pub mod lecturer_courses;
pub mod lecturers;
pub mod lectures;
pub mod reports;
pub mod student_courses;
pub mod students;

/// Identifier for a newly created record.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
