//! This file serves as the root for all SeaORM entity modules.
//! Students, lecturers and courses are the principal records; lectures hang
//! off a course and the remaining tables are join rows recording
//! assignments, registrations and attendance.

pub mod attendee;
pub mod course;
pub mod lecture;
pub mod lecturer;
pub mod lecturer_course;
pub mod student;
pub mod student_course;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::attendee::Entity as Attendee;
    pub use super::course::Entity as Course;
    pub use super::lecture::Entity as Lecture;
    pub use super::lecturer::Entity as Lecturer;
    pub use super::lecturer_course::Entity as LecturerCourse;
    pub use super::student::Entity as Student;
    pub use super::student_course::Entity as StudentCourse;
}
