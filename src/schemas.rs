use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::handlers::{
    attendance::MarkAttendanceRequest,
    courses::{CourseResponse, CourseWithLecturersResponse, CreateCourseRequest, LecturerSummary},
    lecturer_courses::{AssignLecturerRequest, LecturerCourseResponse},
    lecturers::{
        AttendanceRecordsResponse, CourseAttendanceRecord, CreateLecturerRequest, LectureAttendanceRecord,
        LecturerResponse, LecturerWithCoursesResponse,
    },
    lectures::{AttendeeResponse, CreateLectureRequest, LectureResponse},
    student_courses::{RegisterStudentCoursesRequest, StudentCourseResponse},
    students::{CreateStudentRequest, StudentResponse, UpdateStudentPhotoRequest},
};
use crate::mailer::Mailer;
pub use common::{ApiResponse, ErrorResult, Issue, WarningResult};
use common::{CourseRanking, LecturerRanking, StudentRanking};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Dispatcher for access code emails
    pub mailer: Arc<dyn Mailer>,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::courses::create_course,
        crate::handlers::courses::create_courses,
        crate::handlers::courses::get_courses,
        crate::handlers::courses::get_course,
        crate::handlers::lecturers::create_lecturer,
        crate::handlers::lecturers::create_lecturers,
        crate::handlers::lecturers::get_lecturers,
        crate::handlers::lecturers::get_lecturer,
        crate::handlers::lecturers::get_lecturer_by_email,
        crate::handlers::lecturers::get_attendance_records,
        crate::handlers::lecturer_courses::assign_lecturer_to_course,
        crate::handlers::students::create_student,
        crate::handlers::students::create_students,
        crate::handlers::students::get_students,
        crate::handlers::students::get_student,
        crate::handlers::students::update_student_photo,
        crate::handlers::student_courses::register_student_courses,
        crate::handlers::lectures::create_lecture,
        crate::handlers::lectures::get_lecture_attendees,
        crate::handlers::attendance::mark_attendance,
        crate::handlers::access::request_lecturer_access,
        crate::handlers::access::verify_lecturer_access,
        crate::handlers::access::request_student_access,
        crate::handlers::access::verify_student_access,
        crate::handlers::reports::students_ranking,
        crate::handlers::reports::courses_ranking,
        crate::handlers::reports::lecturers_ranking,
    ),
    components(
        schemas(
            HealthResponse,
            Issue,
            WarningResult,
            ErrorResult,
            ApiResponse<String>,
            CreateCourseRequest,
            CourseResponse,
            CourseWithLecturersResponse,
            LecturerSummary,
            CreateLecturerRequest,
            LecturerResponse,
            LecturerWithCoursesResponse,
            AttendanceRecordsResponse,
            CourseAttendanceRecord,
            LectureAttendanceRecord,
            AssignLecturerRequest,
            LecturerCourseResponse,
            CreateStudentRequest,
            StudentResponse,
            UpdateStudentPhotoRequest,
            RegisterStudentCoursesRequest,
            StudentCourseResponse,
            CreateLectureRequest,
            LectureResponse,
            AttendeeResponse,
            MarkAttendanceRequest,
            StudentRanking,
            CourseRanking,
            LecturerRanking,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "courses", description = "Course management endpoints"),
        (name = "lecturers", description = "Lecturer management endpoints"),
        (name = "students", description = "Student management endpoints"),
        (name = "lectures", description = "Lecture and attendance endpoints"),
        (name = "access", description = "Access code request and verification"),
        (name = "reports", description = "Attendance ranking reports"),
    ),
    info(
        title = "Slat API",
        version = "0.1.0",
        description = "Attendance management backend for courses, lecturers, students and lectures",
    )
)]
pub struct ApiDoc;
