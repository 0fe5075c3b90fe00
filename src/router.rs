use crate::handlers::{
    access::{request_lecturer_access, request_student_access, verify_lecturer_access, verify_student_access},
    attendance::mark_attendance,
    courses::{create_course, create_courses, get_course, get_courses},
    health::health_check,
    lecturer_courses::assign_lecturer_to_course,
    lecturers::{
        create_lecturer, create_lecturers, get_attendance_records, get_lecturer, get_lecturer_by_email,
        get_lecturers,
    },
    lectures::{create_lecture, get_lecture_attendees},
    reports::{courses_ranking, lecturers_ranking, students_ranking},
    student_courses::register_student_courses,
    students::{create_student, create_students, get_student, get_students, update_student_photo},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Courses
        .route("/courses", post(create_course).get(get_courses))
        .route("/courses/batch", post(create_courses))
        .route("/courses/:course_id", get(get_course))
        // Lecturers
        .route("/lecturers", post(create_lecturer).get(get_lecturers))
        .route("/lecturers/batch", post(create_lecturers))
        .route("/lecturers/by-email", get(get_lecturer_by_email))
        .route("/lecturers/access/request", get(request_lecturer_access))
        .route("/lecturers/access/verify", get(verify_lecturer_access))
        .route("/lecturers/:lecturer_id", get(get_lecturer))
        .route("/lecturers/:lecturer_id/attendance-records", get(get_attendance_records))
        .route("/lecturer-courses", post(assign_lecturer_to_course))
        // Students
        .route("/students", post(create_student).get(get_students))
        .route("/students/batch", post(create_students))
        .route("/students/photo", post(update_student_photo))
        .route("/students/access/request", get(request_student_access))
        .route("/students/access/verify", get(verify_student_access))
        .route("/students/:matric_no", get(get_student))
        .route("/student-courses", post(register_student_courses))
        // Lectures and attendance
        .route("/lectures", post(create_lecture))
        .route("/lectures/:lecture_id/attendees", get(get_lecture_attendees))
        .route("/attendance", post(mark_attendance))
        // Reports
        .route("/reports/students-ranking", get(students_ranking))
        .route("/reports/courses-ranking", get(courses_ranking))
        .route("/reports/lecturers-ranking", get(lecturers_ranking))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
