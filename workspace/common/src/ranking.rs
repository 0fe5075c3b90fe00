use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A student together with the number of lectures they attended.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudentRanking {
    pub student_id: String,
    pub matric_no: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub attendance_count: u64,
}

/// A course together with the attendance recorded across its lectures.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseRanking {
    pub course_id: String,
    pub course_code: String,
    pub course_title: String,
    pub course_unit: i32,
    pub attendance_count: u64,
}

/// A lecturer together with the attendance recorded across the lectures
/// they created.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LecturerRanking {
    pub lecturer_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub attendance_count: u64,
}
