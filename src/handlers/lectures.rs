use crate::error::{ApiError, ApiResult};
use crate::extractors::ApiJson;
use crate::handlers::new_id;
use crate::helpers::validation::{non_blank, not_blank, null_as_default, validate_in_order};
use crate::schemas::{ApiResponse, AppState};
use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use common::{Issue, codes};
use model::entities::{lecture, lecturer_course, prelude::*, student};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a lecture
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateLectureRequest {
    #[serde(deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "Lecturer id is required"))]
    pub lecturer_id: String,
    #[serde(deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "Course id is required"))]
    pub course_id: String,
    /// Generated from the course when absent or blank
    pub title: Option<String>,
    /// Generated from the course and lecturer when absent or blank
    pub description: Option<String>,
}

/// Lecture response model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LectureResponse {
    pub id: String,
    pub course_id: String,
    pub lecturer_id: String,
    pub title: String,
    pub description: String,
    pub date_created: DateTime<Utc>,
}

impl From<lecture::Model> for LectureResponse {
    fn from(model: lecture::Model) -> Self {
        Self {
            id: model.id,
            course_id: model.course_id,
            lecturer_id: model.lecturer_id,
            title: model.title,
            description: model.description,
            date_created: model.date_created,
        }
    }
}

/// Student who attended a lecture
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeResponse {
    pub matric_no: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<student::Model> for AttendeeResponse {
    fn from(model: student::Model) -> Self {
        Self {
            matric_no: model.matric_no,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
        }
    }
}

fn default_title(ordinal: u64, course_title: &str, course_code: &str) -> String {
    format!("Lecture {} | {} ({})", ordinal, course_title, course_code)
}

fn default_description(ordinal: u64, course_title: &str, first_name: &str, last_name: &str) -> String {
    format!(
        "This is lecture number {} on {} taken by {} {}",
        ordinal, course_title, first_name, last_name
    )
}

/// Create a lecture for a course the lecturer is assigned to
#[utoipa::path(
    post,
    path = "/lectures",
    tag = "lectures",
    request_body = CreateLectureRequest,
    responses(
        (status = 200, description = "Lecture created successfully", body = ApiResponse<LectureResponse>),
        (status = 400, description = "Missing lecturer or course id", body = ApiResponse<String>),
        (status = 403, description = "Lecturer is not assigned to the course", body = ApiResponse<String>),
        (status = 404, description = "Lecturer or course not found", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn create_lecture(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateLectureRequest>,
) -> ApiResult<LectureResponse> {
    trace!("Entering create_lecture function");
    validate_in_order(&request, &["lecturer_id", "course_id"])?;

    let lecturer = Lecturer::find_by_id(request.lecturer_id.clone())
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            ApiError::not_found("The specified lecturer was not found. Please provide a valid lecturer id")
        })?;

    let course = Course::find_by_id(request.course_id.clone())
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            ApiError::not_found("The specified course was not found. Please provide a valid course id")
        })?;

    let assigned = LecturerCourse::find()
        .filter(lecturer_course::Column::LecturerId.eq(lecturer.id.clone()))
        .filter(lecturer_course::Column::CourseId.eq(course.id.clone()))
        .count(&state.db)
        .await?;
    if assigned == 0 {
        let message = "The specified lecturer does not own the specified course";
        return Err(ApiError::forbidden_with_issue(
            message,
            Issue::new(403, codes::LECTURER_COURSE_MISMATCH, "Lecturer and Course Mismatch", message),
        ));
    }

    let ordinal = Lecture::find()
        .filter(lecture::Column::CourseId.eq(course.id.clone()))
        .count(&state.db)
        .await?
        + 1;
    debug!("Creating lecture number {} for course {}", ordinal, course.code);

    let title = non_blank(request.title)
        .unwrap_or_else(|| default_title(ordinal, &course.title, &course.code));
    let description = non_blank(request.description).unwrap_or_else(|| {
        default_description(ordinal, &course.title, &lecturer.first_name, &lecturer.last_name)
    });

    let lecture = lecture::ActiveModel {
        id: Set(new_id()),
        course_id: Set(course.id),
        lecturer_id: Set(lecturer.id),
        title: Set(title),
        description: Set(description),
        date_created: Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;
    info!("Lecture created with ID: {}, title: {}", lecture.id, lecture.title);

    Ok(Json(ApiResponse::success(LectureResponse::from(lecture))))
}

/// Get the students who attended a lecture
#[utoipa::path(
    get,
    path = "/lectures/{lecture_id}/attendees",
    tag = "lectures",
    params(
        ("lecture_id" = String, Path, description = "Lecture ID")
    ),
    responses(
        (status = 200, description = "Attendees retrieved successfully", body = ApiResponse<Vec<AttendeeResponse>>),
        (status = 404, description = "Lecture not found", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn get_lecture_attendees(
    State(state): State<AppState>,
    Path(lecture_id): Path<String>,
) -> ApiResult<Vec<AttendeeResponse>> {
    trace!("Entering get_lecture_attendees function");
    let lecture = Lecture::find_by_id(lecture_id.clone())
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "The specified lecture id: {} does not match an existing lecture",
                lecture_id
            ))
        })?;

    let attendees = lecture.find_related(Student).all(&state.db).await?;
    debug!("Lecture {} has {} attendees", lecture.id, attendees.len());

    Ok(Json(ApiResponse::success(
        attendees.into_iter().map(AttendeeResponse::from).collect(),
    )))
}
