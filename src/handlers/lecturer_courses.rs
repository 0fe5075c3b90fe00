use crate::error::{ApiError, ApiResult, is_unique_violation};
use crate::extractors::ApiJson;
use crate::handlers::new_id;
use crate::helpers::validation::{not_blank, null_as_default, validate_in_order};
use crate::schemas::{ApiResponse, AppState};
use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use model::entities::{lecturer_course, prelude::*};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

const FORMERLY_ASSIGNED: &str = "The specified course was formerly assigned to the specified lecturer";

/// Request body for assigning a lecturer to a course
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignLecturerRequest {
    #[serde(deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "Lecturer id is required"))]
    pub lecturer_id: String,
    #[serde(deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "Course id is required"))]
    pub course_id: String,
}

/// Lecturer to course assignment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LecturerCourseResponse {
    pub id: String,
    pub lecturer_id: String,
    pub course_id: String,
    pub date_created: DateTime<Utc>,
}

impl From<lecturer_course::Model> for LecturerCourseResponse {
    fn from(model: lecturer_course::Model) -> Self {
        Self {
            id: model.id,
            lecturer_id: model.lecturer_id,
            course_id: model.course_id,
            date_created: model.date_created,
        }
    }
}

/// Assign a lecturer to a course
#[utoipa::path(
    post,
    path = "/lecturer-courses",
    tag = "lecturers",
    request_body = AssignLecturerRequest,
    responses(
        (status = 200, description = "Lecturer assigned successfully", body = ApiResponse<LecturerCourseResponse>),
        (status = 400, description = "Missing id or course formerly assigned", body = ApiResponse<String>),
        (status = 404, description = "Lecturer or course not found", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn assign_lecturer_to_course(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AssignLecturerRequest>,
) -> ApiResult<LecturerCourseResponse> {
    trace!("Entering assign_lecturer_to_course function");
    validate_in_order(&request, &["lecturer_id", "course_id"])?;

    if Lecturer::find_by_id(request.lecturer_id.clone()).one(&state.db).await?.is_none() {
        return Err(ApiError::not_found(
            "The specified lecturer was not found. Please provide a valid lecturer id",
        ));
    }
    if Course::find_by_id(request.course_id.clone()).one(&state.db).await?.is_none() {
        return Err(ApiError::not_found(
            "The specified course was not found. Please provide a valid course id",
        ));
    }

    let existing = LecturerCourse::find()
        .filter(lecturer_course::Column::LecturerId.eq(request.lecturer_id.clone()))
        .filter(lecturer_course::Column::CourseId.eq(request.course_id.clone()))
        .count(&state.db)
        .await?;
    if existing > 0 {
        return Err(ApiError::bad_request(FORMERLY_ASSIGNED));
    }

    let assignment = lecturer_course::ActiveModel {
        id: Set(new_id()),
        lecturer_id: Set(request.lecturer_id),
        course_id: Set(request.course_id),
        date_created: Set(Utc::now()),
    };

    let assignment = match assignment.insert(&state.db).await {
        Ok(assignment) => assignment,
        Err(e) if is_unique_violation(&e) => {
            warn!("Concurrent assignment of the same pair: {}", e);
            return Err(ApiError::bad_request(FORMERLY_ASSIGNED));
        }
        Err(e) => return Err(e.into()),
    };
    info!(
        "Lecturer {} assigned to course {}",
        assignment.lecturer_id, assignment.course_id
    );

    Ok(Json(ApiResponse::success(LecturerCourseResponse::from(assignment))))
}
