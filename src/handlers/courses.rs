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
use model::entities::{course, lecturer, prelude::*};
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

const COURSE_FIELDS: [&str; 3] = ["course_code", "course_title", "course_unit"];

/// Request body for creating a course.
///
/// Accepts both the prefixed (`courseCode`) and the short (`code`) field names.
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCourseRequest {
    #[serde(alias = "code", deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "Course code cannot be null"))]
    pub course_code: String,
    #[serde(alias = "title", deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "Course title cannot be null"))]
    pub course_title: String,
    /// Number of units, must be positive
    #[serde(alias = "unit", deserialize_with = "null_as_default")]
    #[validate(range(min = 1, message = "Course unit cannot be less than or equal to zero"))]
    pub course_unit: i32,
    #[serde(alias = "description")]
    pub course_description: Option<String>,
}

impl CreateCourseRequest {
    fn into_active_model(self) -> course::ActiveModel {
        course::ActiveModel {
            id: Set(new_id()),
            code: Set(self.course_code),
            title: Set(self.course_title),
            unit: Set(self.course_unit),
            description: Set(non_blank(self.course_description)),
            date_created: Set(Utc::now()),
        }
    }
}

/// Course response model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub course_id: String,
    pub course_code: String,
    pub course_title: String,
    pub course_unit: i32,
    pub course_description: Option<String>,
    pub date_created: DateTime<Utc>,
}

impl From<course::Model> for CourseResponse {
    fn from(model: course::Model) -> Self {
        Self {
            course_id: model.id,
            course_code: model.code,
            course_title: model.title,
            course_unit: model.unit,
            course_description: model.description,
            date_created: model.date_created,
        }
    }
}

/// Lecturer as listed on a course
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LecturerSummary {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub photo: Option<String>,
}

impl From<lecturer::Model> for LecturerSummary {
    fn from(model: lecturer::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            photo: model.photo,
        }
    }
}

/// Course together with its assigned lecturers
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseWithLecturersResponse {
    pub course_id: String,
    pub course_code: String,
    pub course_title: String,
    pub course_unit: i32,
    pub course_description: Option<String>,
    pub date_created: DateTime<Utc>,
    pub lecturers: Vec<LecturerSummary>,
}

impl CourseWithLecturersResponse {
    fn new(course: course::Model, lecturers: Vec<lecturer::Model>) -> Self {
        Self {
            course_id: course.id,
            course_code: course.code,
            course_title: course.title,
            course_unit: course.unit,
            course_description: course.description,
            date_created: course.date_created,
            lecturers: lecturers.into_iter().map(LecturerSummary::from).collect(),
        }
    }
}

/// Create a new course
#[utoipa::path(
    post,
    path = "/courses",
    tag = "courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 200, description = "Course created successfully", body = ApiResponse<CourseResponse>),
        (status = 400, description = "Missing or invalid field", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn create_course(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCourseRequest>,
) -> ApiResult<CourseResponse> {
    trace!("Entering create_course function");
    validate_in_order(&request, &COURSE_FIELDS)?;

    let course = request.into_active_model().insert(&state.db).await?;
    info!("Course created with ID: {}, code: {}", course.id, course.code);

    Ok(Json(ApiResponse::success(CourseResponse::from(course))))
}

/// Create several courses at once
///
/// Every entry is validated before anything is written; the courses are then
/// inserted in a single transaction.
#[utoipa::path(
    post,
    path = "/courses/batch",
    tag = "courses",
    request_body = Vec<CreateCourseRequest>,
    responses(
        (status = 200, description = "Courses created successfully", body = ApiResponse<Vec<CourseResponse>>),
        (status = 400, description = "An entry has a missing or invalid field", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state, requests), fields(count = requests.len()))]
pub async fn create_courses(
    State(state): State<AppState>,
    ApiJson(requests): ApiJson<Vec<CreateCourseRequest>>,
) -> ApiResult<Vec<CourseResponse>> {
    trace!("Entering create_courses function");
    for request in &requests {
        validate_in_order(request, &COURSE_FIELDS)?;
    }

    let txn = state.db.begin().await?;
    let mut created = Vec::with_capacity(requests.len());
    for request in requests {
        let course = request.into_active_model().insert(&txn).await?;
        debug!("Inserted course {} ({})", course.code, course.id);
        created.push(CourseResponse::from(course));
    }
    txn.commit().await?;

    info!("Created {} courses", created.len());
    Ok(Json(ApiResponse::success(created)))
}

/// Get all courses with their lecturers
#[utoipa::path(
    get,
    path = "/courses",
    tag = "courses",
    responses(
        (status = 200, description = "Courses retrieved successfully", body = ApiResponse<Vec<CourseWithLecturersResponse>>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn get_courses(State(state): State<AppState>) -> ApiResult<Vec<CourseWithLecturersResponse>> {
    trace!("Entering get_courses function");
    let courses = Course::find().find_with_related(Lecturer).all(&state.db).await?;
    debug!("Retrieved {} courses", courses.len());

    let response = courses
        .into_iter()
        .map(|(course, lecturers)| CourseWithLecturersResponse::new(course, lecturers))
        .collect();

    Ok(Json(ApiResponse::success(response)))
}

/// Get a course with its lecturers
#[utoipa::path(
    get,
    path = "/courses/{course_id}",
    tag = "courses",
    params(
        ("course_id" = String, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course retrieved successfully", body = ApiResponse<CourseWithLecturersResponse>),
        (status = 404, description = "Course not found", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> ApiResult<CourseWithLecturersResponse> {
    trace!("Entering get_course function");
    let course = Course::find_by_id(course_id.clone())
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Course with id: {} was not found", course_id)))?;

    let lecturers = course.find_related(Lecturer).all(&state.db).await?;
    debug!("Course {} has {} lecturers", course.id, lecturers.len());

    Ok(Json(ApiResponse::success(CourseWithLecturersResponse::new(course, lecturers))))
}
