use std::collections::HashSet;

use crate::error::{ApiError, ApiResult, is_unique_violation};
use crate::extractors::{ApiJson, ApiQuery};
use crate::handlers::courses::CourseResponse;
use crate::handlers::lectures::AttendeeResponse;
use crate::handlers::new_id;
use crate::helpers::validation::{is_blank, not_blank, null_as_default, validate_in_order};
use crate::schemas::{ApiResponse, AppState};
use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::{course, lecture, lecturer, prelude::*};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

const LECTURER_FIELDS: [&str; 3] = ["email", "first_name", "last_name"];

/// Request body for creating a lecturer
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateLecturerRequest {
    /// Email address (must be unique)
    #[serde(deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "Email cannot be null"))]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "First name cannot be null"))]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "Last name cannot be null"))]
    pub last_name: String,
}

impl CreateLecturerRequest {
    fn into_active_model(self) -> lecturer::ActiveModel {
        lecturer::ActiveModel {
            id: Set(new_id()),
            email: Set(self.email),
            first_name: Set(self.first_name),
            last_name: Set(self.last_name),
            photo: Set(None),
            access_code: Set(None),
            date_created: Set(Utc::now()),
        }
    }
}

/// Public lecturer profile. The access code is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LecturerResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub photo: Option<String>,
    pub date_created: DateTime<Utc>,
}

impl From<lecturer::Model> for LecturerResponse {
    fn from(model: lecturer::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            photo: model.photo,
            date_created: model.date_created,
        }
    }
}

/// Lecturer profile together with the assigned courses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LecturerWithCoursesResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub photo: Option<String>,
    /// Null when no course is assigned
    pub courses: Option<Vec<CourseResponse>>,
}

impl LecturerWithCoursesResponse {
    fn new(lecturer: lecturer::Model, courses: Vec<course::Model>) -> Self {
        Self {
            id: lecturer.id,
            email: lecturer.email,
            first_name: lecturer.first_name,
            last_name: lecturer.last_name,
            photo: lecturer.photo,
            courses: (!courses.is_empty())
                .then(|| courses.into_iter().map(CourseResponse::from).collect()),
        }
    }
}

/// A lecture with its attendees
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LectureAttendanceRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date_created: DateTime<Utc>,
    pub attendees: Vec<AttendeeResponse>,
}

/// A course with every lecture given on it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseAttendanceRecord {
    pub course_id: String,
    pub course_code: String,
    pub course_title: String,
    pub course_unit: i32,
    pub course_description: Option<String>,
    pub lectures: Vec<LectureAttendanceRecord>,
}

/// Attendance records of every course assigned to a lecturer
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecordsResponse {
    pub lecturer_id: String,
    pub courses: Vec<CourseAttendanceRecord>,
}

/// Query parameters for looking up a lecturer by email
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LecturerEmailQuery {
    /// Lecturer's email address
    pub email: Option<String>,
}

pub(crate) async fn find_lecturer_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<lecturer::Model>, DbErr> {
    Lecturer::find()
        .filter(lecturer::Column::Email.eq(email))
        .one(db)
        .await
}

/// Create a new lecturer
#[utoipa::path(
    post,
    path = "/lecturers",
    tag = "lecturers",
    request_body = CreateLecturerRequest,
    responses(
        (status = 200, description = "Lecturer created successfully", body = ApiResponse<LecturerResponse>),
        (status = 400, description = "Missing field", body = ApiResponse<String>),
        (status = 403, description = "Email address already exist", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn create_lecturer(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateLecturerRequest>,
) -> ApiResult<LecturerResponse> {
    trace!("Entering create_lecturer function");
    validate_in_order(&request, &LECTURER_FIELDS)?;

    if find_lecturer_by_email(&state.db, &request.email).await?.is_some() {
        return Err(ApiError::forbidden("Email address already exist"));
    }

    let lecturer = match request.into_active_model().insert(&state.db).await {
        Ok(lecturer) => lecturer,
        Err(e) if is_unique_violation(&e) => {
            warn!("Concurrent lecturer creation with the same email: {}", e);
            return Err(ApiError::forbidden("Email address already exist"));
        }
        Err(e) => return Err(e.into()),
    };
    info!("Lecturer created with ID: {}", lecturer.id);

    Ok(Json(ApiResponse::success(LecturerResponse::from(lecturer))))
}

/// Create several lecturers at once
///
/// The whole request is rejected when any entry is incomplete or uses an
/// email that is already taken, including by an earlier entry.
#[utoipa::path(
    post,
    path = "/lecturers/batch",
    tag = "lecturers",
    request_body = Vec<CreateLecturerRequest>,
    responses(
        (status = 200, description = "Lecturers created successfully", body = ApiResponse<Vec<LecturerResponse>>),
        (status = 400, description = "An entry has a missing field", body = ApiResponse<String>),
        (status = 403, description = "An email address already exist", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state, requests), fields(count = requests.len()))]
pub async fn create_lecturers(
    State(state): State<AppState>,
    ApiJson(requests): ApiJson<Vec<CreateLecturerRequest>>,
) -> ApiResult<Vec<LecturerResponse>> {
    trace!("Entering create_lecturers function");
    for request in &requests {
        validate_in_order(request, &LECTURER_FIELDS)?;
    }

    let mut seen = HashSet::new();
    for request in &requests {
        let taken = !seen.insert(request.email.clone())
            || find_lecturer_by_email(&state.db, &request.email).await?.is_some();
        if taken {
            return Err(ApiError::forbidden(format!(
                "Email address {}, already exist",
                request.email
            )));
        }
    }

    let txn = state.db.begin().await?;
    let mut created = Vec::with_capacity(requests.len());
    for request in requests {
        let email = request.email.clone();
        let lecturer = match request.into_active_model().insert(&txn).await {
            Ok(lecturer) => lecturer,
            Err(e) if is_unique_violation(&e) => {
                return Err(ApiError::forbidden(format!("Email address {}, already exist", email)));
            }
            Err(e) => return Err(e.into()),
        };
        created.push(LecturerResponse::from(lecturer));
    }
    txn.commit().await?;

    info!("Created {} lecturers", created.len());
    Ok(Json(ApiResponse::success(created)))
}

/// Get all lecturers with their courses
#[utoipa::path(
    get,
    path = "/lecturers",
    tag = "lecturers",
    responses(
        (status = 200, description = "Lecturers retrieved successfully", body = ApiResponse<Vec<LecturerWithCoursesResponse>>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn get_lecturers(State(state): State<AppState>) -> ApiResult<Vec<LecturerWithCoursesResponse>> {
    trace!("Entering get_lecturers function");
    let lecturers = Lecturer::find().find_with_related(Course).all(&state.db).await?;
    debug!("Retrieved {} lecturers", lecturers.len());

    let response = lecturers
        .into_iter()
        .map(|(lecturer, courses)| LecturerWithCoursesResponse::new(lecturer, courses))
        .collect();

    Ok(Json(ApiResponse::success(response)))
}

/// Get a lecturer with their courses
#[utoipa::path(
    get,
    path = "/lecturers/{lecturer_id}",
    tag = "lecturers",
    params(
        ("lecturer_id" = String, Path, description = "Lecturer ID")
    ),
    responses(
        (status = 200, description = "Lecturer retrieved successfully", body = ApiResponse<LecturerWithCoursesResponse>),
        (status = 404, description = "Lecturer not found", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn get_lecturer(
    State(state): State<AppState>,
    Path(lecturer_id): Path<String>,
) -> ApiResult<LecturerWithCoursesResponse> {
    trace!("Entering get_lecturer function");
    let lecturer = Lecturer::find_by_id(lecturer_id.clone())
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Lecturer with id: {} was not found", lecturer_id)))?;

    let courses = lecturer.find_related(Course).all(&state.db).await?;
    Ok(Json(ApiResponse::success(LecturerWithCoursesResponse::new(lecturer, courses))))
}

/// Get a lecturer by email with their courses
#[utoipa::path(
    get,
    path = "/lecturers/by-email",
    tag = "lecturers",
    params(LecturerEmailQuery),
    responses(
        (status = 200, description = "Lecturer retrieved successfully", body = ApiResponse<LecturerWithCoursesResponse>),
        (status = 400, description = "Email is missing", body = ApiResponse<String>),
        (status = 404, description = "Lecturer not found", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn get_lecturer_by_email(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LecturerEmailQuery>,
) -> ApiResult<LecturerWithCoursesResponse> {
    trace!("Entering get_lecturer_by_email function");
    let email = query.email.unwrap_or_default();
    if is_blank(&email) {
        return Err(ApiError::bad_request("Lecturer's email is required"));
    }

    let lecturer = find_lecturer_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::not_found("A lecturer with the specified email does not exist."))?;

    let courses = lecturer.find_related(Course).all(&state.db).await?;
    Ok(Json(ApiResponse::success(LecturerWithCoursesResponse::new(lecturer, courses))))
}

/// Get the attendance records of every course assigned to a lecturer
#[utoipa::path(
    get,
    path = "/lecturers/{lecturer_id}/attendance-records",
    tag = "lecturers",
    params(
        ("lecturer_id" = String, Path, description = "Lecturer ID")
    ),
    responses(
        (status = 200, description = "Attendance records retrieved successfully", body = ApiResponse<AttendanceRecordsResponse>),
        (status = 404, description = "Lecturer not found", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn get_attendance_records(
    State(state): State<AppState>,
    Path(lecturer_id): Path<String>,
) -> ApiResult<AttendanceRecordsResponse> {
    trace!("Entering get_attendance_records function");
    let lecturer = Lecturer::find_by_id(lecturer_id.clone())
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Lecturer with id: {} was not found", lecturer_id)))?;

    let courses = lecturer.find_related(Course).all(&state.db).await?;
    let mut records = Vec::with_capacity(courses.len());
    for course in courses {
        let lectures = course
            .find_related(Lecture)
            .order_by_asc(lecture::Column::DateCreated)
            .all(&state.db)
            .await?;

        let mut lecture_records = Vec::with_capacity(lectures.len());
        for lecture in lectures {
            let attendees = lecture.find_related(Student).all(&state.db).await?;
            lecture_records.push(LectureAttendanceRecord {
                id: lecture.id,
                title: lecture.title,
                description: lecture.description,
                date_created: lecture.date_created,
                attendees: attendees.into_iter().map(AttendeeResponse::from).collect(),
            });
        }

        records.push(CourseAttendanceRecord {
            course_id: course.id,
            course_code: course.code,
            course_title: course.title,
            course_unit: course.unit,
            course_description: course.description,
            lectures: lecture_records,
        });
    }
    debug!("Collected attendance records for {} courses", records.len());

    Ok(Json(ApiResponse::success(AttendanceRecordsResponse {
        lecturer_id: lecturer.id,
        courses: records,
    })))
}
