use std::collections::HashSet;

use crate::error::{ApiError, ApiResult, is_unique_violation};
use crate::extractors::ApiJson;
use crate::handlers::new_id;
use crate::helpers::validation::{
    first_message, is_blank, not_blank, null_as_default, validate_in_order,
};
use crate::schemas::{ApiResponse, AppState};
use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use common::{Issue, codes};
use model::entities::{prelude::*, student};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

const STUDENT_FIELDS: [&str; 4] = ["email", "matric_no", "first_name", "last_name"];
const STUDENT_EXISTS: &str = "A student with the specified email or matric number already exist";

/// Request body for creating a student
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateStudentRequest {
    /// Email address (must be unique)
    #[serde(deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "Email cannot be null"))]
    pub email: String,
    /// Matric number (must be unique)
    #[serde(alias = "matricNumber", deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "Matric number cannot be null"))]
    pub matric_no: String,
    #[serde(deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "First name cannot be null"))]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "Last name cannot be null"))]
    pub last_name: String,
}

impl CreateStudentRequest {
    fn into_active_model(self) -> student::ActiveModel {
        student::ActiveModel {
            id: Set(new_id()),
            email: Set(self.email),
            matric_no: Set(self.matric_no),
            first_name: Set(self.first_name),
            last_name: Set(self.last_name),
            photo: Set(None),
            access_code: Set(None),
            date_created: Set(Utc::now()),
        }
    }
}

/// Request body for replacing a student's photo
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateStudentPhotoRequest {
    /// Student ID
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// Photo, base64 encoded
    #[serde(deserialize_with = "null_as_default")]
    pub encoded_photo: String,
}

/// Public student profile. The access code is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub id: String,
    pub email: String,
    pub matric_no: String,
    pub first_name: String,
    pub last_name: String,
    pub photo: Option<String>,
    pub date_created: DateTime<Utc>,
}

impl From<student::Model> for StudentResponse {
    fn from(model: student::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            matric_no: model.matric_no,
            first_name: model.first_name,
            last_name: model.last_name,
            photo: model.photo,
            date_created: model.date_created,
        }
    }
}

pub(crate) async fn find_student_by_matric<C: ConnectionTrait>(
    db: &C,
    matric_no: &str,
) -> Result<Option<student::Model>, DbErr> {
    Student::find()
        .filter(student::Column::MatricNo.eq(matric_no))
        .one(db)
        .await
}

async fn email_or_matric_taken<C: ConnectionTrait>(
    db: &C,
    email: &str,
    matric_no: &str,
) -> Result<bool, DbErr> {
    let existing = Student::find()
        .filter(
            Condition::any()
                .add(student::Column::Email.eq(email))
                .add(student::Column::MatricNo.eq(matric_no)),
        )
        .one(db)
        .await?;
    Ok(existing.is_some())
}

/// Create a new student
#[utoipa::path(
    post,
    path = "/students",
    tag = "students",
    request_body = CreateStudentRequest,
    responses(
        (status = 200, description = "Student created successfully", body = ApiResponse<StudentResponse>),
        (status = 400, description = "Missing field", body = ApiResponse<String>),
        (status = 403, description = "Email or matric number already exist", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn create_student(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateStudentRequest>,
) -> ApiResult<StudentResponse> {
    trace!("Entering create_student function");
    validate_in_order(&request, &STUDENT_FIELDS)?;

    if email_or_matric_taken(&state.db, &request.email, &request.matric_no).await? {
        return Err(ApiError::forbidden(STUDENT_EXISTS));
    }

    let student = match request.into_active_model().insert(&state.db).await {
        Ok(student) => student,
        Err(e) if is_unique_violation(&e) => {
            warn!("Concurrent student creation with the same email or matric: {}", e);
            return Err(ApiError::forbidden(STUDENT_EXISTS));
        }
        Err(e) => return Err(e.into()),
    };
    info!("Student created with ID: {}, matric: {}", student.id, student.matric_no);

    Ok(Json(ApiResponse::success(StudentResponse::from(student))))
}

/// Create several students at once
///
/// Incomplete entries and entries whose email or matric number is already
/// taken are skipped and reported as warnings; the rest are inserted in a
/// single transaction.
#[utoipa::path(
    post,
    path = "/students/batch",
    tag = "students",
    request_body = Vec<CreateStudentRequest>,
    responses(
        (status = 200, description = "Valid students created, skipped entries listed as warnings", body = ApiResponse<Vec<StudentResponse>>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state, requests), fields(count = requests.len()))]
pub async fn create_students(
    State(state): State<AppState>,
    ApiJson(requests): ApiJson<Vec<CreateStudentRequest>>,
) -> ApiResult<Vec<StudentResponse>> {
    trace!("Entering create_students function");
    let mut warnings = Vec::new();
    let mut accepted = Vec::with_capacity(requests.len());
    let mut seen_emails = HashSet::new();
    let mut seen_matrics = HashSet::new();

    for (index, request) in requests.into_iter().enumerate() {
        if let Err(errors) = request.validate() {
            let message = first_message(&errors, &STUDENT_FIELDS);
            debug!("Skipping entry {}: {}", index, message);
            warnings.push(Issue::new(
                400,
                codes::INVALID_STUDENT_ENTRY,
                "Invalid Student Entry",
                format!("Entry {} was skipped: {}", index, message),
            ));
            continue;
        }

        let repeated =
            seen_emails.contains(&request.email) || seen_matrics.contains(&request.matric_no);
        if repeated || email_or_matric_taken(&state.db, &request.email, &request.matric_no).await? {
            debug!("Skipping entry {}: {} already exist", index, request.matric_no);
            warnings.push(Issue::new(
                409,
                codes::STUDENT_ALREADY_EXIST,
                "Student Already Exist",
                format!(
                    "A student with email {} or matric number {} already exist",
                    request.email, request.matric_no
                ),
            ));
            continue;
        }

        seen_emails.insert(request.email.clone());
        seen_matrics.insert(request.matric_no.clone());
        accepted.push(request);
    }

    let txn = state.db.begin().await?;
    let mut created = Vec::with_capacity(accepted.len());
    for request in accepted {
        let student = request.into_active_model().insert(&txn).await?;
        created.push(StudentResponse::from(student));
    }
    txn.commit().await?;

    info!(
        "Created {} students, skipped {} entries",
        created.len(),
        warnings.len()
    );
    Ok(Json(ApiResponse::with_warnings(created, warnings)))
}

/// Get all students
#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    responses(
        (status = 200, description = "Students retrieved successfully", body = ApiResponse<Vec<StudentResponse>>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn get_students(State(state): State<AppState>) -> ApiResult<Vec<StudentResponse>> {
    trace!("Entering get_students function");
    let students = Student::find().all(&state.db).await?;
    debug!("Retrieved {} students", students.len());

    Ok(Json(ApiResponse::success(
        students.into_iter().map(StudentResponse::from).collect(),
    )))
}

/// Get a student by matric number
#[utoipa::path(
    get,
    path = "/students/{matric_no}",
    tag = "students",
    params(
        ("matric_no" = String, Path, description = "Matric number, percent-encoded when it contains slashes")
    ),
    responses(
        (status = 200, description = "Student retrieved successfully", body = ApiResponse<StudentResponse>),
        (status = 404, description = "Student not found", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    Path(matric_no): Path<String>,
) -> ApiResult<StudentResponse> {
    trace!("Entering get_student function");
    let student = find_student_by_matric(&state.db, &matric_no)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "The matric number: {} does not match an existing student",
                matric_no
            ))
        })?;

    Ok(Json(ApiResponse::success(StudentResponse::from(student))))
}

/// Replace a student's photo
#[utoipa::path(
    post,
    path = "/students/photo",
    tag = "students",
    request_body = UpdateStudentPhotoRequest,
    responses(
        (status = 200, description = "Photo updated successfully", body = ApiResponse<StudentResponse>),
        (status = 400, description = "Photo is missing", body = ApiResponse<String>),
        (status = 404, description = "Student not found", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state, request), fields(student_id = %request.id))]
pub async fn update_student_photo(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateStudentPhotoRequest>,
) -> ApiResult<StudentResponse> {
    trace!("Entering update_student_photo function");
    if is_blank(&request.encoded_photo) {
        return Err(ApiError::bad_request(
            "This operation require a student's photo base 64 encoded format.",
        ));
    }

    let student = Student::find_by_id(request.id.clone())
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("The specified id does not match a student"))?;

    let mut active: student::ActiveModel = student.into();
    active.photo = Set(Some(request.encoded_photo));
    let student = active.update(&state.db).await?;
    info!("Photo updated for student {}", student.id);

    Ok(Json(ApiResponse::success(StudentResponse::from(student))))
}
