//! Two-phase access code authentication.
//!
//! The request phase draws a fresh code, stores it on the principal and
//! emails it. The verify phase compares a supplied code with the stored one.
//! Lecturers are identified by email, students by matric number.

use crate::error::{ApiError, ApiResult};
use crate::extractors::ApiQuery;
use crate::handlers::lecturers::{LecturerResponse, find_lecturer_by_email};
use crate::handlers::students::{StudentResponse, find_student_by_matric};
use crate::helpers::access_code::{
    ACCESS_CODE_SUBJECT, access_code_email_body, code_matches, generate_access_code,
};
use crate::helpers::validation::is_blank;
use crate::mailer::OutgoingMail;
use crate::schemas::{ApiResponse, AppState};
use axum::{extract::State, response::Json};
use model::entities::{lecturer, student};
use sea_orm::{ActiveModelTrait, Set};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::IntoParams;

pub const VALID_ACCESS_CODE: &str = "Valid access code";
const INVALID_ACCESS_CODE: &str = "Invalid access code";
const MAIL_FAILED: &str = "An error occurred while trying to send a validation email.";
const LECTURER_EMAIL_REQUIRED: &str = "Lecturer's email is required";
const LECTURER_NOT_FOUND: &str = "A lecturer with the specified email does not exist.";
const MATRIC_REQUIRED: &str = "Student's matric number is required";

/// Query parameters for requesting a lecturer access code
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LecturerAccessQuery {
    /// Lecturer's email address
    pub email: Option<String>,
}

/// Query parameters for verifying a lecturer access code
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LecturerVerifyQuery {
    /// Lecturer's email address
    pub email: Option<String>,
    /// Code received by email
    pub access_code: Option<i32>,
}

/// Query parameters for requesting a student access code
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StudentAccessQuery {
    /// Student's matric number
    pub matric_number: Option<String>,
}

/// Query parameters for verifying a student access code
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StudentVerifyQuery {
    /// Student's matric number
    pub matric_number: Option<String>,
    /// Code received by email
    pub access_code: Option<i32>,
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    match value {
        Some(value) if !is_blank(&value) => Ok(value),
        _ => Err(ApiError::bad_request(message)),
    }
}

fn student_not_found(matric_no: &str) -> ApiError {
    ApiError::not_found(format!(
        "The matric number: {} does not match an existing student",
        matric_no
    ))
}

/// Emails a freshly stored code. The code stays valid when delivery fails.
async fn send_access_code(
    state: &AppState,
    to_address: &str,
    first_name: &str,
    last_name: &str,
    code: i32,
) -> Result<(), ApiError> {
    let mail = OutgoingMail {
        to_address: to_address.to_string(),
        to_name: format!("{} {}", first_name, last_name),
        subject: ACCESS_CODE_SUBJECT.to_string(),
        html_body: access_code_email_body(first_name, code),
    };

    state.mailer.send(mail).await.map_err(|e| {
        error!("Failed to send access code to {}: {}", to_address, e);
        ApiError::Internal(MAIL_FAILED.to_string())
    })
}

fn verify(principal_id: &str, stored: Option<i32>, supplied: i32) -> ApiResult<String> {
    if code_matches(stored, supplied) {
        info!("Access code verified for {}", principal_id);
        Ok(Json(ApiResponse::success(VALID_ACCESS_CODE.to_string())))
    } else {
        warn!("Invalid access code supplied for {}", principal_id);
        Err(ApiError::Unauthorized(INVALID_ACCESS_CODE.to_string()))
    }
}

/// Issue a lecturer access code and email it
#[utoipa::path(
    get,
    path = "/lecturers/access/request",
    tag = "access",
    params(LecturerAccessQuery),
    responses(
        (status = 200, description = "Access code sent", body = ApiResponse<LecturerResponse>),
        (status = 400, description = "Email is missing", body = ApiResponse<String>),
        (status = 404, description = "Lecturer not found", body = ApiResponse<String>),
        (status = 500, description = "Email could not be sent", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn request_lecturer_access(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LecturerAccessQuery>,
) -> ApiResult<LecturerResponse> {
    trace!("Entering request_lecturer_access function");
    let email = required(query.email, LECTURER_EMAIL_REQUIRED)?;

    let lecturer = find_lecturer_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::not_found(LECTURER_NOT_FOUND))?;

    let code = generate_access_code();
    let mut active: lecturer::ActiveModel = lecturer.into();
    active.access_code = Set(Some(code));
    let lecturer = active.update(&state.db).await?;
    debug!("Stored new access code for lecturer {}", lecturer.id);

    send_access_code(&state, &lecturer.email, &lecturer.first_name, &lecturer.last_name, code).await?;
    info!("Access code sent to lecturer {}", lecturer.id);

    Ok(Json(ApiResponse::success(LecturerResponse::from(lecturer))))
}

/// Verify a lecturer access code
#[utoipa::path(
    get,
    path = "/lecturers/access/verify",
    tag = "access",
    params(LecturerVerifyQuery),
    responses(
        (status = 200, description = "Valid access code", body = ApiResponse<String>),
        (status = 400, description = "Email or access code is missing", body = ApiResponse<String>),
        (status = 401, description = "Invalid access code", body = ApiResponse<String>),
        (status = 404, description = "Lecturer not found", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state, query), fields(email = ?query.email))]
pub async fn verify_lecturer_access(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LecturerVerifyQuery>,
) -> ApiResult<String> {
    trace!("Entering verify_lecturer_access function");
    let email = required(query.email, LECTURER_EMAIL_REQUIRED)?;
    let supplied = query
        .access_code
        .ok_or_else(|| ApiError::bad_request("Access code is required"))?;

    let lecturer = find_lecturer_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::not_found(LECTURER_NOT_FOUND))?;

    verify(&lecturer.id, lecturer.access_code, supplied)
}

/// Issue a student access code and email it
#[utoipa::path(
    get,
    path = "/students/access/request",
    tag = "access",
    params(StudentAccessQuery),
    responses(
        (status = 200, description = "Access code sent", body = ApiResponse<StudentResponse>),
        (status = 400, description = "Matric number is missing", body = ApiResponse<String>),
        (status = 404, description = "Student not found", body = ApiResponse<String>),
        (status = 500, description = "Email could not be sent", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn request_student_access(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StudentAccessQuery>,
) -> ApiResult<StudentResponse> {
    trace!("Entering request_student_access function");
    let matric_no = required(query.matric_number, MATRIC_REQUIRED)?;

    let student = find_student_by_matric(&state.db, &matric_no)
        .await?
        .ok_or_else(|| student_not_found(&matric_no))?;

    let code = generate_access_code();
    let mut active: student::ActiveModel = student.into();
    active.access_code = Set(Some(code));
    let student = active.update(&state.db).await?;
    debug!("Stored new access code for student {}", student.id);

    send_access_code(&state, &student.email, &student.first_name, &student.last_name, code).await?;
    info!("Access code sent to student {}", student.id);

    Ok(Json(ApiResponse::success(StudentResponse::from(student))))
}

/// Verify a student access code
#[utoipa::path(
    get,
    path = "/students/access/verify",
    tag = "access",
    params(StudentVerifyQuery),
    responses(
        (status = 200, description = "Valid access code", body = ApiResponse<String>),
        (status = 400, description = "Matric number or access code is missing", body = ApiResponse<String>),
        (status = 401, description = "Invalid access code", body = ApiResponse<String>),
        (status = 404, description = "Student not found", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state, query), fields(matric_number = ?query.matric_number))]
pub async fn verify_student_access(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StudentVerifyQuery>,
) -> ApiResult<String> {
    trace!("Entering verify_student_access function");
    let matric_no = required(query.matric_number, MATRIC_REQUIRED)?;
    let supplied = query
        .access_code
        .ok_or_else(|| ApiError::bad_request("Access code is required"))?;

    let student = find_student_by_matric(&state.db, &matric_no)
        .await?
        .ok_or_else(|| student_not_found(&matric_no))?;

    verify(&student.id, student.access_code, supplied)
}
