use std::collections::HashSet;

use crate::error::{ApiError, ApiResult, is_unique_violation};
use crate::extractors::ApiJson;
use crate::handlers::new_id;
use crate::helpers::validation::{is_blank, null_as_default, null_items_as_default};
use crate::schemas::{ApiResponse, AppState};
use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use common::{Issue, codes};
use model::entities::{prelude::*, student_course};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;

/// Request body for registering a student for courses
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterStudentCoursesRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub student_id: String,
    /// At least one course ID
    #[serde(deserialize_with = "null_items_as_default")]
    pub course_ids: Vec<String>,
}

impl RegisterStudentCoursesRequest {
    fn check(&self) -> Result<(), ApiError> {
        if is_blank(&self.student_id) {
            return Err(ApiError::bad_request("Student id is required"));
        }
        if self.course_ids.is_empty() {
            return Err(ApiError::bad_request("A minimum of one course is required."));
        }
        if self.course_ids.iter().any(|id| is_blank(id)) {
            return Err(ApiError::bad_request("Not all course id are valid"));
        }
        Ok(())
    }
}

/// A student's registration for a course
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentCourseResponse {
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub date_created: DateTime<Utc>,
}

impl From<student_course::Model> for StudentCourseResponse {
    fn from(model: student_course::Model) -> Self {
        Self {
            id: model.id,
            student_id: model.student_id,
            course_id: model.course_id,
            date_created: model.date_created,
        }
    }
}

fn already_registered(course_id: &str, student_id: &str) -> Issue {
    Issue::new(
        300,
        codes::ALREADY_REGISTERED,
        "Already Registered",
        format!(
            "The course with id: {} has been formerly registered for student with id: {}",
            course_id, student_id
        ),
    )
}

/// Register a student for one or more courses
///
/// Unknown courses and courses the student is already registered for are
/// skipped and reported as warnings. The remaining registrations are
/// committed together.
#[utoipa::path(
    post,
    path = "/student-courses",
    tag = "students",
    request_body = RegisterStudentCoursesRequest,
    responses(
        (status = 200, description = "Registrations created, skipped courses listed as warnings", body = ApiResponse<Vec<StudentCourseResponse>>),
        (status = 400, description = "Missing student or course ids", body = ApiResponse<String>),
        (status = 404, description = "Student not found", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn register_student_courses(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterStudentCoursesRequest>,
) -> ApiResult<Vec<StudentCourseResponse>> {
    trace!("Entering register_student_courses function");
    request.check()?;

    let txn = state.db.begin().await?;

    let student = Student::find_by_id(request.student_id.clone())
        .one(&txn)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "Student with id: {} could not be found",
                request.student_id
            ))
        })?;

    let mut warnings = Vec::new();
    let mut registered = Vec::new();
    let mut seen = HashSet::new();

    for course_id in request.course_ids {
        if Course::find_by_id(course_id.clone()).one(&txn).await?.is_none() {
            debug!("Course {} does not exist", course_id);
            warnings.push(Issue::new(
                404,
                codes::COURSE_NOT_FOUND,
                "Course Not Found",
                format!("Course with id: {}, is not part of the available courses.", course_id),
            ));
            continue;
        }

        let stored = StudentCourse::find()
            .filter(student_course::Column::StudentId.eq(student.id.clone()))
            .filter(student_course::Column::CourseId.eq(course_id.clone()))
            .count(&txn)
            .await?;
        if stored > 0 || !seen.insert(course_id.clone()) {
            debug!("Course {} already registered for {}", course_id, student.id);
            warnings.push(already_registered(&course_id, &student.id));
            continue;
        }

        let registration = student_course::ActiveModel {
            id: Set(new_id()),
            student_id: Set(student.id.clone()),
            course_id: Set(course_id.clone()),
            date_created: Set(Utc::now()),
        };
        let registration = match registration.insert(&txn).await {
            Ok(registration) => registration,
            Err(e) if is_unique_violation(&e) => {
                let issue = already_registered(&course_id, &student.id);
                return Err(ApiError::bad_request(issue.detail));
            }
            Err(e) => return Err(e.into()),
        };
        registered.push(StudentCourseResponse::from(registration));
    }

    txn.commit().await?;
    info!(
        "Registered student {} for {} courses with {} warnings",
        student.id,
        registered.len(),
        warnings.len()
    );

    Ok(Json(ApiResponse::with_warnings(registered, warnings)))
}
