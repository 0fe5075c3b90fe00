use crate::error::{ApiError, ApiResult, is_unique_violation};
use crate::extractors::ApiJson;
use crate::handlers::new_id;
use crate::handlers::students::find_student_by_matric;
use crate::helpers::validation::{not_blank, null_as_default, validate_in_order};
use crate::schemas::{ApiResponse, AppState};
use axum::{extract::State, response::Json};
use chrono::Utc;
use common::{Issue, codes};
use model::entities::{attendee, prelude::*, student_course};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

pub const ATTENDANCE_MARKED: &str = "Student attendance marked";
pub const ATTENDANCE_ALREADY_TAKEN: &str = "Student attendance already taken";

/// Request body for marking a student present at a lecture
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkAttendanceRequest {
    #[serde(alias = "matricNumber", deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "The student's matric number is required"))]
    pub matric_no: String,
    #[serde(deserialize_with = "null_as_default")]
    #[validate(custom(function = "not_blank", message = "Lecture's id is required"))]
    pub lecture_id: String,
}

/// Mark a student present at a lecture
///
/// Marking the same student twice for a lecture succeeds without recording a
/// second attendance.
#[utoipa::path(
    post,
    path = "/attendance",
    tag = "lectures",
    request_body = MarkAttendanceRequest,
    responses(
        (status = 200, description = "Attendance marked or already taken", body = ApiResponse<String>),
        (status = 400, description = "Missing matric number or lecture id", body = ApiResponse<String>),
        (status = 403, description = "Student is not registered for the course", body = ApiResponse<String>),
        (status = 404, description = "Student or lecture not found", body = ApiResponse<String>),
        (status = 500, description = "Failed to mark attendance", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn mark_attendance(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<MarkAttendanceRequest>,
) -> ApiResult<String> {
    trace!("Entering mark_attendance function");
    validate_in_order(&request, &["matric_no", "lecture_id"])?;

    let student = find_student_by_matric(&state.db, &request.matric_no)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!("Student with matric no: {} was not found", request.matric_no))
        })?;

    let (lecture, course) = Lecture::find_by_id(request.lecture_id.clone())
        .find_also_related(Course)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!("Lecture with id: {} was not found", request.lecture_id))
        })?;
    let course = course.ok_or_else(|| {
        ApiError::Internal(format!("Lecture {} has no course", lecture.id))
    })?;

    let registered = StudentCourse::find()
        .filter(student_course::Column::StudentId.eq(student.id.clone()))
        .filter(student_course::Column::CourseId.eq(course.id.clone()))
        .count(&state.db)
        .await?;
    if registered == 0 {
        let detail = format!(
            "The specified student, {} {} ({}) was not registered for {} ({})",
            student.first_name, student.last_name, student.matric_no, course.title, course.code
        );
        return Err(ApiError::forbidden_with_issue(
            "Student was not Register for Specified Course",
            Issue::new(
                403,
                codes::STUDENT_NOT_REGISTERED,
                "Student was not Register for Specified Course",
                detail,
            ),
        ));
    }

    let marked = Attendee::find()
        .filter(attendee::Column::StudentId.eq(student.id.clone()))
        .filter(attendee::Column::LectureId.eq(lecture.id.clone()))
        .count(&state.db)
        .await?;
    if marked > 0 {
        info!("Attendance for {} at {} already taken", student.matric_no, lecture.id);
        return Ok(Json(ApiResponse::success(ATTENDANCE_ALREADY_TAKEN.to_string())));
    }

    let attendance = attendee::ActiveModel {
        id: Set(new_id()),
        student_id: Set(student.id.clone()),
        lecture_id: Set(lecture.id.clone()),
        date_created: Set(Utc::now()),
    };
    match attendance.insert(&state.db).await {
        Ok(_) => {
            info!("Attendance marked for {} at {}", student.matric_no, lecture.id);
            Ok(Json(ApiResponse::success(ATTENDANCE_MARKED.to_string())))
        }
        Err(e) if is_unique_violation(&e) => {
            warn!("Attendance for {} at {} was marked concurrently", student.matric_no, lecture.id);
            Ok(Json(ApiResponse::success(ATTENDANCE_ALREADY_TAKEN.to_string())))
        }
        Err(e) => {
            error!("Failed to insert attendance: {}", e);
            Err(ApiError::Internal("Failed to mark attendance due to an error".to_string()))
        }
    }
}
