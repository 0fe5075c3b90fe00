use crate::error::ApiResult;
use crate::schemas::{ApiResponse, AppState};
use axum::{extract::State, response::Json};
use common::{CourseRanking, LecturerRanking, StudentRanking};
use compute::RankingComputer;
use tracing::{instrument, trace};

/// Rank students by lectures attended
#[utoipa::path(
    get,
    path = "/reports/students-ranking",
    tag = "reports",
    responses(
        (status = 200, description = "Students ordered by attendance, highest first", body = ApiResponse<Vec<StudentRanking>>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn students_ranking(State(state): State<AppState>) -> ApiResult<Vec<StudentRanking>> {
    trace!("Entering students_ranking function");
    let ranking = RankingComputer::new().student_ranking(&state.db).await?;
    Ok(Json(ApiResponse::success(ranking)))
}

/// Rank courses by attendance across their lectures
#[utoipa::path(
    get,
    path = "/reports/courses-ranking",
    tag = "reports",
    responses(
        (status = 200, description = "Courses ordered by attendance, highest first", body = ApiResponse<Vec<CourseRanking>>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn courses_ranking(State(state): State<AppState>) -> ApiResult<Vec<CourseRanking>> {
    trace!("Entering courses_ranking function");
    let ranking = RankingComputer::new().course_ranking(&state.db).await?;
    Ok(Json(ApiResponse::success(ranking)))
}

/// Rank lecturers by attendance across the lectures they created
#[utoipa::path(
    get,
    path = "/reports/lecturers-ranking",
    tag = "reports",
    responses(
        (status = 200, description = "Lecturers ordered by attendance, highest first", body = ApiResponse<Vec<LecturerRanking>>),
        (status = 500, description = "Internal server error", body = ApiResponse<String>)
    )
)]
#[instrument(skip(state))]
pub async fn lecturers_ranking(State(state): State<AppState>) -> ApiResult<Vec<LecturerRanking>> {
    trace!("Entering lecturers_ranking function");
    let ranking = RankingComputer::new().lecturer_ranking(&state.db).await?;
    Ok(Json(ApiResponse::success(ranking)))
}
