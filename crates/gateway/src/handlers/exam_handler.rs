//! Exam handlers.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::AppResult;
use domain::academic::{Exam, ExamKind, ExamUpdate, NewExam};
use domain::PERM_ACADEMIC_MANAGE;

use crate::extractors::ValidatedJson;
use crate::middleware::{require_permission, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateExamRequest {
    pub course_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    #[schema(example = "Midterm")]
    pub title: String,
    pub kind: ExamKind,
    pub scheduled_at: DateTime<Utc>,
    #[schema(example = 90)]
    pub duration_minutes: i32,
    pub location: Option<String>,
    /// Share of the final score in percent; a course's exams total at most 100
    #[validate(range(min = 0, max = 100, message = "Weight must be between 0 and 100"))]
    #[schema(example = 40)]
    pub weight: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateExamRequest {
    #[validate(length(min = 1, max = 200, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub kind: Option<ExamKind>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
    #[validate(range(min = 0, max = 100, message = "Weight must be between 0 and 100"))]
    pub weight: Option<i32>,
}

pub fn exam_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_exam))
        .route("/:id", get(get_exam).put(update_exam).delete(delete_exam))
}

#[utoipa::path(
    post,
    path = "/api/academic/exams",
    tag = "Exams",
    security(("bearer_auth" = [])),
    request_body = CreateExamRequest,
    responses(
        (status = 201, description = "Exam scheduled", body = Exam),
        (status = 400, description = "Weight budget exceeded"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn create_exam(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateExamRequest>,
) -> AppResult<(StatusCode, Json<Exam>)> {
    require_permission(&current_user, PERM_ACADEMIC_MANAGE)?;
    let exam = state
        .academic
        .exams
        .create_exam(NewExam {
            course_id: payload.course_id,
            title: payload.title,
            kind: payload.kind,
            scheduled_at: payload.scheduled_at,
            duration_minutes: payload.duration_minutes,
            location: payload.location,
            weight: payload.weight,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(exam)))
}

#[utoipa::path(
    get,
    path = "/api/academic/exams/{id}",
    tag = "Exams",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Exam", body = Exam),
        (status = 404, description = "Exam not found")
    )
)]
pub async fn get_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Exam>> {
    Ok(Json(state.academic.exams.get_exam(id).await?))
}

/// Exams of a course ordered by schedule
#[utoipa::path(
    get,
    path = "/api/academic/courses/{id}/exams",
    tag = "Exams",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course ID")),
    responses((status = 200, description = "Exams of the course", body = [Exam]))
)]
pub async fn list_exams(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> AppResult<Json<Vec<Exam>>> {
    Ok(Json(state.academic.exams.list_exams(course_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/academic/exams/{id}",
    tag = "Exams",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Exam ID")),
    request_body = UpdateExamRequest,
    responses((status = 200, description = "Exam updated", body = Exam))
)]
pub async fn update_exam(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateExamRequest>,
) -> AppResult<Json<Exam>> {
    require_permission(&current_user, PERM_ACADEMIC_MANAGE)?;
    let update = ExamUpdate {
        title: payload.title,
        kind: payload.kind,
        scheduled_at: payload.scheduled_at,
        duration_minutes: payload.duration_minutes,
        location: payload.location,
        weight: payload.weight,
    };
    Ok(Json(state.academic.exams.update_exam(id, update).await?))
}

#[utoipa::path(
    delete,
    path = "/api/academic/exams/{id}",
    tag = "Exams",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Exam ID")),
    responses(
        (status = 204, description = "Exam deleted"),
        (status = 409, description = "Exam already has grades")
    )
)]
pub async fn delete_exam(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&current_user, PERM_ACADEMIC_MANAGE)?;
    state.academic.exams.delete_exam(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
