//! Grade, transcript and objection handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use academic_service_lib::GradeFilter;
use common::{AppResult, Paginated};
use domain::academic::{GradeObjection, GradeResponse, ObjectionStatus, Transcript};
use domain::{PERM_ACADEMIC_MANAGE, PERM_ENROLLMENTS_WRITE, PERM_GRADES_WRITE};

use super::PageQuery;
use crate::extractors::ValidatedJson;
use crate::middleware::{require_any_permission, require_permission, CurrentUser};
use crate::state::AppState;

const RECORD_READERS: &[&str] = &[PERM_ENROLLMENTS_WRITE, PERM_GRADES_WRITE, PERM_ACADEMIC_MANAGE];

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordGradeRequest {
    pub exam_id: Uuid,
    pub student_id: Uuid,
    #[validate(range(min = 0.0, max = 100.0, message = "Score must be between 0 and 100"))]
    #[schema(example = 87.5)]
    pub score: f64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGradeRequest {
    #[validate(range(min = 0.0, max = 100.0, message = "Score must be between 0 and 100"))]
    pub score: f64,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct GradeListQuery {
    pub student_id: Option<Uuid>,
    pub exam_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FileObjectionRequest {
    pub grade_id: Uuid,
    /// Must be the graded student
    pub student_id: Uuid,
    #[validate(length(min = 10, max = 2000, message = "Reason must be 10 to 2000 characters"))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ApproveObjectionRequest {
    #[validate(range(min = 0.0, max = 100.0, message = "Score must be between 0 and 100"))]
    pub revised_score: f64,
    pub response: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RejectObjectionRequest {
    #[validate(length(min = 1, max = 2000, message = "A response is required when rejecting"))]
    pub response: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ObjectionListQuery {
    pub status: Option<ObjectionStatus>,
}

pub fn grade_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_grades).post(record_grade))
        .route("/:id", get(get_grade).put(update_grade))
}

pub fn transcript_routes() -> Router<AppState> {
    Router::new().route("/:student_id", get(transcript))
}

pub fn objection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_objections).post(file_objection))
        .route("/:id", get(get_objection))
        .route("/:id/approve", post(approve_objection))
        .route("/:id/reject", post(reject_objection))
}

#[utoipa::path(
    post,
    path = "/api/academic/grades",
    tag = "Grades",
    security(("bearer_auth" = [])),
    request_body = RecordGradeRequest,
    responses(
        (status = 201, description = "Grade recorded", body = GradeResponse),
        (status = 400, description = "Student not enrolled in the exam's course"),
        (status = 409, description = "Grade already recorded")
    )
)]
pub async fn record_grade(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RecordGradeRequest>,
) -> AppResult<(StatusCode, Json<GradeResponse>)> {
    require_permission(&current_user, PERM_GRADES_WRITE)?;
    let grade = state
        .academic
        .grades
        .record_grade(
            payload.exam_id,
            payload.student_id,
            payload.score,
            Some(current_user.id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(grade.into())))
}

#[utoipa::path(
    get,
    path = "/api/academic/grades",
    tag = "Grades",
    security(("bearer_auth" = [])),
    params(GradeListQuery),
    responses((status = 200, description = "Grades", body = [GradeResponse]))
)]
pub async fn list_grades(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<GradeListQuery>,
) -> AppResult<Json<Vec<GradeResponse>>> {
    require_any_permission(&current_user, RECORD_READERS)?;
    let filter = GradeFilter {
        student_id: query.student_id,
        exam_id: query.exam_id,
    };
    let grades = state.academic.grades.list_grades(filter).await?;
    Ok(Json(grades.into_iter().map(GradeResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/academic/grades/{id}",
    tag = "Grades",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Grade ID")),
    responses(
        (status = 200, description = "Grade", body = GradeResponse),
        (status = 404, description = "Grade not found")
    )
)]
pub async fn get_grade(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<GradeResponse>> {
    require_any_permission(&current_user, RECORD_READERS)?;
    Ok(Json(state.academic.grades.get_grade(id).await?.into()))
}

#[utoipa::path(
    put,
    path = "/api/academic/grades/{id}",
    tag = "Grades",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Grade ID")),
    request_body = UpdateGradeRequest,
    responses((status = 200, description = "Grade updated", body = GradeResponse))
)]
pub async fn update_grade(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateGradeRequest>,
) -> AppResult<Json<GradeResponse>> {
    require_permission(&current_user, PERM_GRADES_WRITE)?;
    let grade = state
        .academic
        .grades
        .update_grade(id, payload.score, Some(current_user.id))
        .await?;
    Ok(Json(grade.into()))
}

#[utoipa::path(
    get,
    path = "/api/academic/transcripts/{student_id}",
    tag = "Grades",
    security(("bearer_auth" = [])),
    params(("student_id" = Uuid, Path, description = "Student ID")),
    responses((status = 200, description = "Weighted course results and GPA", body = Transcript))
)]
pub async fn transcript(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> AppResult<Json<Transcript>> {
    require_any_permission(&current_user, RECORD_READERS)?;
    Ok(Json(state.academic.grades.transcript(student_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/academic/objections",
    tag = "Objections",
    security(("bearer_auth" = [])),
    request_body = FileObjectionRequest,
    responses(
        (status = 201, description = "Objection filed", body = GradeObjection),
        (status = 400, description = "Objection window closed"),
        (status = 403, description = "Grade belongs to another student"),
        (status = 409, description = "Objection already pending")
    )
)]
pub async fn file_objection(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<FileObjectionRequest>,
) -> AppResult<(StatusCode, Json<GradeObjection>)> {
    require_permission(&current_user, PERM_ENROLLMENTS_WRITE)?;
    let objection = state
        .academic
        .grades
        .file_objection(payload.grade_id, payload.student_id, payload.reason)
        .await?;
    Ok((StatusCode::CREATED, Json(objection)))
}

#[utoipa::path(
    get,
    path = "/api/academic/objections",
    tag = "Objections",
    security(("bearer_auth" = [])),
    params(PageQuery, ObjectionListQuery),
    responses((status = 200, description = "Paginated objections"))
)]
pub async fn list_objections(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(query): Query<ObjectionListQuery>,
) -> AppResult<Json<Paginated<GradeObjection>>> {
    require_any_permission(&current_user, RECORD_READERS)?;
    let params = page.into();
    let objections = state
        .academic
        .grades
        .list_objections(query.status, params)
        .await?;
    Ok(Json(Paginated::from_page(objections, params)))
}

#[utoipa::path(
    get,
    path = "/api/academic/objections/{id}",
    tag = "Objections",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Objection ID")),
    responses(
        (status = 200, description = "Objection", body = GradeObjection),
        (status = 404, description = "Objection not found")
    )
)]
pub async fn get_objection(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<GradeObjection>> {
    require_any_permission(&current_user, RECORD_READERS)?;
    Ok(Json(state.academic.grades.get_objection(id).await?))
}

/// Approve an objection and apply the revised score.
#[utoipa::path(
    post,
    path = "/api/academic/objections/{id}/approve",
    tag = "Objections",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Objection ID")),
    request_body = ApproveObjectionRequest,
    responses(
        (status = 200, description = "Objection approved", body = GradeObjection),
        (status = 400, description = "Objection already resolved")
    )
)]
pub async fn approve_objection(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ApproveObjectionRequest>,
) -> AppResult<Json<GradeObjection>> {
    require_permission(&current_user, PERM_GRADES_WRITE)?;
    let objection = state
        .academic
        .grades
        .approve_objection(id, payload.revised_score, current_user.id, payload.response)
        .await?;
    Ok(Json(objection))
}

#[utoipa::path(
    post,
    path = "/api/academic/objections/{id}/reject",
    tag = "Objections",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Objection ID")),
    request_body = RejectObjectionRequest,
    responses(
        (status = 200, description = "Objection rejected", body = GradeObjection),
        (status = 400, description = "Objection already resolved")
    )
)]
pub async fn reject_objection(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<RejectObjectionRequest>,
) -> AppResult<Json<GradeObjection>> {
    require_permission(&current_user, PERM_GRADES_WRITE)?;
    let objection = state
        .academic
        .grades
        .reject_objection(id, current_user.id, payload.response)
        .await?;
    Ok(Json(objection))
}
