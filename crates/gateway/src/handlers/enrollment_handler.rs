//! Enrollment and waiting-list handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use academic_service_lib::EnrollmentFilter;
use common::{AppResult, Paginated};
use domain::academic::{Enrollment, EnrollmentStatus, WaitingListEntry};
use domain::{PERM_ACADEMIC_MANAGE, PERM_ENROLLMENTS_WRITE, PERM_GRADES_WRITE};

use super::PageQuery;
use crate::middleware::{require_any_permission, require_permission, CurrentUser};
use crate::state::AppState;

/// Permissions that may read enrollment records
const ENROLLMENT_READERS: &[&str] = &[
    PERM_ENROLLMENTS_WRITE,
    PERM_GRADES_WRITE,
    PERM_ACADEMIC_MANAGE,
];

#[derive(Debug, Deserialize, ToSchema)]
pub struct EnrollRequest {
    pub student_id: Uuid,
    pub course_id: Uuid,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct EnrollmentListQuery {
    pub student_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub status: Option<EnrollmentStatus>,
}

impl From<EnrollmentListQuery> for EnrollmentFilter {
    fn from(query: EnrollmentListQuery) -> Self {
        Self {
            student_id: query.student_id,
            course_id: query.course_id,
            status: query.status,
        }
    }
}

pub fn enrollment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_enrollments))
        .route("/enroll", post(enroll))
        .route("/:id", get(get_enrollment))
        .route("/:id/drop", post(drop_enrollment))
        .route("/:id/complete", post(complete_enrollment))
}

pub fn waiting_list_routes() -> Router<AppState> {
    Router::new()
        .route("/join", post(join_waiting_list))
        .route("/:entry_id", delete(leave_waiting_list))
        .route("/courses/:course_id", get(waiting_list))
        .route("/courses/:course_id/promote", post(promote_from_waiting_list))
}

#[utoipa::path(
    post,
    path = "/api/academic/enrollments/enroll",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    request_body = EnrollRequest,
    responses(
        (status = 201, description = "Student enrolled", body = Enrollment),
        (status = 400, description = "Student not eligible or course closed"),
        (status = 409, description = "Already enrolled or course full")
    )
)]
pub async fn enroll(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Json(payload): Json<EnrollRequest>,
) -> AppResult<(StatusCode, Json<Enrollment>)> {
    require_permission(&current_user, PERM_ENROLLMENTS_WRITE)?;
    let enrollment = state
        .academic
        .enrollments
        .enroll(payload.student_id, payload.course_id)
        .await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

#[utoipa::path(
    get,
    path = "/api/academic/enrollments",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(PageQuery, EnrollmentListQuery),
    responses((status = 200, description = "Paginated enrollments"))
)]
pub async fn list_enrollments(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(query): Query<EnrollmentListQuery>,
) -> AppResult<Json<Paginated<Enrollment>>> {
    require_any_permission(&current_user, ENROLLMENT_READERS)?;
    let params = page.into();
    let enrollments = state
        .academic
        .enrollments
        .list_enrollments(query.into(), params)
        .await?;
    Ok(Json(Paginated::from_page(enrollments, params)))
}

#[utoipa::path(
    get,
    path = "/api/academic/enrollments/{id}",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment", body = Enrollment),
        (status = 404, description = "Enrollment not found")
    )
)]
pub async fn get_enrollment(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Enrollment>> {
    require_any_permission(&current_user, ENROLLMENT_READERS)?;
    Ok(Json(state.academic.enrollments.get_enrollment(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/academic/enrollments/{id}/drop",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment dropped", body = Enrollment),
        (status = 400, description = "Enrollment is not active")
    )
)]
pub async fn drop_enrollment(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Enrollment>> {
    require_permission(&current_user, PERM_ENROLLMENTS_WRITE)?;
    Ok(Json(state.academic.enrollments.drop_enrollment(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/academic/enrollments/{id}/complete",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    responses((status = 200, description = "Enrollment completed", body = Enrollment))
)]
pub async fn complete_enrollment(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Enrollment>> {
    require_permission(&current_user, PERM_ACADEMIC_MANAGE)?;
    Ok(Json(
        state.academic.enrollments.complete_enrollment(id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/academic/waiting-list/join",
    tag = "Waiting list",
    security(("bearer_auth" = [])),
    request_body = EnrollRequest,
    responses(
        (status = 201, description = "Queued", body = WaitingListEntry),
        (status = 400, description = "Course still has free seats"),
        (status = 409, description = "Already enrolled or waiting")
    )
)]
pub async fn join_waiting_list(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Json(payload): Json<EnrollRequest>,
) -> AppResult<(StatusCode, Json<WaitingListEntry>)> {
    require_permission(&current_user, PERM_ENROLLMENTS_WRITE)?;
    let entry = state
        .academic
        .enrollments
        .join_waiting_list(payload.student_id, payload.course_id)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    delete,
    path = "/api/academic/waiting-list/{entry_id}",
    tag = "Waiting list",
    security(("bearer_auth" = [])),
    params(("entry_id" = Uuid, Path, description = "Waiting-list entry ID")),
    responses((status = 204, description = "Left the waiting list"))
)]
pub async fn leave_waiting_list(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&current_user, PERM_ENROLLMENTS_WRITE)?;
    state.academic.enrollments.leave_waiting_list(entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/academic/waiting-list/courses/{course_id}",
    tag = "Waiting list",
    security(("bearer_auth" = [])),
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses((status = 200, description = "Entries ordered by position", body = [WaitingListEntry]))
)]
pub async fn waiting_list(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> AppResult<Json<Vec<WaitingListEntry>>> {
    require_any_permission(&current_user, ENROLLMENT_READERS)?;
    Ok(Json(state.academic.enrollments.waiting_list(course_id).await?))
}

/// Enroll the first eligible student waiting for the course.
#[utoipa::path(
    post,
    path = "/api/academic/waiting-list/courses/{course_id}/promote",
    tag = "Waiting list",
    security(("bearer_auth" = [])),
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 201, description = "Student promoted", body = Enrollment),
        (status = 204, description = "Nobody eligible was waiting"),
        (status = 409, description = "No free seat")
    )
)]
pub async fn promote_from_waiting_list(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> AppResult<Response> {
    require_permission(&current_user, PERM_ENROLLMENTS_WRITE)?;
    let promoted = state
        .academic
        .enrollments
        .promote_from_waiting_list(course_id)
        .await?;

    Ok(match promoted {
        Some(enrollment) => (StatusCode::CREATED, Json(enrollment)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}
