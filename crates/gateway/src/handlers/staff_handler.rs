//! Staff handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use common::{AppResult, Paginated};
use domain::person::{Staff, StaffStatus};
use domain::PERM_PERSONS_MANAGE;
use person_service_lib::{NewStaff, StaffUpdate};

use super::PageQuery;
use crate::extractors::ValidatedJson;
use crate::middleware::{require_permission, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStaffRequest {
    pub person_id: Uuid,
    #[validate(length(min = 4, max = 20, message = "Employee number must be 4 to 20 characters"))]
    #[schema(example = "E1042")]
    pub employee_number: String,
    #[validate(length(min = 1, max = 100, message = "Department is required"))]
    pub department: String,
    #[validate(length(min = 1, max = 100, message = "Title is required"))]
    #[schema(example = "Lecturer")]
    pub title: String,
    pub hire_date: NaiveDate,
}

/// Termination uses its own endpoint
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStaffRequest {
    #[validate(length(min = 1, max = 100, message = "Department cannot be empty"))]
    pub department: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub status: Option<StaffStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TerminateStaffRequest {
    pub termination_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StaffListQuery {
    pub department: Option<String>,
}

pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_staff).post(create_staff))
        .route(
            "/:id",
            get(get_staff).put(update_staff).delete(delete_staff),
        )
        .route("/:id/terminate", post(terminate_staff))
}

#[utoipa::path(
    get,
    path = "/api/person/staff",
    tag = "Staff",
    security(("bearer_auth" = [])),
    params(PageQuery, StaffListQuery),
    responses((status = 200, description = "Paginated staff"))
)]
pub async fn list_staff(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(query): Query<StaffListQuery>,
) -> AppResult<Json<Paginated<Staff>>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    let params = page.into();
    let staff = state.persons.staff.list_staff(params, query.department).await?;
    Ok(Json(Paginated::from_page(staff, params)))
}

#[utoipa::path(
    post,
    path = "/api/person/staff",
    tag = "Staff",
    security(("bearer_auth" = [])),
    request_body = CreateStaffRequest,
    responses(
        (status = 201, description = "Staff member created", body = Staff),
        (status = 409, description = "Person already has a profile or number taken")
    )
)]
pub async fn create_staff(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateStaffRequest>,
) -> AppResult<(StatusCode, Json<Staff>)> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    let staff = state
        .persons
        .staff
        .create_staff(NewStaff {
            person_id: payload.person_id,
            employee_number: payload.employee_number,
            department: payload.department,
            title: payload.title,
            hire_date: payload.hire_date,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(staff)))
}

#[utoipa::path(
    get,
    path = "/api/person/staff/{id}",
    tag = "Staff",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Staff member", body = Staff),
        (status = 404, description = "Staff member not found")
    )
)]
pub async fn get_staff(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Staff>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    Ok(Json(state.persons.staff.get_staff(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/person/staff/{id}",
    tag = "Staff",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Staff ID")),
    request_body = UpdateStaffRequest,
    responses((status = 200, description = "Staff member updated", body = Staff))
)]
pub async fn update_staff(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateStaffRequest>,
) -> AppResult<Json<Staff>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    let update = StaffUpdate {
        department: payload.department,
        title: payload.title,
        status: payload.status,
    };
    Ok(Json(state.persons.staff.update_staff(id, update).await?))
}

#[utoipa::path(
    post,
    path = "/api/person/staff/{id}/terminate",
    tag = "Staff",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Staff ID")),
    request_body = TerminateStaffRequest,
    responses(
        (status = 200, description = "Employment terminated", body = Staff),
        (status = 400, description = "Termination before hire date")
    )
)]
pub async fn terminate_staff(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TerminateStaffRequest>,
) -> AppResult<Json<Staff>> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    let staff = state
        .persons
        .staff
        .terminate_staff(id, payload.termination_date)
        .await?;
    Ok(Json(staff))
}

#[utoipa::path(
    delete,
    path = "/api/person/staff/{id}",
    tag = "Staff",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Staff ID")),
    responses((status = 204, description = "Staff member soft-deleted"))
)]
pub async fn delete_staff(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&current_user, PERM_PERSONS_MANAGE)?;
    state.persons.staff.delete_staff(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
