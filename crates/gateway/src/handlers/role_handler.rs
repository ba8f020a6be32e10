//! Role and permission administration.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::AppResult;
use domain::identity::{Permission, Role, RoleResponse};
use domain::PERM_IDENTITY_MANAGE;

use crate::extractors::ValidatedJson;
use crate::middleware::{require_permission, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoleRequest {
    #[validate(length(min = 2, max = 50, message = "Role name must be 2 to 50 characters"))]
    #[schema(example = "librarian")]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 2, max = 50, message = "Role name must be 2 to 50 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RolePermissionRequest {
    pub permission_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePermissionRequest {
    /// `resource.action`
    #[validate(length(min = 3, max = 100, message = "Permission name must be 3 to 100 characters"))]
    #[schema(example = "library.manage")]
    pub name: String,
    pub description: Option<String>,
}

pub fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/:id", get(get_role).put(update_role).delete(delete_role))
        .route("/:id/permissions", post(add_role_permission))
        .route(
            "/:id/permissions/:permission_id",
            delete(remove_role_permission),
        )
}

pub fn permission_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_permissions).post(create_permission))
        .route("/:id", delete(delete_permission))
}

#[utoipa::path(
    get,
    path = "/api/v1/roles",
    tag = "Roles",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All roles", body = [Role]))
)]
pub async fn list_roles(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Role>>> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    Ok(Json(state.identity.roles.list_roles().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/roles/{id}",
    tag = "Roles",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role with its permissions", body = RoleResponse),
        (status = 404, description = "Role not found")
    )
)]
pub async fn get_role(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RoleResponse>> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    Ok(Json(state.identity.roles.get_role(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/roles",
    tag = "Roles",
    security(("bearer_auth" = [])),
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created", body = Role),
        (status = 409, description = "Role name taken")
    )
)]
pub async fn create_role(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateRoleRequest>,
) -> AppResult<(StatusCode, Json<Role>)> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    let role = state
        .identity
        .roles
        .create_role(payload.name, payload.description)
        .await?;
    Ok((StatusCode::CREATED, Json(role)))
}

#[utoipa::path(
    put,
    path = "/api/v1/roles/{id}",
    tag = "Roles",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = Role),
        (status = 400, description = "System roles cannot be renamed")
    )
)]
pub async fn update_role(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateRoleRequest>,
) -> AppResult<Json<Role>> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    let role = state
        .identity
        .roles
        .update_role(id, payload.name, payload.description)
        .await?;
    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/api/v1/roles/{id}",
    tag = "Roles",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 400, description = "System roles cannot be deleted")
    )
)]
pub async fn delete_role(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    state.identity.roles.delete_role(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/roles/{id}/permissions",
    tag = "Roles",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = RolePermissionRequest,
    responses((status = 200, description = "Role with its permissions", body = RoleResponse))
)]
pub async fn add_role_permission(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RolePermissionRequest>,
) -> AppResult<Json<RoleResponse>> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    let role = state
        .identity
        .roles
        .add_role_permission(id, payload.permission_id)
        .await?;
    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/api/v1/roles/{id}/permissions/{permission_id}",
    tag = "Roles",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Role ID"),
        ("permission_id" = Uuid, Path, description = "Permission ID")
    ),
    responses((status = 200, description = "Role with its permissions", body = RoleResponse))
)]
pub async fn remove_role_permission(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((id, permission_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<RoleResponse>> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    let role = state
        .identity
        .roles
        .remove_role_permission(id, permission_id)
        .await?;
    Ok(Json(role))
}

#[utoipa::path(
    get,
    path = "/api/v1/permissions",
    tag = "Roles",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All permissions", body = [Permission]))
)]
pub async fn list_permissions(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Permission>>> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    Ok(Json(state.identity.roles.list_permissions().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/permissions",
    tag = "Roles",
    security(("bearer_auth" = [])),
    request_body = CreatePermissionRequest,
    responses(
        (status = 201, description = "Permission created", body = Permission),
        (status = 409, description = "Permission exists")
    )
)]
pub async fn create_permission(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePermissionRequest>,
) -> AppResult<(StatusCode, Json<Permission>)> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    let permission = state
        .identity
        .roles
        .create_permission(payload.name, payload.description)
        .await?;
    Ok((StatusCode::CREATED, Json(permission)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/permissions/{id}",
    tag = "Roles",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Permission ID")),
    responses((status = 204, description = "Permission deleted"))
)]
pub async fn delete_permission(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    state.identity.roles.delete_permission(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
