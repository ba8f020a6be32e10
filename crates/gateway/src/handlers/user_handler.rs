//! User handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use common::{AppResult, Paginated};
use domain::identity::{LoginAttempt, Permission, Role, UserResponse};
use domain::PERM_IDENTITY_MANAGE;
use identity_service_lib::UserUpdate;

use super::PageQuery;
use crate::extractors::ValidatedJson;
use crate::middleware::{require_permission, require_self_or, CurrentUser};
use crate::state::AppState;

/// Profile update; every field is optional
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "First name cannot be empty"))]
    #[schema(example = "Ada")]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    #[validate(length(min = 3, max = 50, message = "Username must be 3 to 50 characters"))]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LockUserRequest {
    /// Lock duration in minutes
    #[validate(range(min = 1, max = 525600, message = "Minutes must be between 1 and 525600"))]
    #[schema(example = 60)]
    pub minutes: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRoleRequest {
    pub role_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GrantPermissionRequest {
    pub permission_id: Uuid,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserListQuery {
    /// Include soft-deleted users
    #[serde(default)]
    pub include_deleted: bool,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(get_current_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/restore", post(restore_user))
        .route("/:id/lock", post(lock_user))
        .route("/:id/unlock", post(unlock_user))
        .route("/:id/activate", post(activate_user))
        .route("/:id/deactivate", post(deactivate_user))
        .route("/:id/login-history", get(login_history))
        .route("/:id/roles", get(user_roles).post(assign_role))
        .route("/:id/roles/:role_id", delete(remove_role))
        .route(
            "/:id/permissions",
            get(user_permissions).post(grant_permission),
        )
        .route("/:id/permissions/:permission_id", delete(revoke_permission))
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    Ok(Json(state.load_user(current_user.id).await?))
}

/// List users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(PageQuery, UserListQuery),
    responses(
        (status = 200, description = "Paginated users"),
        (status = 403, description = "Requires identity.manage")
    )
)]
pub async fn list_users(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    let params = page.into();
    let users = state
        .identity
        .users
        .list_users(params, query.include_deleted)
        .await?;
    Ok(Json(Paginated::from_page(users, params)))
}

/// Get user by ID (own profile or identity.manage)
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    require_self_or(&current_user, id, PERM_IDENTITY_MANAGE)?;
    Ok(Json(state.load_user(id).await?))
}

/// Update a profile
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Username taken")
    )
)]
pub async fn update_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    require_self_or(&current_user, id, PERM_IDENTITY_MANAGE)?;

    let user = state
        .identity
        .users
        .update_user(
            id,
            UserUpdate {
                first_name: payload.first_name,
                last_name: payload.last_name,
                username: payload.username,
            },
        )
        .await?;
    let user = UserResponse::from(user);
    state.remember_user(&user).await;

    Ok(Json(user))
}

/// Soft delete a user (not yourself)
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete your own account"),
        (status = 403, description = "Requires identity.manage"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    state.identity.users.delete_user(id, current_user.id).await?;
    state.forget_user(id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Restore a soft-deleted user
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/restore",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User restored", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn restore_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    let user = UserResponse::from(state.identity.users.restore_user(id).await?);
    state.remember_user(&user).await;
    Ok(Json(user))
}

/// Lock an account for a number of minutes
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/lock",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = LockUserRequest,
    responses((status = 200, description = "User locked", body = UserResponse))
)]
pub async fn lock_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<LockUserRequest>,
) -> AppResult<Json<UserResponse>> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    let user = state.identity.users.lock_user(id, payload.minutes).await?;
    state.forget_user(id).await;
    Ok(Json(user.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/unlock",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses((status = 200, description = "User unlocked", body = UserResponse))
)]
pub async fn unlock_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    let user = state.identity.users.unlock_user(id).await?;
    state.forget_user(id).await;
    Ok(Json(user.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/activate",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses((status = 200, description = "User activated", body = UserResponse))
)]
pub async fn activate_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    let user = state.identity.users.activate_user(id).await?;
    state.forget_user(id).await;
    Ok(Json(user.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/deactivate",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses((status = 200, description = "User deactivated", body = UserResponse))
)]
pub async fn deactivate_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    let user = state.identity.users.deactivate_user(id).await?;
    state.forget_user(id).await;
    Ok(Json(user.into()))
}

/// Login attempts of a user, newest first
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/login-history",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID"), PageQuery),
    responses((status = 200, description = "Paginated login attempts"))
)]
pub async fn login_history(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Paginated<LoginAttempt>>> {
    require_self_or(&current_user, id, PERM_IDENTITY_MANAGE)?;
    let params = page.into();
    let history = state.identity.users.login_history(id, params).await?;
    Ok(Json(Paginated::from_page(history, params)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/roles",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses((status = 200, description = "Roles of the user", body = [Role]))
)]
pub async fn user_roles(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Role>>> {
    require_self_or(&current_user, id, PERM_IDENTITY_MANAGE)?;
    Ok(Json(state.identity.users.user_roles(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/roles",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = AssignRoleRequest,
    responses(
        (status = 200, description = "Roles after assignment", body = [Role]),
        (status = 404, description = "User or role not found")
    )
)]
pub async fn assign_role(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignRoleRequest>,
) -> AppResult<Json<Vec<Role>>> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    Ok(Json(
        state.identity.users.assign_role(id, payload.role_id).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}/roles/{role_id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("role_id" = Uuid, Path, description = "Role ID")
    ),
    responses((status = 204, description = "Role removed"))
)]
pub async fn remove_role(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((id, role_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    state.identity.users.remove_role(id, role_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Effective permissions (direct grants and role permissions)
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/permissions",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses((status = 200, description = "Effective permissions", body = [Permission]))
)]
pub async fn user_permissions(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Permission>>> {
    require_self_or(&current_user, id, PERM_IDENTITY_MANAGE)?;
    Ok(Json(state.identity.users.user_permissions(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/permissions",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = GrantPermissionRequest,
    responses((status = 200, description = "Direct grants after the change", body = [Permission]))
)]
pub async fn grant_permission(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GrantPermissionRequest>,
) -> AppResult<Json<Vec<Permission>>> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    Ok(Json(
        state
            .identity
            .users
            .grant_permission(id, payload.permission_id)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}/permissions/{permission_id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("permission_id" = Uuid, Path, description = "Permission ID")
    ),
    responses((status = 204, description = "Permission revoked"))
)]
pub async fn revoke_permission(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((id, permission_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    require_permission(&current_user, PERM_IDENTITY_MANAGE)?;
    state
        .identity
        .users
        .revoke_permission(id, permission_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
