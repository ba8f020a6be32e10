//! Authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{BEARER_TOKEN_PREFIX, ROLE_ADMIN};
use identity_service_lib::Claims;

use crate::state::AppState;

/// Current authenticated user extracted from JWT.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ROLE_ADMIN)
    }

    /// Admins implicitly hold every permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.is_admin() || self.permissions.iter().any(|p| p == permission)
    }
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            roles: claims.roles,
            permissions: claims.permissions,
        }
    }
}

pub fn require_permission(user: &CurrentUser, permission: &str) -> AppResult<()> {
    if user.has_permission(permission) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Pass when the user holds at least one of `permissions`.
pub fn require_any_permission(user: &CurrentUser, permissions: &[&str]) -> AppResult<()> {
    if permissions.iter().any(|p| user.has_permission(p)) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Allow the user acting on their own record, otherwise require `permission`.
pub fn require_self_or(user: &CurrentUser, target: Uuid, permission: &str) -> AppResult<()> {
    if user.id == target {
        return Ok(());
    }
    require_permission(user, permission)
}

/// Authentication middleware that validates JWT tokens.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .ok_or(AppError::Unauthorized)?;

    let claims = state.identity.auth.verify_token(token)?;
    request.extensions_mut().insert(CurrentUser::from(claims));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    fn user(roles: &[&str], permissions: &[&str]) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "clerk@university.test".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_admin_bypasses_permission_checks() {
        let admin = user(&["admin"], &[]);
        assert!(require_permission(&admin, "grades.write").is_ok());
        assert!(admin.is_admin());
    }

    #[test]
    fn test_permission_required() {
        let registrar = user(&["registrar"], &["academic.manage"]);
        assert!(require_permission(&registrar, "academic.manage").is_ok());
        assert!(matches!(
            require_permission(&registrar, "grades.write"),
            Err(AppError::Forbidden)
        ));
        assert!(!registrar.is_admin());
    }

    #[test]
    fn test_any_permission() {
        let lecturer = user(&["lecturer"], &["grades.write"]);
        assert_ok!(require_any_permission(
            &lecturer,
            &["enrollments.write", "grades.write"]
        ));
        assert_err!(require_any_permission(&lecturer, &["academic.manage"]));
    }

    #[test]
    fn test_self_access() {
        let plain = user(&["user"], &[]);
        assert_ok!(require_self_or(&plain, plain.id, "identity.manage"));
        assert_err!(require_self_or(&plain, Uuid::new_v4(), "identity.manage"));
    }
}
