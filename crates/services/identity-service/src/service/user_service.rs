//! User service - account administration, roles and direct permissions.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt, Page, PaginationParams};
use domain::identity::{LoginAttempt, Permission, Role, User};

use crate::repository::IdentityRepositories;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Partial profile update
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

/// User service trait for dependency injection.
///
/// By default, operations exclude soft-deleted users.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get active user by ID (excludes soft-deleted)
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Active user with this email, compared case-insensitively
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// List users, optionally including soft-deleted ones
    async fn list_users(&self, params: PaginationParams, include_deleted: bool)
        -> AppResult<Page<User>>;

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> AppResult<User>;

    /// Soft delete a user. `acting_user` may not delete themselves.
    async fn delete_user(&self, id: Uuid, acting_user: Uuid) -> AppResult<()>;

    /// Restore a soft-deleted user
    async fn restore_user(&self, id: Uuid) -> AppResult<User>;

    /// Lock the account for `minutes` and end its sessions
    async fn lock_user(&self, id: Uuid, minutes: i64) -> AppResult<User>;

    async fn unlock_user(&self, id: Uuid) -> AppResult<User>;

    async fn activate_user(&self, id: Uuid) -> AppResult<User>;

    /// Deactivate the account and end its sessions
    async fn deactivate_user(&self, id: Uuid) -> AppResult<User>;

    async fn login_history(&self, id: Uuid, params: PaginationParams)
        -> AppResult<Page<LoginAttempt>>;

    async fn user_roles(&self, id: Uuid) -> AppResult<Vec<Role>>;

    async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<Vec<Role>>;

    async fn remove_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()>;

    /// Effective permissions: direct grants plus those of every role
    async fn user_permissions(&self, id: Uuid) -> AppResult<Vec<Permission>>;

    async fn grant_permission(&self, user_id: Uuid, permission_id: Uuid)
        -> AppResult<Vec<Permission>>;

    async fn revoke_permission(&self, user_id: Uuid, permission_id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserService using repositories.
pub struct UserManager {
    repos: IdentityRepositories,
}

impl UserManager {
    pub fn new(repos: IdentityRepositories) -> Self {
        Self { repos }
    }

    async fn load(&self, id: Uuid) -> AppResult<User> {
        self.repos.users.find_by_id(id).await?.ok_or_not_found("User")
    }

    async fn end_sessions(&self, user_id: Uuid) -> AppResult<()> {
        let revoked = self
            .repos
            .tokens
            .revoke_all_for_user(user_id, Utc::now())
            .await?;
        if revoked > 0 {
            info!(user_id = %user_id, revoked, "Refresh tokens revoked");
        }
        Ok(())
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.load(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.trim().to_lowercase();
        self.repos.users.find_by_email(&email).await
    }

    async fn list_users(
        &self,
        params: PaginationParams,
        include_deleted: bool,
    ) -> AppResult<Page<User>> {
        self.repos.users.list(params, include_deleted).await
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> AppResult<User> {
        let mut user = self.load(id).await?;

        if let Some(username) = update.username.as_deref() {
            if let Some(other) = self
                .repos
                .users
                .find_by_username_with_deleted(username.trim())
                .await?
            {
                if other.id != user.id {
                    return Err(AppError::conflict("Username"));
                }
            }
        }

        user.update_profile(
            update.first_name.as_deref(),
            update.last_name.as_deref(),
            update.username.as_deref(),
        )?;
        self.repos.users.save(&user).await
    }

    async fn delete_user(&self, id: Uuid, acting_user: Uuid) -> AppResult<()> {
        if id == acting_user {
            return Err(AppError::bad_request("You cannot delete your own account"));
        }
        let mut user = self.load(id).await?;
        user.soft_delete();
        self.repos.users.save(&user).await?;
        self.end_sessions(id).await?;
        info!(user_id = %id, deleted_by = %acting_user, "User deleted");
        Ok(())
    }

    async fn restore_user(&self, id: Uuid) -> AppResult<User> {
        let mut user = self
            .repos
            .users
            .find_by_id_with_deleted(id)
            .await?
            .ok_or_not_found("User")?;
        user.restore()?;
        self.repos.users.save(&user).await
    }

    async fn lock_user(&self, id: Uuid, minutes: i64) -> AppResult<User> {
        if minutes <= 0 {
            return Err(AppError::validation("Lock duration must be positive"));
        }
        let mut user = self.load(id).await?;
        let now = Utc::now();
        user.lock_until(now + Duration::minutes(minutes), now)?;
        let user = self.repos.users.save(&user).await?;
        self.end_sessions(id).await?;
        warn!(user_id = %id, minutes, "User locked by administrator");
        Ok(user)
    }

    async fn unlock_user(&self, id: Uuid) -> AppResult<User> {
        let mut user = self.load(id).await?;
        user.unlock(Utc::now());
        let user = self.repos.users.save(&user).await?;
        info!(user_id = %id, "User unlocked");
        Ok(user)
    }

    async fn activate_user(&self, id: Uuid) -> AppResult<User> {
        let mut user = self.load(id).await?;
        user.activate();
        self.repos.users.save(&user).await
    }

    async fn deactivate_user(&self, id: Uuid) -> AppResult<User> {
        let mut user = self.load(id).await?;
        user.deactivate();
        let user = self.repos.users.save(&user).await?;
        self.end_sessions(id).await?;
        Ok(user)
    }

    async fn login_history(
        &self,
        id: Uuid,
        params: PaginationParams,
    ) -> AppResult<Page<LoginAttempt>> {
        self.repos
            .users
            .find_by_id_with_deleted(id)
            .await?
            .ok_or_not_found("User")?;
        self.repos.login_history.list_for_user(id, params).await
    }

    async fn user_roles(&self, id: Uuid) -> AppResult<Vec<Role>> {
        self.load(id).await?;
        self.repos.roles.user_roles(id).await
    }

    async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<Vec<Role>> {
        self.load(user_id).await?;
        let role = self
            .repos
            .roles
            .find_by_id(role_id)
            .await?
            .ok_or_not_found("Role")?;
        self.repos.roles.assign_role(user_id, role_id).await?;
        info!(user_id = %user_id, role = %role.name, "Role assigned");
        self.repos.roles.user_roles(user_id).await
    }

    async fn remove_role(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()> {
        if !self.repos.roles.remove_role(user_id, role_id).await? {
            return Err(AppError::not_found("Role assignment"));
        }
        info!(user_id = %user_id, role_id = %role_id, "Role removed");
        Ok(())
    }

    async fn user_permissions(&self, id: Uuid) -> AppResult<Vec<Permission>> {
        self.load(id).await?;
        self.repos.permissions.effective_permissions(id).await
    }

    async fn grant_permission(
        &self,
        user_id: Uuid,
        permission_id: Uuid,
    ) -> AppResult<Vec<Permission>> {
        self.load(user_id).await?;
        let permission = self
            .repos
            .permissions
            .find_by_id(permission_id)
            .await?
            .ok_or_not_found("Permission")?;
        self.repos.permissions.grant(user_id, permission_id).await?;
        info!(user_id = %user_id, permission = %permission.name, "Permission granted");
        self.repos.permissions.direct_permissions(user_id).await
    }

    async fn revoke_permission(&self, user_id: Uuid, permission_id: Uuid) -> AppResult<()> {
        if !self.repos.permissions.revoke(user_id, permission_id).await? {
            return Err(AppError::not_found("Permission grant"));
        }
        info!(user_id = %user_id, permission_id = %permission_id, "Permission revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::repository::{
        MockLoginHistoryRepository, MockPermissionRepository, MockRefreshTokenRepository,
        MockRoleRepository, MockTwoFactorRepository, MockUserRepository,
    };

    fn manager(
        users: MockUserRepository,
        roles: MockRoleRepository,
        tokens: MockRefreshTokenRepository,
    ) -> UserManager {
        UserManager::new(IdentityRepositories {
            users: Arc::new(users),
            roles: Arc::new(roles),
            permissions: Arc::new(MockPermissionRepository::new()),
            tokens: Arc::new(tokens),
            two_factor: Arc::new(MockTwoFactorRepository::new()),
            login_history: Arc::new(MockLoginHistoryRepository::new()),
        })
    }

    fn test_user() -> User {
        User::new("sam@uni.edu", "sam", "hash".to_string(), "Sam", "Lee").unwrap()
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        let service = manager(users, MockRoleRepository::new(), MockRefreshTokenRepository::new());

        let result = service.get_user(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(entity)) if entity == "User"));
    }

    #[tokio::test]
    async fn test_find_user_by_email_normalizes() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .withf(|email| email == "sam@uni.edu")
            .returning(|_| Ok(Some(test_user())));
        let service = manager(users, MockRoleRepository::new(), MockRefreshTokenRepository::new());

        let found = service.find_user_by_email("  Sam@Uni.EDU ").await.unwrap();
        assert_eq!(found.map(|u| u.username), Some("sam".to_string()));
    }

    #[tokio::test]
    async fn test_cannot_delete_self() {
        let id = Uuid::new_v4();
        let service = manager(
            MockUserRepository::new(),
            MockRoleRepository::new(),
            MockRefreshTokenRepository::new(),
        );
        let result = service.delete_user(id, id).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_user_soft_deletes_and_revokes_tokens() {
        let user = test_user();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_save()
            .withf(|u| u.deleted_at.is_some())
            .times(1)
            .returning(|u| Ok(u.clone()));
        let mut tokens = MockRefreshTokenRepository::new();
        tokens
            .expect_revoke_all_for_user()
            .times(1)
            .returning(|_, _| Ok(2));
        let service = manager(users, MockRoleRepository::new(), tokens);

        let result = service.delete_user(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_restore_requires_deleted_user() {
        let user = test_user();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id_with_deleted()
            .returning(move |_| Ok(Some(user.clone())));
        let service = manager(users, MockRoleRepository::new(), MockRefreshTokenRepository::new());

        let result = service.restore_user(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_lock_user_sets_lockout() {
        let user = test_user();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        users.expect_save().returning(|u| Ok(u.clone()));
        let mut tokens = MockRefreshTokenRepository::new();
        tokens.expect_revoke_all_for_user().returning(|_, _| Ok(0));
        let service = manager(users, MockRoleRepository::new(), tokens);

        let locked = service.lock_user(Uuid::new_v4(), 30).await.unwrap();
        assert!(locked.is_locked(Utc::now()));

        let invalid = service.lock_user(Uuid::new_v4(), 0).await;
        assert!(matches!(invalid, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_taken_username() {
        let user = test_user();
        let other = User::new("kim@uni.edu", "kim", "hash".to_string(), "Kim", "Park").unwrap();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_find_by_username_with_deleted()
            .returning(move |_| Ok(Some(other.clone())));
        users.expect_save().never();
        let service = manager(users, MockRoleRepository::new(), MockRefreshTokenRepository::new());

        let result = service
            .update_user(
                Uuid::new_v4(),
                UserUpdate {
                    username: Some("kim".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_assign_unknown_role() {
        let user = test_user();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        let mut roles = MockRoleRepository::new();
        roles.expect_find_by_id().returning(|_| Ok(None));
        roles.expect_assign_role().never();
        let service = manager(users, roles, MockRefreshTokenRepository::new());

        let result = service.assign_role(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
