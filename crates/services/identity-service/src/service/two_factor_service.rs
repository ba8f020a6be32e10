//! Two-factor enrolment: setup, verification and removal.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::identity::{TwoFactorAuth, TwoFactorSetup};
use domain::Password;

use crate::repository::IdentityRepositories;
use crate::security;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TwoFactorService: Send + Sync {
    /// Start enrolment. Returns the secret and backup codes exactly once.
    async fn setup(&self, user_id: Uuid) -> AppResult<TwoFactorSetup>;

    /// Confirm enrolment with a code from the authenticator app
    async fn verify(&self, user_id: Uuid, code: &str) -> AppResult<()>;

    /// Turn two-factor off after re-checking the password
    async fn disable(&self, user_id: Uuid, password: &str) -> AppResult<()>;
}

pub struct TwoFactorManager {
    repos: IdentityRepositories,
}

impl TwoFactorManager {
    pub fn new(repos: IdentityRepositories) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl TwoFactorService for TwoFactorManager {
    async fn setup(&self, user_id: Uuid) -> AppResult<TwoFactorSetup> {
        let user = self
            .repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_not_found("User")?;
        if user.two_factor_enabled {
            return Err(AppError::conflict_msg("Two-factor authentication is already enabled"));
        }

        let secret = security::generate_totp_secret();
        let backup_codes = security::generate_backup_codes();
        let hashes = backup_codes
            .iter()
            .map(|code| security::hash_backup_code(code))
            .collect();

        // Replaces any unfinished enrolment
        self.repos
            .two_factor
            .upsert(&TwoFactorAuth::new(user_id, secret.clone(), hashes))
            .await?;

        Ok(TwoFactorSetup {
            otpauth_uri: security::otpauth_uri(&user.email, &secret),
            secret,
            backup_codes,
        })
    }

    async fn verify(&self, user_id: Uuid, code: &str) -> AppResult<()> {
        let mut user = self
            .repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_not_found("User")?;
        let mut auth = self
            .repos
            .two_factor
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::bad_request("Two-factor setup has not been started"))?;

        let now = Utc::now();
        if !security::verify_totp(&auth.secret, code, now) {
            warn!(user_id = %user_id, "Invalid two-factor verification code");
            return Err(AppError::validation("Invalid verification code"));
        }

        auth.mark_verified(now)?;
        self.repos.two_factor.upsert(&auth).await?;
        user.enable_two_factor();
        self.repos.users.save(&user).await?;

        info!(user_id = %user_id, "Two-factor authentication enabled");
        Ok(())
    }

    async fn disable(&self, user_id: Uuid, password: &str) -> AppResult<()> {
        let mut user = self
            .repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_not_found("User")?;
        if !Password::from_hash(user.password_hash.as_str()).verify(password) {
            return Err(AppError::InvalidCredentials);
        }
        if !user.two_factor_enabled {
            return Err(AppError::bad_request("Two-factor authentication is not enabled"));
        }

        self.repos.two_factor.delete(user_id).await?;
        user.disable_two_factor();
        self.repos.users.save(&user).await?;

        warn!(user_id = %user_id, "Two-factor authentication disabled");
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
    use domain::identity::User;
    use domain::TOTP_STEP_SECONDS;

    fn manager(users: MockUserRepository, two_factor: MockTwoFactorRepository) -> TwoFactorManager {
        TwoFactorManager::new(IdentityRepositories {
            users: Arc::new(users),
            roles: Arc::new(MockRoleRepository::new()),
            permissions: Arc::new(MockPermissionRepository::new()),
            tokens: Arc::new(MockRefreshTokenRepository::new()),
            two_factor: Arc::new(two_factor),
            login_history: Arc::new(MockLoginHistoryRepository::new()),
        })
    }

    fn test_user() -> User {
        let hash = Password::new("correct-horse").unwrap().into_string();
        User::new("ana@uni.edu", "ana", hash, "Ana", "Silva").unwrap()
    }

    #[tokio::test]
    async fn test_setup_returns_material_once() {
        let user = test_user();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        let mut two_factor = MockTwoFactorRepository::new();
        two_factor
            .expect_upsert()
            .withf(|auth| !auth.is_verified && auth.backup_code_hashes.len() == 10)
            .returning(|auth| Ok(auth.clone()));
        let service = manager(users, two_factor);

        let setup = service.setup(Uuid::new_v4()).await.unwrap();
        assert!(setup.otpauth_uri.contains(&setup.secret));
        assert_eq!(setup.backup_codes.len(), 10);
    }

    #[tokio::test]
    async fn test_setup_refused_when_enabled() {
        let mut user = test_user();
        user.two_factor_enabled = true;
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        let service = manager(users, MockTwoFactorRepository::new());

        let result = service.setup(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_verify_enables_two_factor() {
        let user = test_user();
        let secret = security::generate_totp_secret();
        let key = security::base32_decode(&secret).unwrap();
        let step = (Utc::now().timestamp() / TOTP_STEP_SECONDS) as u64;
        let code = security::totp_code(&key, step).unwrap();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_save()
            .withf(|u| u.two_factor_enabled)
            .times(1)
            .returning(|u| Ok(u.clone()));
        let mut two_factor = MockTwoFactorRepository::new();
        let pending = TwoFactorAuth::new(Uuid::new_v4(), secret, vec![]);
        two_factor
            .expect_find_by_user()
            .returning(move |_| Ok(Some(pending.clone())));
        two_factor
            .expect_upsert()
            .withf(|auth| auth.is_verified)
            .returning(|auth| Ok(auth.clone()));
        let service = manager(users, two_factor);

        assert!(service.verify(Uuid::new_v4(), &code).await.is_ok());
    }

    #[tokio::test]
    async fn test_disable_requires_password() {
        let mut user = test_user();
        user.two_factor_enabled = true;
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        let mut two_factor = MockTwoFactorRepository::new();
        two_factor.expect_delete().never();
        let service = manager(users, two_factor);

        let result = service.disable(Uuid::new_v4(), "wrong-password").await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }
}
