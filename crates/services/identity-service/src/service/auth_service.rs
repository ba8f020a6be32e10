//! Authentication service - registration, login, token rotation.
//!
//! Lockout, two-factor and refresh-token reuse detection all live here; the
//! gateway only verifies access tokens through [`AuthService::verify_token`].

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use common::{AppError, AppResult, JwtConfig, LockoutConfig, OptionExt};
use domain::identity::{
    ClientInfo, LockoutPolicy, LoginAttempt, LoginFailureReason, RefreshToken, TokenResponse, User,
};
use domain::{Password, ROLE_ADMIN, ROLE_USER, SECONDS_PER_MINUTE, TOKEN_TYPE_BEARER};

use crate::repository::IdentityRepositories;
use crate::security;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Hash verified when the email is unknown so that response time does not
/// reveal which accounts exist.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    Password::new("timing-equalisation-password")
        .map(Password::into_string)
        .unwrap_or_default()
});

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ROLE_ADMIN)
    }

    /// Administrators hold every permission implicitly.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.is_admin() || self.permissions.iter().any(|p| p == permission)
    }
}

/// Token lifetimes, signing key and lockout policy.
#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub issuer: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub lockout: LockoutPolicy,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("access_token_minutes", &self.access_token_minutes)
            .field("refresh_token_days", &self.refresh_token_days)
            .field("lockout", &self.lockout)
            .finish()
    }
}

impl AuthSettings {
    pub fn from_config(jwt: &JwtConfig, lockout: &LockoutConfig) -> Self {
        Self {
            jwt_secret: jwt.secret.clone(),
            issuer: jwt.issuer.clone(),
            access_token_minutes: jwt.expiration_minutes,
            refresh_token_days: jwt.refresh_token_days,
            lockout: LockoutPolicy {
                max_failed_attempts: lockout.max_failed_attempts,
                duration: Duration::minutes(lockout.duration_minutes),
            },
        }
    }
}

/// Registration input
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Login input
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub two_factor_code: Option<String>,
}

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user with the default role
    async fn register(&self, registration: Registration) -> AppResult<User>;

    /// Authenticate and issue an access/refresh token pair
    async fn login(&self, credentials: Credentials, client: ClientInfo) -> AppResult<TokenResponse>;

    /// Rotate a refresh token
    async fn refresh(&self, refresh_token: &str, client: ClientInfo) -> AppResult<TokenResponse>;

    /// Revoke a refresh token
    async fn logout(&self, refresh_token: &str) -> AppResult<()>;

    /// Change password and end every session of the user
    async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Make sure `email` exists and holds the admin role
    async fn bootstrap_admin(&self, email: &str, password: &str) -> AppResult<User>;
}

/// Concrete implementation of AuthService over the identity repositories.
pub struct Authenticator {
    repos: IdentityRepositories,
    settings: AuthSettings,
}

impl Authenticator {
    pub fn new(repos: IdentityRepositories, settings: AuthSettings) -> Self {
        Self { repos, settings }
    }

    fn jwt_secret_bytes(&self) -> &[u8] {
        self.settings.jwt_secret.as_bytes()
    }

    /// Issue a fresh access token and refresh token. Returns the stored
    /// refresh token id so a rotated token can point at its successor.
    async fn issue_tokens(
        &self,
        user: &User,
        ip_address: Option<String>,
    ) -> AppResult<(TokenResponse, Uuid)> {
        let roles = self.repos.roles.user_roles(user.id).await?;
        let permissions = self.repos.permissions.effective_permissions(user.id).await?;

        let now = Utc::now();
        let expires_at = now + Duration::minutes(self.settings.access_token_minutes);
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            roles: roles.into_iter().map(|r| r.name).collect(),
            permissions: permissions.into_iter().map(|p| p.name).collect(),
            iss: self.settings.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret_bytes()),
        )?;

        let raw_refresh = security::generate_refresh_token();
        let refresh_expires_at = now + Duration::days(self.settings.refresh_token_days);
        let stored = self
            .repos
            .tokens
            .create(&RefreshToken::new(
                user.id,
                security::hash_token(&raw_refresh),
                refresh_expires_at,
                ip_address,
            ))
            .await?;

        Ok((
            TokenResponse {
                access_token,
                token_type: TOKEN_TYPE_BEARER.to_string(),
                expires_in: self.settings.access_token_minutes * SECONDS_PER_MINUTE,
                refresh_token: raw_refresh,
                refresh_expires_at,
            },
            stored.id,
        ))
    }

    async fn record_attempt(&self, attempt: LoginAttempt) {
        if let Err(e) = self.repos.login_history.record(&attempt).await {
            warn!(error = %e, email = %attempt.email, "Failed to record login attempt");
        }
    }

    /// Count a failed login against the account and record it.
    async fn reject_login(
        &self,
        mut user: User,
        reason: LoginFailureReason,
        client: &ClientInfo,
        now: DateTime<Utc>,
    ) -> AppResult<TokenResponse> {
        let locked = user.record_failed_login(now, self.settings.lockout);
        self.repos.users.save(&user).await?;
        self.record_attempt(LoginAttempt::failed(Some(user.id), &user.email, client, reason))
            .await;

        if locked {
            warn!(user_id = %user.id, "Account locked after repeated failed logins");
            return Err(AppError::AccountLocked);
        }
        warn!(user_id = %user.id, reason = %reason, "Failed login");
        Err(AppError::InvalidCredentials)
    }

    /// Accept either a current TOTP code or an unused backup code.
    async fn check_second_factor(
        &self,
        user_id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let Some(mut auth) = self.repos.two_factor.find_by_user(user_id).await? else {
            return Ok(false);
        };
        if !auth.is_verified {
            return Ok(false);
        }
        if security::verify_totp(&auth.secret, code, now) {
            return Ok(true);
        }
        if auth.consume_backup_code(&security::hash_backup_code(code)) {
            self.repos.two_factor.upsert(&auth).await?;
            info!(
                user_id = %user_id,
                remaining = auth.remaining_backup_codes(),
                "Backup code used for login"
            );
            return Ok(true);
        }
        Ok(false)
    }

    async fn available_admin_username(&self, email: &str) -> AppResult<String> {
        let local = email.split('@').next().unwrap_or(ROLE_ADMIN);
        let base: String = local
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        let base = if base.len() >= 3 { base } else { ROLE_ADMIN.to_string() };

        if self
            .repos
            .users
            .find_by_username_with_deleted(&base)
            .await?
            .is_none()
        {
            return Ok(base);
        }
        let suffix = Uuid::new_v4().simple().to_string();
        Ok(format!("{}-{}", base, &suffix[..8]))
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        let password_hash = Password::new(&registration.password)?.into_string();
        let user = User::new(
            &registration.email,
            &registration.username,
            password_hash,
            &registration.first_name,
            &registration.last_name,
        )?;

        // Soft-deleted accounts keep their email and username reserved
        if self
            .repos
            .users
            .find_by_email_with_deleted(&user.email)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Email"));
        }
        if self
            .repos
            .users
            .find_by_username_with_deleted(&user.username)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Username"));
        }

        let user = self.repos.users.create(&user).await?;

        match self.repos.roles.find_by_name_with_deleted(ROLE_USER).await? {
            Some(role) if role.deleted_at.is_none() => {
                self.repos.roles.assign_role(user.id, role.id).await?
            }
            _ => warn!("Default role '{}' missing; user registered without roles", ROLE_USER),
        }

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn login(
        &self,
        credentials: Credentials,
        client: ClientInfo,
    ) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let email = credentials.email.trim().to_lowercase();

        let Some(user) = self.repos.users.find_by_email(&email).await? else {
            // Verify against a real hash anyway so unknown emails cost the same
            let _ = Password::from_hash(DUMMY_HASH.as_str()).verify(&credentials.password);
            self.record_attempt(LoginAttempt::failed(
                None,
                &email,
                &client,
                LoginFailureReason::InvalidCredentials,
            ))
            .await;
            return Err(AppError::InvalidCredentials);
        };

        if let Err(e) = user.ensure_can_login(now) {
            let reason = if user.is_locked(now) {
                LoginFailureReason::AccountLocked
            } else {
                LoginFailureReason::AccountInactive
            };
            self.record_attempt(LoginAttempt::failed(Some(user.id), &email, &client, reason))
                .await;
            return Err(e.into());
        }

        if !Password::from_hash(user.password_hash.as_str()).verify(&credentials.password) {
            return self
                .reject_login(user, LoginFailureReason::InvalidCredentials, &client, now)
                .await;
        }

        if user.two_factor_enabled {
            let Some(code) = credentials.two_factor_code.as_deref() else {
                self.record_attempt(LoginAttempt::failed(
                    Some(user.id),
                    &email,
                    &client,
                    LoginFailureReason::TwoFactorRequired,
                ))
                .await;
                return Err(AppError::TwoFactorRequired);
            };
            if !self.check_second_factor(user.id, code, now).await? {
                return self
                    .reject_login(user, LoginFailureReason::InvalidTwoFactorCode, &client, now)
                    .await;
            }
        }

        let mut user = user;
        user.record_successful_login(now);
        let user = self.repos.users.save(&user).await?;
        self.record_attempt(LoginAttempt::succeeded(user.id, &email, &client))
            .await;

        let (tokens, _) = self.issue_tokens(&user, client.ip_address.clone()).await?;
        info!(user_id = %user.id, "User logged in");
        Ok(tokens)
    }

    async fn refresh(&self, refresh_token: &str, client: ClientInfo) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let mut stored = self
            .repos
            .tokens
            .find_by_hash(&security::hash_token(refresh_token))
            .await?
            .ok_or(AppError::Unauthorized)?;

        if stored.is_revoked() {
            let revoked = self
                .repos
                .tokens
                .revoke_all_for_user(stored.user_id, now)
                .await?;
            warn!(
                user_id = %stored.user_id,
                revoked,
                "Refresh token reuse detected; all sessions revoked"
            );
            return Err(AppError::Unauthorized);
        }
        if stored.is_expired(now) {
            return Err(AppError::Unauthorized);
        }

        let user = self
            .repos
            .users
            .find_by_id(stored.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        user.ensure_can_login(now).map_err(|_| AppError::Unauthorized)?;

        // Tokens carry fresh roles and permissions, not those of the old token
        let (tokens, successor) = self.issue_tokens(&user, client.ip_address).await?;
        stored.revoke(now, Some(successor))?;
        self.repos.tokens.save(&stored).await?;

        Ok(tokens)
    }

    async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        let now = Utc::now();
        if let Some(mut stored) = self
            .repos
            .tokens
            .find_by_hash(&security::hash_token(refresh_token))
            .await?
        {
            if stored.is_active(now) {
                stored.revoke(now, None)?;
                self.repos.tokens.save(&stored).await?;
                info!(user_id = %stored.user_id, "User logged out");
            }
        }
        Ok(())
    }

    async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let mut user = self.repos.users.find_by_id(user_id).await?.ok_or_not_found("User")?;

        if !Password::from_hash(user.password_hash.as_str()).verify(current_password) {
            return Err(AppError::InvalidCredentials);
        }
        if current_password == new_password {
            return Err(AppError::validation(
                "New password must differ from the current password",
            ));
        }

        user.change_password(Password::new(new_password)?.into_string());
        self.repos.users.save(&user).await?;
        self.repos
            .tokens
            .revoke_all_for_user(user_id, Utc::now())
            .await?;

        info!(user_id = %user_id, "Password changed; sessions revoked");
        Ok(())
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.settings.issuer.as_str()]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret_bytes()),
            &validation,
        )?;

        Ok(token_data.claims)
    }

    async fn bootstrap_admin(&self, email: &str, password: &str) -> AppResult<User> {
        let admin_role = self
            .repos
            .roles
            .find_by_name_with_deleted(ROLE_ADMIN)
            .await?
            .filter(|r| r.deleted_at.is_none())
            .ok_or_else(|| AppError::internal("Admin role missing; seed default roles first"))?;

        let user = match self.repos.users.find_by_email_with_deleted(email).await? {
            Some(user) => user,
            None => {
                let username = self.available_admin_username(email).await?;
                let user = User::new(
                    email,
                    &username,
                    Password::new(password)?.into_string(),
                    "System",
                    "Administrator",
                )?;
                let user = self.repos.users.create(&user).await?;
                info!(user_id = %user.id, "Administrator account created");
                user
            }
        };

        self.repos.roles.assign_role(user.id, admin_role.id).await?;
        Ok(user)
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
    use domain::identity::{Permission, Role, TwoFactorAuth};
    use domain::BACKUP_CODE_COUNT;
    use tokio_test::{assert_err, assert_ok};

    const SECRET: &str = "test-secret-that-is-long-enough-1234567890";

    struct Mocks {
        users: MockUserRepository,
        roles: MockRoleRepository,
        permissions: MockPermissionRepository,
        tokens: MockRefreshTokenRepository,
        two_factor: MockTwoFactorRepository,
        login_history: MockLoginHistoryRepository,
    }

    impl Mocks {
        fn new() -> Self {
            let mut login_history = MockLoginHistoryRepository::new();
            login_history.expect_record().returning(|_| Ok(()));
            Self {
                users: MockUserRepository::new(),
                roles: MockRoleRepository::new(),
                permissions: MockPermissionRepository::new(),
                tokens: MockRefreshTokenRepository::new(),
                two_factor: MockTwoFactorRepository::new(),
                login_history,
            }
        }

        fn with_token_issuing(mut self) -> Self {
            self.roles.expect_user_roles().returning(|_| {
                Ok(vec![Role::new("registrar", None).unwrap()])
            });
            self.permissions.expect_effective_permissions().returning(|_| {
                Ok(vec![Permission::new("academic.manage", None).unwrap()])
            });
            self.tokens
                .expect_create()
                .returning(|token| Ok(token.clone()));
            self
        }

        fn build(self) -> Authenticator {
            let repos = IdentityRepositories {
                users: Arc::new(self.users),
                roles: Arc::new(self.roles),
                permissions: Arc::new(self.permissions),
                tokens: Arc::new(self.tokens),
                two_factor: Arc::new(self.two_factor),
                login_history: Arc::new(self.login_history),
            };
            Authenticator::new(repos, settings())
        }
    }

    fn settings() -> AuthSettings {
        AuthSettings {
            jwt_secret: SECRET.to_string(),
            issuer: "university-api".to_string(),
            access_token_minutes: 60,
            refresh_token_days: 7,
            lockout: LockoutPolicy::default(),
        }
    }

    fn user_with_password(password: &str) -> User {
        let hash = Password::new(password).unwrap().into_string();
        User::new("jane@uni.edu", "jane", hash, "Jane", "Doe").unwrap()
    }

    fn credentials(password: &str) -> Credentials {
        Credentials {
            email: "Jane@Uni.edu".to_string(),
            password: password.to_string(),
            two_factor_code: None,
        }
    }

    #[tokio::test]
    async fn test_login_success_issues_tokens_with_permissions() {
        let user = user_with_password("correct-horse");
        let mut mocks = Mocks::new().with_token_issuing();
        let found = user.clone();
        mocks
            .users
            .expect_find_by_email()
            .withf(|email| email == "jane@uni.edu")
            .returning(move |_| Ok(Some(found.clone())));
        mocks.users.expect_save().returning(|u| Ok(u.clone()));
        let auth = mocks.build();

        let tokens = auth
            .login(credentials("correct-horse"), ClientInfo::default())
            .await
            .unwrap();

        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.expires_in, 3600);
        let claims = auth.verify_token(&tokens.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.roles, vec!["registrar".to_string()]);
        assert!(claims.has_permission("academic.manage"));
        assert!(!claims.has_permission("grades.write"));
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_invalid_credentials() {
        let mut mocks = Mocks::new();
        mocks.users.expect_find_by_email().returning(|_| Ok(None));
        let auth = mocks.build();

        let result = auth
            .login(credentials("whatever-pass"), ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_fifth_failure_locks_account() {
        let mut user = user_with_password("correct-horse");
        user.failed_login_attempts = 4;
        let mut mocks = Mocks::new();
        mocks
            .users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        mocks
            .users
            .expect_save()
            .withf(|u| u.lockout_end.is_some() && u.failed_login_attempts == 0)
            .times(1)
            .returning(|u| Ok(u.clone()));
        let auth = mocks.build();

        let result = auth
            .login(credentials("wrong-password"), ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::AccountLocked)));
    }

    #[tokio::test]
    async fn test_locked_account_rejected_before_password_check() {
        let mut user = user_with_password("correct-horse");
        user.lockout_end = Some(Utc::now() + Duration::minutes(10));
        let mut mocks = Mocks::new();
        mocks
            .users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        mocks.users.expect_save().never();
        let auth = mocks.build();

        let result = auth
            .login(credentials("correct-horse"), ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::AccountLocked)));
    }

    #[tokio::test]
    async fn test_two_factor_code_required() {
        let mut user = user_with_password("correct-horse");
        user.two_factor_enabled = true;
        let mut mocks = Mocks::new();
        mocks
            .users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        let auth = mocks.build();

        let result = auth
            .login(credentials("correct-horse"), ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::TwoFactorRequired)));
    }

    fn verified_two_factor(user_id: Uuid, backup_codes: &[String]) -> TwoFactorAuth {
        let mut auth = TwoFactorAuth::new(
            user_id,
            security::generate_totp_secret(),
            backup_codes.iter().map(|c| security::hash_backup_code(c)).collect(),
        );
        auth.mark_verified(Utc::now()).unwrap();
        auth
    }

    #[tokio::test]
    async fn test_wrong_two_factor_code_counts_as_failure() {
        let mut user = user_with_password("correct-horse");
        user.two_factor_enabled = true;
        let enrolment = verified_two_factor(user.id, &security::generate_backup_codes());
        let mut mocks = Mocks::new();
        mocks
            .users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        mocks
            .two_factor
            .expect_find_by_user()
            .returning(move |_| Ok(Some(enrolment.clone())));
        mocks.two_factor.expect_upsert().never();
        mocks
            .users
            .expect_save()
            .withf(|u| u.failed_login_attempts == 1 && u.lockout_end.is_none())
            .times(1)
            .returning(|u| Ok(u.clone()));
        let auth = mocks.build();

        let mut attempt = credentials("correct-horse");
        attempt.two_factor_code = Some("not-a-code".to_string());
        let result = auth.login(attempt, ClientInfo::default()).await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_backup_code_login_consumes_code() {
        let mut user = user_with_password("correct-horse");
        user.two_factor_enabled = true;
        let codes = security::generate_backup_codes();
        let used_hash = security::hash_backup_code(&codes[0]);
        let enrolment = verified_two_factor(user.id, &codes);

        let mut mocks = Mocks::new().with_token_issuing();
        mocks
            .users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        mocks
            .two_factor
            .expect_find_by_user()
            .returning(move |_| Ok(Some(enrolment.clone())));
        mocks
            .two_factor
            .expect_upsert()
            .withf(move |auth| {
                auth.remaining_backup_codes() == BACKUP_CODE_COUNT - 1
                    && !auth.backup_code_hashes.contains(&used_hash)
            })
            .times(1)
            .returning(|auth| Ok(auth.clone()));
        mocks
            .users
            .expect_save()
            .withf(|u| u.failed_login_attempts == 0 && u.last_login_at.is_some())
            .times(1)
            .returning(|u| Ok(u.clone()));
        let auth = mocks.build();

        let mut attempt = credentials("correct-horse");
        attempt.two_factor_code = Some(codes[0].to_lowercase());
        let tokens = auth.login(attempt, ClientInfo::default()).await;
        assert_ok!(&tokens);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let existing = user_with_password("correct-horse");
        let mut mocks = Mocks::new();
        mocks
            .users
            .expect_find_by_email_with_deleted()
            .returning(move |_| Ok(Some(existing.clone())));
        mocks.users.expect_create().never();
        let auth = mocks.build();

        let result = auth
            .register(Registration {
                email: "jane@uni.edu".to_string(),
                username: "jane2".to_string(),
                password: "long-enough-pass".to_string(),
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_assigns_default_role() {
        let mut mocks = Mocks::new();
        mocks
            .users
            .expect_find_by_email_with_deleted()
            .returning(|_| Ok(None));
        mocks
            .users
            .expect_find_by_username_with_deleted()
            .returning(|_| Ok(None));
        mocks.users.expect_create().returning(|u| Ok(u.clone()));
        let role = Role::new(ROLE_USER, None).unwrap();
        let role_id = role.id;
        mocks
            .roles
            .expect_find_by_name_with_deleted()
            .returning(move |_| Ok(Some(role.clone())));
        mocks
            .roles
            .expect_assign_role()
            .withf(move |_, r| *r == role_id)
            .times(1)
            .returning(|_, _| Ok(()));
        let auth = mocks.build();

        let user = auth
            .register(Registration {
                email: "New.Student@Uni.edu".to_string(),
                username: "new_student".to_string(),
                password: "long-enough-pass".to_string(),
                first_name: "New".to_string(),
                last_name: "Student".to_string(),
            })
            .await;
        assert_ok!(&user);
        assert_eq!(user.unwrap().email, "new.student@uni.edu");
    }

    #[tokio::test]
    async fn test_refresh_reuse_revokes_all_sessions() {
        let user_id = Uuid::new_v4();
        let mut token = RefreshToken::new(
            user_id,
            security::hash_token("stolen"),
            Utc::now() + Duration::days(1),
            None,
        );
        token.revoked_at = Some(Utc::now());

        let mut mocks = Mocks::new();
        mocks
            .tokens
            .expect_find_by_hash()
            .returning(move |_| Ok(Some(token.clone())));
        mocks
            .tokens
            .expect_revoke_all_for_user()
            .withf(move |id, _| *id == user_id)
            .times(1)
            .returning(|_, _| Ok(3));
        let auth = mocks.build();

        let result = auth.refresh("stolen", ClientInfo::default()).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_refresh_rotates_token() {
        let user = user_with_password("correct-horse");
        let user_id = user.id;
        let token = RefreshToken::new(
            user_id,
            security::hash_token("valid"),
            Utc::now() + Duration::days(1),
            None,
        );

        let mut mocks = Mocks::new().with_token_issuing();
        mocks
            .tokens
            .expect_find_by_hash()
            .returning(move |_| Ok(Some(token.clone())));
        mocks
            .users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        mocks
            .tokens
            .expect_save()
            .withf(|t| t.revoked_at.is_some() && t.replaced_by.is_some())
            .times(1)
            .returning(|t| Ok(t.clone()));
        let auth = mocks.build();

        let tokens = auth.refresh("valid", ClientInfo::default()).await.unwrap();
        assert_ne!(tokens.refresh_token, "valid");
    }

    #[tokio::test]
    async fn test_change_password_requires_current() {
        let user = user_with_password("correct-horse");
        let mut mocks = Mocks::new();
        mocks
            .users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        let auth = mocks.build();

        let result = auth
            .change_password(Uuid::new_v4(), "not-the-password", "another-pass")
            .await;
        assert_err!(&result);
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn test_verify_token_rejects_foreign_issuer() {
        let auth = Mocks::new().build();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "x@uni.edu".to_string(),
            roles: vec![],
            permissions: vec![],
            iss: "someone-else".to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_admin_claims_bypass_permissions() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "root@uni.edu".to_string(),
            roles: vec![ROLE_ADMIN.to_string()],
            permissions: vec![],
            iss: "university-api".to_string(),
            iat: 0,
            exp: 0,
        };
        assert!(claims.has_permission("grades.write"));
    }
}
