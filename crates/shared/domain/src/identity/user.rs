//! User aggregate with lockout and two-factor state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{LOCKOUT_DURATION_MINUTES, MAX_FAILED_LOGIN_ATTEMPTS};
use crate::error::{DomainError, DomainResult};
use crate::validation::{normalize_email, required_text, validate_username};

/// Failed-login policy applied by [`User::record_failed_login`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_failed_attempts: i32,
    pub duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: MAX_FAILED_LOGIN_ATTEMPTS,
            duration: Duration::minutes(LOCKOUT_DURATION_MINUTES),
        }
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub email_confirmed: bool,
    pub failed_login_attempts: i32,
    pub lockout_end: Option<DateTime<Utc>>,
    pub two_factor_enabled: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp (None = active, Some = deleted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new, active user. Email is normalized to lowercase.
    pub fn new(
        email: &str,
        username: &str,
        password_hash: String,
        first_name: &str,
        last_name: &str,
    ) -> DomainResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            email: normalize_email(email)?,
            username: validate_username(username)?,
            password_hash,
            first_name: required_text("First name", first_name)?,
            last_name: required_text("Last name", last_name)?,
            is_active: true,
            email_confirmed: false,
            failed_login_attempts: 0,
            lockout_end: None,
            two_factor_enabled: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Check if user is soft deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether a lockout is in effect at `now`
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lockout_end.is_some_and(|end| end > now)
    }

    /// Check that the account may attempt a login at `now`.
    pub fn ensure_can_login(&self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_deleted() || !self.is_active {
            return Err(DomainError::InvalidCredentials);
        }
        if self.is_locked(now) {
            return Err(DomainError::AccountLocked);
        }
        Ok(())
    }

    /// Count a failed login. Returns `true` when this failure locked the account.
    ///
    /// The counter resets once the lockout is applied, so the next lockout
    /// again needs `max_failed_attempts` consecutive failures.
    pub fn record_failed_login(&mut self, now: DateTime<Utc>, policy: LockoutPolicy) -> bool {
        self.failed_login_attempts += 1;
        self.updated_at = now;

        if self.failed_login_attempts >= policy.max_failed_attempts {
            self.lockout_end = Some(now + policy.duration);
            self.failed_login_attempts = 0;
            return true;
        }
        false
    }

    /// Reset failure tracking after a successful login.
    pub fn record_successful_login(&mut self, now: DateTime<Utc>) {
        self.failed_login_attempts = 0;
        self.lockout_end = None;
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Administratively lock the account until `until`.
    pub fn lock_until(&mut self, until: DateTime<Utc>, now: DateTime<Utc>) -> DomainResult<()> {
        if until <= now {
            return Err(DomainError::validation("Lockout end must be in the future"));
        }
        self.lockout_end = Some(until);
        self.updated_at = now;
        Ok(())
    }

    pub fn unlock(&mut self, now: DateTime<Utc>) {
        self.lockout_end = None;
        self.failed_login_attempts = 0;
        self.updated_at = now;
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    pub fn change_password(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }

    /// Apply a partial profile update.
    pub fn update_profile(
        &mut self,
        first_name: Option<&str>,
        last_name: Option<&str>,
        username: Option<&str>,
    ) -> DomainResult<()> {
        if let Some(first_name) = first_name {
            self.first_name = required_text("First name", first_name)?;
        }
        if let Some(last_name) = last_name {
            self.last_name = required_text("Last name", last_name)?;
        }
        if let Some(username) = username {
            self.username = validate_username(username)?;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn enable_two_factor(&mut self) {
        self.two_factor_enabled = true;
        self.updated_at = Utc::now();
    }

    pub fn disable_two_factor(&mut self) {
        self.two_factor_enabled = false;
        self.updated_at = Utc::now();
    }

    /// Soft delete the user
    pub fn soft_delete(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Restore a soft-deleted user
    pub fn restore(&mut self) -> DomainResult<()> {
        if !self.is_deleted() {
            return Err(DomainError::invalid_state("User is not deleted"));
        }
        self.deleted_at = None;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    /// Unique user identifier
    pub id: Uuid,
    /// User email address
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub email_confirmed: bool,
    pub two_factor_enabled: bool,
    /// End of the current lockout, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Soft delete timestamp (if deleted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_active: user.is_active,
            email_confirmed: user.email_confirmed,
            two_factor_enabled: user.two_factor_enabled,
            locked_until: user.lockout_end.filter(|end| *end > Utc::now()),
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            deleted_at: user.deleted_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse::from(&user)
    }
}

impl UserResponse {
    /// Clear a lockout that has ended since this response was built
    pub fn with_current_lockout(mut self, now: DateTime<Utc>) -> Self {
        self.locked_until = self.locked_until.filter(|end| *end > now);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("Ada@Uni.edu", "ada", "hash".to_string(), "Ada", "Lovelace").unwrap()
    }

    #[test]
    fn test_new_user_normalizes_email() {
        let user = user();
        assert_eq!(user.email, "ada@uni.edu");
        assert!(user.is_active);
        assert_eq!(user.failed_login_attempts, 0);
    }

    #[test]
    fn test_new_user_rejects_blank_name() {
        let result = User::new("a@b.co", "ada", "hash".to_string(), " ", "Lovelace");
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_fifth_failure_locks_account() {
        let mut user = user();
        let now = Utc::now();
        let policy = LockoutPolicy::default();

        for _ in 0..4 {
            assert!(!user.record_failed_login(now, policy));
        }
        assert_eq!(user.failed_login_attempts, 4);
        assert!(!user.is_locked(now));

        assert!(user.record_failed_login(now, policy));
        assert!(user.is_locked(now));
        assert_eq!(user.lockout_end, Some(now + Duration::minutes(15)));
        assert_eq!(user.failed_login_attempts, 0);
    }

    #[test]
    fn test_lockout_expires() {
        let mut user = user();
        let now = Utc::now();
        user.lock_until(now + Duration::minutes(1), now).unwrap();

        assert!(user.is_locked(now));
        assert!(!user.is_locked(now + Duration::minutes(2)));
        assert_eq!(user.ensure_can_login(now), Err(DomainError::AccountLocked));
        assert!(user.ensure_can_login(now + Duration::minutes(2)).is_ok());
    }

    #[test]
    fn test_successful_login_resets_counter() {
        let mut user = user();
        let now = Utc::now();
        user.record_failed_login(now, LockoutPolicy::default());
        user.record_successful_login(now);

        assert_eq!(user.failed_login_attempts, 0);
        assert_eq!(user.last_login_at, Some(now));
    }

    #[test]
    fn test_inactive_user_cannot_login() {
        let mut user = user();
        user.deactivate();
        assert_eq!(
            user.ensure_can_login(Utc::now()),
            Err(DomainError::InvalidCredentials)
        );
    }

    #[test]
    fn test_restore_requires_deleted() {
        let mut user = user();
        assert!(user.restore().is_err());
        user.soft_delete();
        assert!(user.is_deleted());
        assert!(user.restore().is_ok());
        assert!(!user.is_deleted());
    }

    #[test]
    fn test_response_hides_password_hash() {
        let json = serde_json::to_value(UserResponse::from(user())).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "ada");
    }

    #[test]
    fn test_cached_response_drops_ended_lockout() {
        let mut user = user();
        let end = Utc::now() + Duration::minutes(5);
        user.lock_until(end, Utc::now()).unwrap();
        let response = UserResponse::from(&user);
        assert_eq!(response.locked_until, Some(end));

        let still_locked = response.clone().with_current_lockout(end - Duration::minutes(1));
        assert_eq!(still_locked.locked_until, Some(end));

        let expired = response.with_current_lockout(end + Duration::seconds(1));
        assert!(expired.locked_until.is_none());
    }
}
