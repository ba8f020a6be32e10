//! Refresh tokens and the token pair returned on login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Persisted refresh token. Only the SHA-256 hash of the opaque value is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub created_by_ip: Option<String>,
    pub revoked_at: Option<DateTime<Utc>>,
    /// Token issued when this one was rotated
    pub replaced_by: Option<Uuid>,
}

impl RefreshToken {
    pub fn new(
        user_id: Uuid,
        token_hash: String,
        expires_at: DateTime<Utc>,
        created_by_ip: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            expires_at,
            created_at: Utc::now(),
            created_by_ip,
            revoked_at: None,
            replaced_by: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && !self.is_expired(now)
    }

    pub fn revoke(&mut self, now: DateTime<Utc>, replaced_by: Option<Uuid>) -> DomainResult<()> {
        if self.is_revoked() {
            return Err(DomainError::invalid_state("Token already revoked"));
        }
        self.revoked_at = Some(now);
        self.replaced_by = replaced_by;
        Ok(())
    }
}

/// Token pair returned after successful authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenResponse {
    /// JWT access token
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    /// Opaque refresh token (shown once)
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_token_lifecycle() {
        let now = Utc::now();
        let mut token =
            RefreshToken::new(Uuid::new_v4(), "h".into(), now + Duration::days(1), None);
        assert!(token.is_active(now));
        assert!(!token.is_active(now + Duration::days(2)));

        let successor = Uuid::new_v4();
        token.revoke(now, Some(successor)).unwrap();
        assert!(!token.is_active(now));
        assert_eq!(token.replaced_by, Some(successor));
        assert!(token.revoke(now, None).is_err());
    }
}
