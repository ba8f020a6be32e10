//! Two-factor authentication state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// TOTP enrolment for a user.
///
/// The secret is base32 encoded; backup codes are stored hashed and are
/// removed from the list when consumed.
#[derive(Clone, PartialEq)]
pub struct TwoFactorAuth {
    pub user_id: Uuid,
    pub secret: String,
    pub backup_code_hashes: Vec<String>,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for TwoFactorAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwoFactorAuth")
            .field("user_id", &self.user_id)
            .field("secret", &"[REDACTED]")
            .field("backup_codes", &self.backup_code_hashes.len())
            .field("is_verified", &self.is_verified)
            .finish()
    }
}

impl TwoFactorAuth {
    pub fn new(user_id: Uuid, secret: String, backup_code_hashes: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            secret,
            backup_code_hashes,
            is_verified: false,
            verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mark_verified(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_verified {
            return Err(DomainError::invalid_state("Two-factor authentication already verified"));
        }
        self.is_verified = true;
        self.verified_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Remove a backup code by hash. Returns `false` if it was not present.
    pub fn consume_backup_code(&mut self, code_hash: &str) -> bool {
        match self.backup_code_hashes.iter().position(|h| h == code_hash) {
            Some(index) => {
                self.backup_code_hashes.swap_remove(index);
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn remaining_backup_codes(&self) -> usize {
        self.backup_code_hashes.len()
    }
}

/// Material shown to the user once, when two-factor setup starts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TwoFactorSetup {
    /// Base32 shared secret
    pub secret: String,
    /// `otpauth://` provisioning URI for authenticator apps
    pub otpauth_uri: String,
    /// Single-use recovery codes
    pub backup_codes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_code_consumed_once() {
        let mut tfa =
            TwoFactorAuth::new(Uuid::new_v4(), "SECRET".into(), vec!["a".into(), "b".into()]);
        assert!(tfa.consume_backup_code("a"));
        assert!(!tfa.consume_backup_code("a"));
        assert_eq!(tfa.remaining_backup_codes(), 1);
    }

    #[test]
    fn test_verify_only_once() {
        let mut tfa = TwoFactorAuth::new(Uuid::new_v4(), "SECRET".into(), vec![]);
        let now = Utc::now();
        tfa.mark_verified(now).unwrap();
        assert_eq!(tfa.verified_at, Some(now));
        assert!(tfa.mark_verified(now).is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let tfa = TwoFactorAuth::new(Uuid::new_v4(), "JBSWY3DPEHPK3PXP".into(), vec![]);
        assert!(!format!("{:?}", tfa).contains("JBSWY3DPEHPK3PXP"));
    }
}
