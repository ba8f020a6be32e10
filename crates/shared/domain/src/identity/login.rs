//! Login history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::macros::string_enum;

string_enum! {
    "login failure reason",
    /// Why a login attempt was rejected
    pub enum LoginFailureReason {
        InvalidCredentials => "invalid_credentials",
        AccountLocked => "account_locked",
        AccountInactive => "account_inactive",
        TwoFactorRequired => "two_factor_required",
        InvalidTwoFactorCode => "invalid_two_factor_code",
    }
}

/// One recorded login attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginAttempt {
    pub id: Uuid,
    /// Unknown when the email did not match any account
    pub user_id: Option<Uuid>,
    pub email: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub succeeded: bool,
    pub failure_reason: Option<LoginFailureReason>,
    pub attempted_at: DateTime<Utc>,
}

/// Client details captured with each attempt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl LoginAttempt {
    pub fn succeeded(user_id: Uuid, email: &str, client: &ClientInfo) -> Self {
        Self::build(Some(user_id), email, client, None)
    }

    pub fn failed(
        user_id: Option<Uuid>,
        email: &str,
        client: &ClientInfo,
        reason: LoginFailureReason,
    ) -> Self {
        Self::build(user_id, email, client, Some(reason))
    }

    fn build(
        user_id: Option<Uuid>,
        email: &str,
        client: &ClientInfo,
        failure_reason: Option<LoginFailureReason>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            email: email.trim().to_lowercase(),
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
            succeeded: failure_reason.is_none(),
            failure_reason,
            attempted_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_attempt_records_reason() {
        let client = ClientInfo {
            ip_address: Some("10.0.0.1".into()),
            user_agent: None,
        };
        let attempt =
            LoginAttempt::failed(None, "X@Y.com", &client, LoginFailureReason::AccountLocked);
        assert!(!attempt.succeeded);
        assert_eq!(attempt.email, "x@y.com");
        assert_eq!(attempt.failure_reason, Some(LoginFailureReason::AccountLocked));
    }

    #[test]
    fn test_reason_round_trips_through_text() {
        let reason: LoginFailureReason = "invalid_two_factor_code".parse().unwrap();
        assert_eq!(reason, LoginFailureReason::InvalidTwoFactorCode);
        assert!("nope".parse::<LoginFailureReason>().is_err());
    }
}
