//! Application state for dependency injection.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use academic_service_lib::AcademicServices;
use common::{AppResult, Database, RateLimitConfig};
use domain::identity::UserResponse;
use identity_service_lib::IdentityServices;
use person_service_lib::PersonServices;

use crate::middleware::Cache;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityServices,
    pub persons: PersonServices,
    pub academic: AcademicServices,
    pub database: Database,
    /// Redis cache; `None` disables caching and rate limiting
    pub cache: Option<Arc<Cache>>,
    pub rate_limit: RateLimitConfig,
}

impl AppState {
    pub fn new(
        identity: IdentityServices,
        persons: PersonServices,
        academic: AcademicServices,
        database: Database,
        rate_limit: RateLimitConfig,
    ) -> Self {
        Self {
            identity,
            persons,
            academic,
            database,
            cache: None,
            rate_limit,
        }
    }

    /// Attach a connected Redis cache.
    pub fn with_cache(mut self, cache: Arc<Cache>) -> Self {
        self.cache = Some(cache);
        self
    }
}

// =============================================================================
// User profile cache
// =============================================================================

impl AppState {
    /// Profile lookup through the cache when one is configured
    pub async fn load_user(&self, id: Uuid) -> AppResult<UserResponse> {
        if let Some(cache) = &self.cache {
            match cache.get_user(id).await {
                Ok(Some(user)) => return Ok(user.with_current_lockout(Utc::now())),
                Ok(None) => {}
                Err(e) => warn!(user_id = %id, error = %e, "User cache read failed"),
            }
        }

        let user = UserResponse::from(self.identity.users.get_user(id).await?);
        self.remember_user(&user).await;
        Ok(user)
    }

    pub async fn remember_user(&self, user: &UserResponse) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_user(user).await {
                warn!(user_id = %user.id, error = %e, "User cache write failed");
            }
        }
    }

    /// Drop a cached profile after the account changed
    pub async fn forget_user(&self, id: Uuid) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.invalidate_user(id).await {
                warn!(user_id = %id, error = %e, "User cache invalidation failed");
            }
        }
    }

    /// Same as [`AppState::forget_user`] for callers that only know the email
    pub async fn forget_user_by_email(&self, email: &str) {
        if self.cache.is_none() {
            return;
        }
        match self.identity.users.find_user_by_email(email).await {
            Ok(Some(user)) => self.forget_user(user.id).await,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "User lookup for cache invalidation failed"),
        }
    }
}
