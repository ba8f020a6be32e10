//! Redis cache for user profiles and rate limiting.

use redis::{aio::ConnectionManager, AsyncCommands, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::identity::UserResponse;

/// Cache key prefix for user profiles
const CACHE_PREFIX_USER: &str = "user:";

/// Cache key prefix for rate limiting
const CACHE_PREFIX_RATE_LIMIT: &str = "rate_limit:";

/// Redis cache wrapper.
pub struct Cache {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(url: &str, ttl_seconds: u64) -> Result<Self, RedisError> {
        debug!("Connecting to Redis");
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn, ttl_seconds })
    }

    // =========================================================================
    // Generic Cache Operations
    // =========================================================================

    /// Get a value; undecodable entries count as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.conn.clone();
        let cached: Option<String> = conn.get(key).await?;

        Ok(cached.and_then(|json| match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }))
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("Serialization error: {}", e)))?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, json, self.ttl_seconds).await?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    /// Round trip used by the health check.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: bool = conn.exists("health:ping").await?;
        Ok(())
    }

    // =========================================================================
    // User Profiles
    // =========================================================================

    pub async fn get_user(&self, id: Uuid) -> AppResult<Option<UserResponse>> {
        self.get(&format!("{}{}", CACHE_PREFIX_USER, id)).await
    }

    pub async fn set_user(&self, user: &UserResponse) -> AppResult<()> {
        self.set(&format!("{}{}", CACHE_PREFIX_USER, user.id), user)
            .await
    }

    pub async fn invalidate_user(&self, id: Uuid) -> AppResult<()> {
        self.delete(&format!("{}{}", CACHE_PREFIX_USER, id)).await
    }

    // =========================================================================
    // Rate Limiting
    // =========================================================================

    /// Count a request in the current fixed window.
    /// Returns `(current_count, allowed)`.
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.conn.clone();

        let count: u64 = conn.incr(&key, 1).await?;
        if count == 1 {
            conn.expire::<_, ()>(&key, window_seconds as i64).await?;
        }

        Ok((count, count <= max_requests))
    }
}
