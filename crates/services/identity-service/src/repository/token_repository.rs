//! Refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use uuid::Uuid;

use super::entities::refresh_token::{self, ActiveModel, Entity as RefreshTokenEntity};
use common::AppResult;
use domain::identity::RefreshToken;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn create(&self, token: &RefreshToken) -> AppResult<RefreshToken>;

    /// Look a token up by its SHA-256 hash, revoked or not
    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<RefreshToken>>;

    async fn save(&self, token: &RefreshToken) -> AppResult<RefreshToken>;

    /// Revoke every still-active token of a user. Returns the number revoked.
    async fn revoke_all_for_user(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<u64>;
}

pub struct RefreshTokenStore {
    db: DatabaseConnection,
}

impl RefreshTokenStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RefreshTokenRepository for RefreshTokenStore {
    async fn create(&self, token: &RefreshToken) -> AppResult<RefreshToken> {
        let model = ActiveModel::from(token).insert(&self.db).await?;
        Ok(RefreshToken::from(model))
    }

    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<RefreshToken>> {
        let result = RefreshTokenEntity::find()
            .filter(refresh_token::Column::TokenHash.eq(token_hash))
            .one(&self.db)
            .await?;
        Ok(result.map(RefreshToken::from))
    }

    async fn save(&self, token: &RefreshToken) -> AppResult<RefreshToken> {
        let model = ActiveModel::from(token).update(&self.db).await?;
        Ok(RefreshToken::from(model))
    }

    async fn revoke_all_for_user(&self, user_id: Uuid, at: DateTime<Utc>) -> AppResult<u64> {
        let result = RefreshTokenEntity::update_many()
            .col_expr(refresh_token::Column::RevokedAt, Expr::value(Some(at)))
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::RevokedAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
