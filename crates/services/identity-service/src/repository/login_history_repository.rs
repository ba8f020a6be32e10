//! Login history persistence.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use super::entities::login_attempt::{self, ActiveModel, Entity as LoginAttemptEntity};
use common::{AppResult, Page, PaginationParams};
use domain::identity::LoginAttempt;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait LoginHistoryRepository: Send + Sync {
    async fn record(&self, attempt: &LoginAttempt) -> AppResult<()>;

    /// Attempts of a user, most recent first
    async fn list_for_user(
        &self,
        user_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<Page<LoginAttempt>>;
}

pub struct LoginHistoryStore {
    db: DatabaseConnection,
}

impl LoginHistoryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LoginHistoryRepository for LoginHistoryStore {
    async fn record(&self, attempt: &LoginAttempt) -> AppResult<()> {
        ActiveModel::from(attempt).insert(&self.db).await?;
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<Page<LoginAttempt>> {
        let paginator = LoginAttemptEntity::find()
            .filter(login_attempt::Column::UserId.eq(user_id))
            .order_by_desc(login_attempt::Column::AttemptedAt)
            .paginate(&self.db, params.limit());

        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(params.page_index())
            .await?
            .into_iter()
            .map(LoginAttempt::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, total))
    }
}
