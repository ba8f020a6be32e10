//! Two-factor enrolment persistence.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait};
use uuid::Uuid;

use super::entities::two_factor::{ActiveModel, Entity as TwoFactorEntity};
use common::AppResult;
use domain::identity::TwoFactorAuth;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TwoFactorRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<TwoFactorAuth>>;

    /// Insert or replace the enrolment of `auth.user_id`
    async fn upsert(&self, auth: &TwoFactorAuth) -> AppResult<TwoFactorAuth>;

    async fn delete(&self, user_id: Uuid) -> AppResult<()>;
}

pub struct TwoFactorStore {
    db: DatabaseConnection,
}

impl TwoFactorStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TwoFactorRepository for TwoFactorStore {
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<TwoFactorAuth>> {
        TwoFactorEntity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .map(TwoFactorAuth::try_from)
            .transpose()
    }

    async fn upsert(&self, auth: &TwoFactorAuth) -> AppResult<TwoFactorAuth> {
        let exists = TwoFactorEntity::find_by_id(auth.user_id)
            .one(&self.db)
            .await?
            .is_some();

        let active = ActiveModel::from(auth);
        let model = if exists {
            active.update(&self.db).await?
        } else {
            active.insert(&self.db).await?
        };
        TwoFactorAuth::try_from(model)
    }

    async fn delete(&self, user_id: Uuid) -> AppResult<()> {
        TwoFactorEntity::delete_by_id(user_id).exec(&self.db).await?;
        Ok(())
    }
}
