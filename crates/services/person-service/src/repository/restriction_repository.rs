//! Restrictions placed on persons.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::entities::restriction::{self, ActiveModel, Entity as RestrictionEntity};
use common::{AppError, AppResult};
use domain::person::PersonRestriction;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RestrictionRepository: Send + Sync {
    /// Every restriction of a person, newest first. Activity is decided by
    /// the caller against its own clock.
    async fn list_for_person(&self, person_id: Uuid) -> AppResult<Vec<PersonRestriction>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PersonRestriction>>;

    async fn create(&self, restriction: &PersonRestriction) -> AppResult<PersonRestriction>;

    async fn save(&self, restriction: &PersonRestriction) -> AppResult<PersonRestriction>;
}

pub struct RestrictionStore {
    db: DatabaseConnection,
}

impl RestrictionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RestrictionRepository for RestrictionStore {
    async fn list_for_person(&self, person_id: Uuid) -> AppResult<Vec<PersonRestriction>> {
        RestrictionEntity::find()
            .filter(restriction::Column::PersonId.eq(person_id))
            .order_by_desc(restriction::Column::StartsAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?
            .into_iter()
            .map(PersonRestriction::try_from)
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PersonRestriction>> {
        RestrictionEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(PersonRestriction::try_from)
            .transpose()
    }

    async fn create(&self, restriction: &PersonRestriction) -> AppResult<PersonRestriction> {
        let model = ActiveModel::from(restriction).insert(&self.db).await?;
        PersonRestriction::try_from(model)
    }

    async fn save(&self, restriction: &PersonRestriction) -> AppResult<PersonRestriction> {
        let model = ActiveModel::from(restriction).update(&self.db).await?;
        PersonRestriction::try_from(model)
    }
}
