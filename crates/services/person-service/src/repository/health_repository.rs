//! Health records, at most one per person.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use super::entities::health_record::{self, ActiveModel, Entity as HealthRecordEntity};
use common::{AppError, AppResult};
use domain::person::HealthRecord;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait HealthRecordRepository: Send + Sync {
    async fn find_by_person(&self, person_id: Uuid) -> AppResult<Option<HealthRecord>>;

    async fn create(&self, record: &HealthRecord) -> AppResult<HealthRecord>;

    async fn save(&self, record: &HealthRecord) -> AppResult<HealthRecord>;
}

pub struct HealthRecordStore {
    db: DatabaseConnection,
}

impl HealthRecordStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HealthRecordRepository for HealthRecordStore {
    async fn find_by_person(&self, person_id: Uuid) -> AppResult<Option<HealthRecord>> {
        HealthRecordEntity::find()
            .filter(health_record::Column::PersonId.eq(person_id))
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(HealthRecord::try_from)
            .transpose()
    }

    async fn create(&self, record: &HealthRecord) -> AppResult<HealthRecord> {
        let model = ActiveModel::from(record).insert(&self.db).await?;
        HealthRecord::try_from(model)
    }

    async fn save(&self, record: &HealthRecord) -> AppResult<HealthRecord> {
        let model = ActiveModel::from(record).update(&self.db).await?;
        HealthRecord::try_from(model)
    }
}
