//! Staff profile repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use super::entities::staff::{self, ActiveModel, Entity as StaffEntity};
use common::{AppError, AppResult, Page, PaginationParams};
use domain::person::Staff;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StaffRepository: Send + Sync {
    /// Find staff member by ID (excludes soft-deleted)
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Staff>>;

    async fn find_by_person(&self, person_id: Uuid) -> AppResult<Option<Staff>>;

    async fn find_by_number_with_deleted(&self, employee_number: &str)
        -> AppResult<Option<Staff>>;

    async fn create(&self, staff: &Staff) -> AppResult<Staff>;

    async fn save(&self, staff: &Staff) -> AppResult<Staff>;

    /// List staff, optionally filtered by exact department name
    async fn list(&self, params: PaginationParams, department: Option<String>)
        -> AppResult<Page<Staff>>;
}

pub struct StaffStore {
    db: DatabaseConnection,
}

impl StaffStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StaffRepository for StaffStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Staff>> {
        StaffEntity::find_by_id(id)
            .filter(staff::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(Staff::try_from)
            .transpose()
    }

    async fn find_by_person(&self, person_id: Uuid) -> AppResult<Option<Staff>> {
        StaffEntity::find()
            .filter(staff::Column::PersonId.eq(person_id))
            .filter(staff::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(Staff::try_from)
            .transpose()
    }

    async fn find_by_number_with_deleted(
        &self,
        employee_number: &str,
    ) -> AppResult<Option<Staff>> {
        StaffEntity::find()
            .filter(staff::Column::EmployeeNumber.eq(employee_number.trim().to_uppercase()))
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(Staff::try_from)
            .transpose()
    }

    async fn create(&self, staff: &Staff) -> AppResult<Staff> {
        let model = ActiveModel::from(staff)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;
        Staff::try_from(model)
    }

    async fn save(&self, staff: &Staff) -> AppResult<Staff> {
        let model = ActiveModel::from(staff)
            .update(&self.db)
            .await
            .map_err(AppError::from)?;
        Staff::try_from(model)
    }

    async fn list(
        &self,
        params: PaginationParams,
        department: Option<String>,
    ) -> AppResult<Page<Staff>> {
        let mut query = StaffEntity::find()
            .filter(staff::Column::DeletedAt.is_null())
            .order_by_asc(staff::Column::EmployeeNumber);
        if let Some(department) = department.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())
        {
            query = query.filter(staff::Column::Department.eq(department));
        }

        let paginator = query.paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let staff = paginator
            .fetch_page(params.page_index())
            .await?
            .into_iter()
            .map(Staff::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page::new(staff, total))
    }
}
