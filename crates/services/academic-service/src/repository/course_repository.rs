//! Course repository with soft delete support.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use super::entities::course::{self, ActiveModel, Entity as CourseEntity};
use common::{AppError, AppResult, Page, PaginationParams};
use domain::academic::Course;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Course repository trait.
///
/// Lookups exclude soft-deleted courses unless stated otherwise.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>>;

    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<Course>>;

    /// Course codes stay reserved after a soft delete
    async fn find_by_code_with_deleted(&self, code: &str) -> AppResult<Option<Course>>;

    /// Courses by id, soft-deleted included
    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<Course>>;

    async fn create(&self, course: &Course) -> AppResult<Course>;

    async fn save(&self, course: &Course) -> AppResult<Course>;

    /// List courses ordered by code, optionally for one semester
    async fn list(&self, params: PaginationParams, semester: Option<String>)
        -> AppResult<Page<Course>>;
}

pub struct CourseStore {
    db: DatabaseConnection,
}

impl CourseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseRepository for CourseStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>> {
        let result = CourseEntity::find_by_id(id)
            .filter(course::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Course::from))
    }

    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<Course>> {
        let result = CourseEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Course::from))
    }

    async fn find_by_code_with_deleted(&self, code: &str) -> AppResult<Option<Course>> {
        let result = CourseEntity::find()
            .filter(course::Column::Code.eq(code.trim().to_uppercase()))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Course::from))
    }

    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<Course>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = CourseEntity::find()
            .filter(course::Column::Id.is_in(ids))
            .order_by_asc(course::Column::Code)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Course::from).collect())
    }

    async fn create(&self, course: &Course) -> AppResult<Course> {
        let model = ActiveModel::from(course)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(Course::from(model))
    }

    async fn save(&self, course: &Course) -> AppResult<Course> {
        let model = ActiveModel::from(course)
            .update(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(Course::from(model))
    }

    async fn list(
        &self,
        params: PaginationParams,
        semester: Option<String>,
    ) -> AppResult<Page<Course>> {
        let mut query = CourseEntity::find()
            .filter(course::Column::DeletedAt.is_null())
            .order_by_asc(course::Column::Code);
        if let Some(semester) = semester {
            query = query.filter(course::Column::Semester.eq(semester.trim().to_uppercase()));
        }

        let paginator = query.paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page_index()).await?;

        Ok(Page::new(models.into_iter().map(Course::from).collect(), total))
    }
}
