//! Student profile repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use super::entities::student::{self, ActiveModel, Entity as StudentEntity};
use common::{AppError, AppResult, Page, PaginationParams};
use domain::person::{Student, StudentStatus};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Find active student by ID (excludes soft-deleted)
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Student>>;

    /// The person's student profile, if any (excludes soft-deleted)
    async fn find_by_person(&self, person_id: Uuid) -> AppResult<Option<Student>>;

    /// Student numbers stay reserved after a soft delete
    async fn find_by_number_with_deleted(&self, student_number: &str)
        -> AppResult<Option<Student>>;

    async fn create(&self, student: &Student) -> AppResult<Student>;

    async fn save(&self, student: &Student) -> AppResult<Student>;

    async fn list(
        &self,
        params: PaginationParams,
        status: Option<StudentStatus>,
    ) -> AppResult<Page<Student>>;
}

pub struct StudentStore {
    db: DatabaseConnection,
}

impl StudentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StudentRepository for StudentStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Student>> {
        StudentEntity::find_by_id(id)
            .filter(student::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(Student::try_from)
            .transpose()
    }

    async fn find_by_person(&self, person_id: Uuid) -> AppResult<Option<Student>> {
        StudentEntity::find()
            .filter(student::Column::PersonId.eq(person_id))
            .filter(student::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(Student::try_from)
            .transpose()
    }

    async fn find_by_number_with_deleted(
        &self,
        student_number: &str,
    ) -> AppResult<Option<Student>> {
        StudentEntity::find()
            .filter(student::Column::StudentNumber.eq(student_number.trim().to_uppercase()))
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(Student::try_from)
            .transpose()
    }

    async fn create(&self, student: &Student) -> AppResult<Student> {
        let model = ActiveModel::from(student)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;
        Student::try_from(model)
    }

    async fn save(&self, student: &Student) -> AppResult<Student> {
        let model = ActiveModel::from(student)
            .update(&self.db)
            .await
            .map_err(AppError::from)?;
        Student::try_from(model)
    }

    async fn list(
        &self,
        params: PaginationParams,
        status: Option<StudentStatus>,
    ) -> AppResult<Page<Student>> {
        let mut query = StudentEntity::find()
            .filter(student::Column::DeletedAt.is_null())
            .order_by_asc(student::Column::StudentNumber);
        if let Some(status) = status {
            query = query.filter(student::Column::Status.eq(status.as_str()));
        }

        let paginator = query.paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let students = paginator
            .fetch_page(params.page_index())
            .await?
            .into_iter()
            .map(Student::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page::new(students, total))
    }
}
