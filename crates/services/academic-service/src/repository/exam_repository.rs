//! Exam repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::entities::exam::{self, ActiveModel, Entity as ExamEntity};
use common::{AppError, AppResult};
use domain::academic::Exam;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ExamRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Exam>>;

    /// Exams of a course in schedule order
    async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<Exam>>;

    async fn list_for_courses(&self, course_ids: Vec<Uuid>) -> AppResult<Vec<Exam>>;

    async fn create(&self, exam: &Exam) -> AppResult<Exam>;

    async fn save(&self, exam: &Exam) -> AppResult<Exam>;

    /// Returns `false` when no such exam existed
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

pub struct ExamStore {
    db: DatabaseConnection,
}

impl ExamStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ExamRepository for ExamStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Exam>> {
        ExamEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(Exam::try_from)
            .transpose()
    }

    async fn list_for_course(&self, course_id: Uuid) -> AppResult<Vec<Exam>> {
        self.list_for_courses(vec![course_id]).await
    }

    async fn list_for_courses(&self, course_ids: Vec<Uuid>) -> AppResult<Vec<Exam>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }
        ExamEntity::find()
            .filter(exam::Column::CourseId.is_in(course_ids))
            .order_by_asc(exam::Column::ScheduledAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?
            .into_iter()
            .map(Exam::try_from)
            .collect()
    }

    async fn create(&self, exam: &Exam) -> AppResult<Exam> {
        let model = ActiveModel::from(exam).insert(&self.db).await?;
        Exam::try_from(model)
    }

    async fn save(&self, exam: &Exam) -> AppResult<Exam> {
        let model = ActiveModel::from(exam).update(&self.db).await?;
        Exam::try_from(model)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = ExamEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
