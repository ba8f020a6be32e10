//! Grades and grade objections.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use super::entities::{grade, grade_objection};
use common::{AppError, AppResult, Page, PaginationParams};
use domain::academic::{Grade, GradeObjection, ObjectionStatus};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Optional filters for listing grades
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GradeFilter {
    pub student_id: Option<Uuid>,
    pub exam_id: Option<Uuid>,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait GradeRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Grade>>;

    async fn find_for(&self, exam_id: Uuid, student_id: Uuid) -> AppResult<Option<Grade>>;

    async fn list(&self, filter: GradeFilter) -> AppResult<Vec<Grade>>;

    async fn count_for_exam(&self, exam_id: Uuid) -> AppResult<u64>;

    async fn create(&self, grade: &Grade) -> AppResult<Grade>;

    async fn save(&self, grade: &Grade) -> AppResult<Grade>;
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ObjectionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<GradeObjection>>;

    async fn find_pending_for_grade(&self, grade_id: Uuid) -> AppResult<Option<GradeObjection>>;

    /// Newest first, optionally by status
    async fn list(
        &self,
        status: Option<ObjectionStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<GradeObjection>>;

    async fn create(&self, objection: &GradeObjection) -> AppResult<GradeObjection>;

    async fn save(&self, objection: &GradeObjection) -> AppResult<GradeObjection>;

    /// Persist a resolved objection together with the grade it revised
    async fn save_with_grade(
        &self,
        objection: &GradeObjection,
        grade: &Grade,
    ) -> AppResult<(GradeObjection, Grade)>;
}

// =============================================================================
// Grades
// =============================================================================

pub struct GradeStore {
    db: DatabaseConnection,
}

impl GradeStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GradeRepository for GradeStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Grade>> {
        let result = grade::Entity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Grade::from))
    }

    async fn find_for(&self, exam_id: Uuid, student_id: Uuid) -> AppResult<Option<Grade>> {
        let result = grade::Entity::find()
            .filter(grade::Column::ExamId.eq(exam_id))
            .filter(grade::Column::StudentId.eq(student_id))
            .one(&self.db)
            .await?;
        Ok(result.map(Grade::from))
    }

    async fn list(&self, filter: GradeFilter) -> AppResult<Vec<Grade>> {
        let mut query = grade::Entity::find().order_by_desc(grade::Column::GradedAt);
        if let Some(student_id) = filter.student_id {
            query = query.filter(grade::Column::StudentId.eq(student_id));
        }
        if let Some(exam_id) = filter.exam_id {
            query = query.filter(grade::Column::ExamId.eq(exam_id));
        }
        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(Grade::from).collect())
    }

    async fn count_for_exam(&self, exam_id: Uuid) -> AppResult<u64> {
        let count = grade::Entity::find()
            .filter(grade::Column::ExamId.eq(exam_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn create(&self, grade: &Grade) -> AppResult<Grade> {
        let model = grade::ActiveModel::from(grade)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(Grade::from(model))
    }

    async fn save(&self, grade: &Grade) -> AppResult<Grade> {
        let model = grade::ActiveModel::from(grade)
            .update(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(Grade::from(model))
    }
}

// =============================================================================
// Objections
// =============================================================================

pub struct ObjectionStore {
    db: DatabaseConnection,
}

impl ObjectionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ObjectionRepository for ObjectionStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<GradeObjection>> {
        grade_objection::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(GradeObjection::try_from)
            .transpose()
    }

    async fn find_pending_for_grade(&self, grade_id: Uuid) -> AppResult<Option<GradeObjection>> {
        grade_objection::Entity::find()
            .filter(grade_objection::Column::GradeId.eq(grade_id))
            .filter(grade_objection::Column::Status.eq(ObjectionStatus::Pending.as_str()))
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(GradeObjection::try_from)
            .transpose()
    }

    async fn list(
        &self,
        status: Option<ObjectionStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<GradeObjection>> {
        let mut query =
            grade_objection::Entity::find().order_by_desc(grade_objection::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(grade_objection::Column::Status.eq(status.as_str()));
        }

        let paginator = query.paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let objections = paginator
            .fetch_page(params.page_index())
            .await?
            .into_iter()
            .map(GradeObjection::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page::new(objections, total))
    }

    async fn create(&self, objection: &GradeObjection) -> AppResult<GradeObjection> {
        let model = grade_objection::ActiveModel::from(objection)
            .insert(&self.db)
            .await?;
        GradeObjection::try_from(model)
    }

    async fn save(&self, objection: &GradeObjection) -> AppResult<GradeObjection> {
        let model = grade_objection::ActiveModel::from(objection)
            .update(&self.db)
            .await?;
        GradeObjection::try_from(model)
    }

    async fn save_with_grade(
        &self,
        objection: &GradeObjection,
        grade: &Grade,
    ) -> AppResult<(GradeObjection, Grade)> {
        let txn = self.db.begin().await?;
        let grade = grade::ActiveModel::from(grade).update(&txn).await?;
        let objection = grade_objection::ActiveModel::from(objection)
            .update(&txn)
            .await?;
        txn.commit().await?;
        Ok((GradeObjection::try_from(objection)?, Grade::from(grade)))
    }
}
