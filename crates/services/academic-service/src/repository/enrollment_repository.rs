//! Enrollments and course waiting lists.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use super::entities::{enrollment, waiting_list_entry};
use common::{AppError, AppResult, Page, PaginationParams};
use domain::academic::{Enrollment, EnrollmentStatus, WaitingListEntry};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Optional filters for listing enrollments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrollmentFilter {
    pub student_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub status: Option<EnrollmentStatus>,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Enrollment>>;

    /// The student's `enrolled` enrollment in the course, if any
    async fn find_current(&self, student_id: Uuid, course_id: Uuid)
        -> AppResult<Option<Enrollment>>;

    /// The student's enrolled or completed enrollment in the course
    async fn find_gradable(&self, student_id: Uuid, course_id: Uuid)
        -> AppResult<Option<Enrollment>>;

    /// Seats taken in a course
    async fn count_enrolled(&self, course_id: Uuid) -> AppResult<u64>;

    /// Insert an enrollment, removing the given waiting-list entry in the
    /// same transaction
    async fn create(&self, enrollment: &Enrollment, dequeue: Option<Uuid>)
        -> AppResult<Enrollment>;

    async fn save(&self, enrollment: &Enrollment) -> AppResult<Enrollment>;

    /// Newest first
    async fn list(&self, filter: EnrollmentFilter, params: PaginationParams)
        -> AppResult<Page<Enrollment>>;

    /// Every enrolled or completed enrollment of a student
    async fn list_gradable_for_student(&self, student_id: Uuid) -> AppResult<Vec<Enrollment>>;
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait WaitingListRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<WaitingListEntry>>;

    async fn find_entry(&self, course_id: Uuid, student_id: Uuid)
        -> AppResult<Option<WaitingListEntry>>;

    /// Highest position currently used in a course's queue
    async fn max_position(&self, course_id: Uuid) -> AppResult<Option<i32>>;

    async fn count(&self, course_id: Uuid) -> AppResult<u64>;

    /// Entries of a course ordered by position
    async fn list(&self, course_id: Uuid) -> AppResult<Vec<WaitingListEntry>>;

    async fn create(&self, entry: &WaitingListEntry) -> AppResult<WaitingListEntry>;

    /// Returns `false` when no such entry existed
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

// =============================================================================
// Enrollments
// =============================================================================

pub struct EnrollmentStore {
    db: DatabaseConnection,
}

impl EnrollmentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EnrollmentRepository for EnrollmentStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Enrollment>> {
        enrollment::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(Enrollment::try_from)
            .transpose()
    }

    async fn find_current(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<Enrollment>> {
        enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::CourseId.eq(course_id))
            .filter(enrollment::Column::Status.eq(EnrollmentStatus::Enrolled.as_str()))
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(Enrollment::try_from)
            .transpose()
    }

    async fn find_gradable(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<Enrollment>> {
        enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::CourseId.eq(course_id))
            .filter(enrollment::Column::Status.ne(EnrollmentStatus::Dropped.as_str()))
            .order_by_desc(enrollment::Column::EnrolledAt)
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .map(Enrollment::try_from)
            .transpose()
    }

    async fn count_enrolled(&self, course_id: Uuid) -> AppResult<u64> {
        let count = enrollment::Entity::find()
            .filter(enrollment::Column::CourseId.eq(course_id))
            .filter(enrollment::Column::Status.eq(EnrollmentStatus::Enrolled.as_str()))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn create(
        &self,
        enrollment: &Enrollment,
        dequeue: Option<Uuid>,
    ) -> AppResult<Enrollment> {
        let txn = self.db.begin().await?;
        if let Some(entry_id) = dequeue {
            waiting_list_entry::Entity::delete_by_id(entry_id)
                .exec(&txn)
                .await?;
        }
        let model = enrollment::ActiveModel::from(enrollment).insert(&txn).await?;
        txn.commit().await?;
        Enrollment::try_from(model)
    }

    async fn save(&self, enrollment: &Enrollment) -> AppResult<Enrollment> {
        let model = enrollment::ActiveModel::from(enrollment)
            .update(&self.db)
            .await?;
        Enrollment::try_from(model)
    }

    async fn list(
        &self,
        filter: EnrollmentFilter,
        params: PaginationParams,
    ) -> AppResult<Page<Enrollment>> {
        let mut query =
            enrollment::Entity::find().order_by_desc(enrollment::Column::EnrolledAt);
        if let Some(student_id) = filter.student_id {
            query = query.filter(enrollment::Column::StudentId.eq(student_id));
        }
        if let Some(course_id) = filter.course_id {
            query = query.filter(enrollment::Column::CourseId.eq(course_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(enrollment::Column::Status.eq(status.as_str()));
        }

        let paginator = query.paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let enrollments = paginator
            .fetch_page(params.page_index())
            .await?
            .into_iter()
            .map(Enrollment::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page::new(enrollments, total))
    }

    async fn list_gradable_for_student(&self, student_id: Uuid) -> AppResult<Vec<Enrollment>> {
        enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::Status.ne(EnrollmentStatus::Dropped.as_str()))
            .order_by_asc(enrollment::Column::EnrolledAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?
            .into_iter()
            .map(Enrollment::try_from)
            .collect()
    }
}

// =============================================================================
// Waiting list
// =============================================================================

pub struct WaitingListStore {
    db: DatabaseConnection,
}

impl WaitingListStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WaitingListRepository for WaitingListStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<WaitingListEntry>> {
        let entry = waiting_list_entry::Entity::find_by_id(id)
            .one(&self.db)
            .await?;
        Ok(entry.map(WaitingListEntry::from))
    }

    async fn find_entry(
        &self,
        course_id: Uuid,
        student_id: Uuid,
    ) -> AppResult<Option<WaitingListEntry>> {
        let entry = waiting_list_entry::Entity::find()
            .filter(waiting_list_entry::Column::CourseId.eq(course_id))
            .filter(waiting_list_entry::Column::StudentId.eq(student_id))
            .one(&self.db)
            .await?;
        Ok(entry.map(WaitingListEntry::from))
    }

    async fn max_position(&self, course_id: Uuid) -> AppResult<Option<i32>> {
        let max = waiting_list_entry::Entity::find()
            .select_only()
            .column_as(waiting_list_entry::Column::Position.max(), "max_position")
            .filter(waiting_list_entry::Column::CourseId.eq(course_id))
            .into_tuple::<Option<i32>>()
            .one(&self.db)
            .await?;
        Ok(max.flatten())
    }

    async fn count(&self, course_id: Uuid) -> AppResult<u64> {
        let count = waiting_list_entry::Entity::find()
            .filter(waiting_list_entry::Column::CourseId.eq(course_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn list(&self, course_id: Uuid) -> AppResult<Vec<WaitingListEntry>> {
        let entries = waiting_list_entry::Entity::find()
            .filter(waiting_list_entry::Column::CourseId.eq(course_id))
            .order_by_asc(waiting_list_entry::Column::Position)
            .all(&self.db)
            .await?;
        Ok(entries.into_iter().map(WaitingListEntry::from).collect())
    }

    async fn create(&self, entry: &WaitingListEntry) -> AppResult<WaitingListEntry> {
        let model = waiting_list_entry::ActiveModel::from(entry)
            .insert(&self.db)
            .await?;
        Ok(WaitingListEntry::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = waiting_list_entry::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
