//! Enrollment service - seats, drops, completions and waiting lists.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt, Page, PaginationParams};
use domain::academic::{Course, Enrollment, WaitingListEntry};

use crate::clients::PersonDirectory;
use crate::repository::{AcademicRepositories, EnrollmentFilter};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EnrollmentService: Send + Sync {
    /// Enroll an eligible student into an open course with a free seat.
    /// A waiting-list entry for the same course is consumed.
    async fn enroll(&self, student_id: Uuid, course_id: Uuid) -> AppResult<Enrollment>;

    async fn drop_enrollment(&self, id: Uuid) -> AppResult<Enrollment>;

    async fn complete_enrollment(&self, id: Uuid) -> AppResult<Enrollment>;

    async fn get_enrollment(&self, id: Uuid) -> AppResult<Enrollment>;

    async fn list_enrollments(
        &self,
        filter: EnrollmentFilter,
        params: PaginationParams,
    ) -> AppResult<Page<Enrollment>>;

    /// Queue for a full course; the new entry goes after the highest position
    async fn join_waiting_list(&self, student_id: Uuid, course_id: Uuid)
        -> AppResult<WaitingListEntry>;

    async fn leave_waiting_list(&self, entry_id: Uuid) -> AppResult<()>;

    /// Entries of a course ordered by position
    async fn waiting_list(&self, course_id: Uuid) -> AppResult<Vec<WaitingListEntry>>;

    /// Enroll the lowest-position eligible entry when a seat is free.
    /// Returns `None` when nobody on the list can be enrolled.
    async fn promote_from_waiting_list(&self, course_id: Uuid) -> AppResult<Option<Enrollment>>;
}

pub struct EnrollmentManager {
    repos: AcademicRepositories,
    people: Arc<dyn PersonDirectory>,
}

impl EnrollmentManager {
    pub fn new(repos: AcademicRepositories, people: Arc<dyn PersonDirectory>) -> Self {
        Self { repos, people }
    }

    async fn load(&self, id: Uuid) -> AppResult<Enrollment> {
        self.repos
            .enrollments
            .find_by_id(id)
            .await?
            .ok_or_not_found("Enrollment")
    }

    async fn open_course(&self, course_id: Uuid) -> AppResult<Course> {
        let course = self
            .repos
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or_not_found("Course")?;
        if !course.is_open() {
            return Err(AppError::bad_request("Course is not open for enrollment"));
        }
        Ok(course)
    }

    async fn ensure_eligible(&self, student_id: Uuid) -> AppResult<()> {
        let eligibility = self.people.student_eligibility(student_id).await?;
        match eligibility.reason() {
            Some(reason) => Err(AppError::bad_request(reason)),
            None => Ok(()),
        }
    }

    async fn has_free_seat(&self, course: &Course) -> AppResult<bool> {
        let enrolled = self.repos.enrollments.count_enrolled(course.id).await?;
        Ok(enrolled < course.capacity.max(0) as u64)
    }
}

#[async_trait]
impl EnrollmentService for EnrollmentManager {
    async fn enroll(&self, student_id: Uuid, course_id: Uuid) -> AppResult<Enrollment> {
        self.ensure_eligible(student_id).await?;
        let course = self.open_course(course_id).await?;

        if self
            .repos
            .enrollments
            .find_current(student_id, course_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict_msg("Student is already enrolled in this course"));
        }
        if !self.has_free_seat(&course).await? {
            return Err(AppError::conflict_msg(
                "Course is full; join the waiting list instead",
            ));
        }

        let dequeue = self
            .repos
            .waiting_list
            .find_entry(course_id, student_id)
            .await?
            .map(|entry| entry.id);
        let enrollment = Enrollment::new(student_id, course_id, Utc::now());
        let enrollment = self.repos.enrollments.create(&enrollment, dequeue).await?;
        info!(
            enrollment_id = %enrollment.id,
            student_id = %student_id,
            course_id = %course_id,
            "Student enrolled"
        );
        Ok(enrollment)
    }

    async fn drop_enrollment(&self, id: Uuid) -> AppResult<Enrollment> {
        let mut enrollment = self.load(id).await?;
        enrollment.drop_course(Utc::now())?;
        let enrollment = self.repos.enrollments.save(&enrollment).await?;
        info!(enrollment_id = %id, course_id = %enrollment.course_id, "Enrollment dropped");
        Ok(enrollment)
    }

    async fn complete_enrollment(&self, id: Uuid) -> AppResult<Enrollment> {
        let mut enrollment = self.load(id).await?;
        enrollment.complete(Utc::now())?;
        self.repos.enrollments.save(&enrollment).await
    }

    async fn get_enrollment(&self, id: Uuid) -> AppResult<Enrollment> {
        self.load(id).await
    }

    async fn list_enrollments(
        &self,
        filter: EnrollmentFilter,
        params: PaginationParams,
    ) -> AppResult<Page<Enrollment>> {
        self.repos.enrollments.list(filter, params).await
    }

    async fn join_waiting_list(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<WaitingListEntry> {
        self.ensure_eligible(student_id).await?;
        let course = self.open_course(course_id).await?;

        if self.has_free_seat(&course).await? {
            return Err(AppError::bad_request(
                "Course has free seats; enroll directly",
            ));
        }
        if self
            .repos
            .enrollments
            .find_current(student_id, course_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict_msg("Student is already enrolled in this course"));
        }
        if self
            .repos
            .waiting_list
            .find_entry(course_id, student_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict_msg("Student is already on the waiting list"));
        }

        let max_position = self.repos.waiting_list.max_position(course_id).await?;
        let entry = WaitingListEntry::new(course_id, student_id, max_position);
        let entry = self.repos.waiting_list.create(&entry).await?;
        info!(
            student_id = %student_id,
            course_id = %course_id,
            position = entry.position,
            "Joined waiting list"
        );
        Ok(entry)
    }

    async fn leave_waiting_list(&self, entry_id: Uuid) -> AppResult<()> {
        if !self.repos.waiting_list.delete(entry_id).await? {
            return Err(AppError::not_found("Waiting list entry"));
        }
        Ok(())
    }

    async fn waiting_list(&self, course_id: Uuid) -> AppResult<Vec<WaitingListEntry>> {
        self.repos
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or_not_found("Course")?;
        self.repos.waiting_list.list(course_id).await
    }

    async fn promote_from_waiting_list(&self, course_id: Uuid) -> AppResult<Option<Enrollment>> {
        let course = self.open_course(course_id).await?;
        if !self.has_free_seat(&course).await? {
            return Err(AppError::conflict_msg("Course has no free seats"));
        }

        for entry in self.repos.waiting_list.list(course_id).await? {
            if self
                .repos
                .enrollments
                .find_current(entry.student_id, course_id)
                .await?
                .is_some()
            {
                self.repos.waiting_list.delete(entry.id).await?;
                continue;
            }

            let eligible = match self.people.student_eligibility(entry.student_id).await {
                Ok(eligibility) => eligibility.is_eligible(),
                Err(AppError::NotFound(_)) => false,
                Err(e) => return Err(e),
            };
            if !eligible {
                warn!(
                    student_id = %entry.student_id,
                    course_id = %course_id,
                    position = entry.position,
                    "Skipping ineligible waiting list entry"
                );
                continue;
            }

            let enrollment = Enrollment::new(entry.student_id, course_id, Utc::now());
            let enrollment = self
                .repos
                .enrollments
                .create(&enrollment, Some(entry.id))
                .await?;
            info!(
                student_id = %entry.student_id,
                course_id = %course_id,
                position = entry.position,
                "Promoted from waiting list"
            );
            return Ok(Some(enrollment));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::person::{RestrictionKind, StudentStatus};
    use mockall::predicate::eq;
    use tokio_test::assert_ok;

    use crate::clients::MockPersonDirectory;
    use crate::service::test_support::{course, eligible, repos, Mocks};

    fn manager(mocks: Mocks, people: MockPersonDirectory) -> EnrollmentManager {
        EnrollmentManager::new(repos(mocks), Arc::new(people))
    }

    fn eligible_people() -> MockPersonDirectory {
        let mut people = MockPersonDirectory::new();
        people
            .expect_student_eligibility()
            .returning(|id| Ok(eligible(id)));
        people
    }

    fn expect_course(mocks: &mut Mocks, course: Course) {
        mocks
            .courses
            .expect_find_by_id()
            .returning(move |_| Ok(Some(course.clone())));
    }

    #[tokio::test]
    async fn test_enroll_blocked_by_restriction() {
        let mut people = MockPersonDirectory::new();
        people.expect_student_eligibility().returning(|id| {
            let mut eligibility = eligible(id);
            eligibility.blocking_restrictions = vec![RestrictionKind::Financial];
            Ok(eligibility)
        });
        let service = manager(Mocks::default(), people);

        let result = service.enroll(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg.contains("financial")));
    }

    #[tokio::test]
    async fn test_enroll_suspended_student_fails() {
        let mut people = MockPersonDirectory::new();
        people.expect_student_eligibility().returning(|id| {
            let mut eligibility = eligible(id);
            eligibility.status = StudentStatus::Suspended;
            Ok(eligibility)
        });
        let service = manager(Mocks::default(), people);

        let result = service.enroll(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_enroll_full_course_suggests_waiting_list() {
        let mut mocks = Mocks::default();
        expect_course(&mut mocks, course(2));
        mocks.enrollments.expect_find_current().returning(|_, _| Ok(None));
        mocks.enrollments.expect_count_enrolled().returning(|_| Ok(2));
        let service = manager(mocks, eligible_people());

        let result = service.enroll(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Conflict(msg)) if msg.contains("waiting list")));
    }

    #[tokio::test]
    async fn test_enroll_twice_conflicts() {
        let existing = Enrollment::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
        let mut mocks = Mocks::default();
        expect_course(&mut mocks, course(10));
        mocks
            .enrollments
            .expect_find_current()
            .returning(move |_, _| Ok(Some(existing.clone())));
        let service = manager(mocks, eligible_people());

        let result = service.enroll(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_enroll_consumes_waiting_list_entry() {
        let course = course(10);
        let course_id = course.id;
        let student_id = Uuid::new_v4();
        let entry = WaitingListEntry::new(course_id, student_id, Some(3));
        let entry_id = entry.id;
        let mut mocks = Mocks::default();
        expect_course(&mut mocks, course);
        mocks.enrollments.expect_find_current().returning(|_, _| Ok(None));
        mocks.enrollments.expect_count_enrolled().returning(|_| Ok(4));
        mocks
            .waiting_list
            .expect_find_entry()
            .with(eq(course_id), eq(student_id))
            .returning(move |_, _| Ok(Some(entry.clone())));
        mocks
            .enrollments
            .expect_create()
            .withf(move |e, dequeue| e.student_id == student_id && *dequeue == Some(entry_id))
            .times(1)
            .returning(|e, _| Ok(e.clone()));
        let service = manager(mocks, eligible_people());

        let enrollment = assert_ok!(service.enroll(student_id, course_id).await);
        assert!(enrollment.is_active());
    }

    #[tokio::test]
    async fn test_join_waiting_list_requires_full_course() {
        let mut mocks = Mocks::default();
        expect_course(&mut mocks, course(10));
        mocks.enrollments.expect_count_enrolled().returning(|_| Ok(9));
        let service = manager(mocks, eligible_people());

        let result = service
            .join_waiting_list(Uuid::new_v4(), Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_join_waiting_list_takes_next_position() {
        let mut mocks = Mocks::default();
        expect_course(&mut mocks, course(1));
        mocks.enrollments.expect_count_enrolled().returning(|_| Ok(1));
        mocks.enrollments.expect_find_current().returning(|_, _| Ok(None));
        mocks.waiting_list.expect_find_entry().returning(|_, _| Ok(None));
        mocks
            .waiting_list
            .expect_max_position()
            .returning(|_| Ok(Some(4)));
        mocks
            .waiting_list
            .expect_create()
            .times(1)
            .returning(|e| Ok(e.clone()));
        let service = manager(mocks, eligible_people());

        let entry = service
            .join_waiting_list(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(entry.position, 5);
    }

    #[tokio::test]
    async fn test_drop_completed_enrollment_fails() {
        let mut completed = Enrollment::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
        completed.complete(Utc::now()).unwrap();
        let mut mocks = Mocks::default();
        mocks
            .enrollments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(completed.clone())));
        let service = manager(mocks, MockPersonDirectory::new());

        let result = service.drop_enrollment(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_promote_skips_ineligible_entries() {
        let course = course(5);
        let course_id = course.id;
        let blocked = WaitingListEntry::new(course_id, Uuid::new_v4(), None);
        let next = WaitingListEntry::new(course_id, Uuid::new_v4(), Some(1));
        let blocked_student = blocked.student_id;
        let next_student = next.student_id;
        let next_id = next.id;
        let entries = vec![blocked, next];

        let mut mocks = Mocks::default();
        expect_course(&mut mocks, course);
        mocks.enrollments.expect_count_enrolled().returning(|_| Ok(4));
        mocks
            .waiting_list
            .expect_list()
            .returning(move |_| Ok(entries.clone()));
        mocks.enrollments.expect_find_current().returning(|_, _| Ok(None));
        mocks
            .enrollments
            .expect_create()
            .withf(move |e, dequeue| e.student_id == next_student && *dequeue == Some(next_id))
            .times(1)
            .returning(|e, _| Ok(e.clone()));

        let mut people = MockPersonDirectory::new();
        people.expect_student_eligibility().returning(move |id| {
            let mut eligibility = eligible(id);
            if id == blocked_student {
                eligibility.blocking_restrictions = vec![RestrictionKind::Academic];
            }
            Ok(eligibility)
        });
        let service = manager(mocks, people);

        let promoted = service.promote_from_waiting_list(course_id).await.unwrap();
        assert_eq!(promoted.map(|e| e.student_id), Some(next_student));
    }

    #[tokio::test]
    async fn test_promote_without_free_seat_conflicts() {
        let mut mocks = Mocks::default();
        expect_course(&mut mocks, course(2));
        mocks.enrollments.expect_count_enrolled().returning(|_| Ok(2));
        let service = manager(mocks, MockPersonDirectory::new());

        let result = service.promote_from_waiting_list(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
