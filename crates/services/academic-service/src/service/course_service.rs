//! Course service - catalogue management and seat accounting.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt, Page, PaginationParams};
use domain::academic::{Course, CourseSeats, CourseUpdate, NewCourse};

use crate::clients::PersonDirectory;
use crate::repository::AcademicRepositories;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CourseService: Send + Sync {
    /// Create a course; the code must be unused and the instructor, when
    /// given, an active staff member
    async fn create_course(&self, input: NewCourse) -> AppResult<Course>;

    async fn get_course(&self, id: Uuid) -> AppResult<Course>;

    async fn list_courses(&self, params: PaginationParams, semester: Option<String>)
        -> AppResult<Page<Course>>;

    async fn update_course(&self, id: Uuid, update: CourseUpdate) -> AppResult<Course>;

    /// Soft delete; refused while students are enrolled
    async fn delete_course(&self, id: Uuid) -> AppResult<()>;

    async fn restore_course(&self, id: Uuid) -> AppResult<Course>;

    async fn seats(&self, course_id: Uuid) -> AppResult<CourseSeats>;
}

pub struct CourseManager {
    repos: AcademicRepositories,
    people: Arc<dyn PersonDirectory>,
}

impl CourseManager {
    pub fn new(repos: AcademicRepositories, people: Arc<dyn PersonDirectory>) -> Self {
        Self { repos, people }
    }

    async fn load(&self, id: Uuid) -> AppResult<Course> {
        self.repos.courses.find_by_id(id).await?.ok_or_not_found("Course")
    }

    async fn ensure_instructor(&self, instructor_id: Option<Uuid>) -> AppResult<()> {
        if let Some(staff_id) = instructor_id {
            if !self.people.is_active_staff(staff_id).await? {
                return Err(AppError::validation(
                    "Instructor must be an active staff member",
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CourseService for CourseManager {
    async fn create_course(&self, input: NewCourse) -> AppResult<Course> {
        if self
            .repos
            .courses
            .find_by_code_with_deleted(&input.code)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Course code"));
        }
        self.ensure_instructor(input.instructor_id).await?;

        let course = Course::new(input)?;
        let course = self.repos.courses.create(&course).await?;
        info!(course_id = %course.id, code = %course.code, "Course created");
        Ok(course)
    }

    async fn get_course(&self, id: Uuid) -> AppResult<Course> {
        self.load(id).await
    }

    async fn list_courses(
        &self,
        params: PaginationParams,
        semester: Option<String>,
    ) -> AppResult<Page<Course>> {
        self.repos.courses.list(params, semester).await
    }

    async fn update_course(&self, id: Uuid, update: CourseUpdate) -> AppResult<Course> {
        let mut course = self.load(id).await?;
        if update.instructor_id != course.instructor_id {
            self.ensure_instructor(update.instructor_id).await?;
        }
        let enrolled = self.repos.enrollments.count_enrolled(id).await?;
        course.apply(update, enrolled)?;
        self.repos.courses.save(&course).await
    }

    async fn delete_course(&self, id: Uuid) -> AppResult<()> {
        let mut course = self.load(id).await?;
        if self.repos.enrollments.count_enrolled(id).await? > 0 {
            return Err(AppError::conflict_msg("Course has enrolled students"));
        }
        course.soft_delete();
        self.repos.courses.save(&course).await?;
        info!(course_id = %id, "Course deleted");
        Ok(())
    }

    async fn restore_course(&self, id: Uuid) -> AppResult<Course> {
        let mut course = self
            .repos
            .courses
            .find_by_id_with_deleted(id)
            .await?
            .ok_or_not_found("Course")?;
        course.restore()?;
        self.repos.courses.save(&course).await
    }

    async fn seats(&self, course_id: Uuid) -> AppResult<CourseSeats> {
        let course = self.load(course_id).await?;
        let enrolled = self.repos.enrollments.count_enrolled(course_id).await?;
        let waiting = self.repos.waiting_list.count(course_id).await?;
        Ok(CourseSeats::new(&course, enrolled, waiting))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    use crate::clients::MockPersonDirectory;
    use crate::service::test_support::{course, repos, Mocks};

    fn new_course(instructor_id: Option<Uuid>) -> NewCourse {
        NewCourse {
            code: "math201".to_string(),
            name: "Linear Algebra".to_string(),
            description: Some("Vectors and matrices".to_string()),
            credits: 5,
            capacity: 40,
            semester: "2025-spring".to_string(),
            instructor_id,
        }
    }

    fn manager(mocks: Mocks, people: MockPersonDirectory) -> CourseManager {
        CourseManager::new(repos(mocks), Arc::new(people))
    }

    #[tokio::test]
    async fn test_create_course_rejects_duplicate_code() {
        let existing = course(10);
        let mut mocks = Mocks::default();
        mocks
            .courses
            .expect_find_by_code_with_deleted()
            .returning(move |_| Ok(Some(existing.clone())));
        let service = manager(mocks, MockPersonDirectory::new());

        let result = service.create_course(new_course(None)).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_course_requires_active_instructor() {
        let mut mocks = Mocks::default();
        mocks
            .courses
            .expect_find_by_code_with_deleted()
            .returning(|_| Ok(None));
        let mut people = MockPersonDirectory::new();
        people.expect_is_active_staff().returning(|_| Ok(false));
        let service = manager(mocks, people);

        let result = service.create_course(new_course(Some(Uuid::new_v4()))).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_course_normalizes_code_and_semester() {
        let mut mocks = Mocks::default();
        mocks
            .courses
            .expect_find_by_code_with_deleted()
            .returning(|_| Ok(None));
        mocks
            .courses
            .expect_create()
            .times(1)
            .returning(|c| Ok(c.clone()));
        let mut people = MockPersonDirectory::new();
        people.expect_is_active_staff().returning(|_| Ok(true));
        let service = manager(mocks, people);

        let created = assert_ok!(service.create_course(new_course(Some(Uuid::new_v4()))).await);
        assert_eq!(created.code, "MATH201");
        assert_eq!(created.semester, "2025-SPRING");
    }

    #[tokio::test]
    async fn test_capacity_cannot_drop_below_enrolled() {
        let existing = course(30);
        let mut mocks = Mocks::default();
        mocks
            .courses
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mocks.enrollments.expect_count_enrolled().returning(|_| Ok(25));
        let service = manager(mocks, MockPersonDirectory::new());

        let update = CourseUpdate {
            capacity: Some(20),
            ..Default::default()
        };
        assert_err!(service.update_course(Uuid::new_v4(), update).await);
    }

    #[tokio::test]
    async fn test_delete_course_with_enrollments_is_refused() {
        let existing = course(30);
        let mut mocks = Mocks::default();
        mocks
            .courses
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mocks.enrollments.expect_count_enrolled().returning(|_| Ok(1));
        mocks.courses.expect_save().never();
        let service = manager(mocks, MockPersonDirectory::new());

        let result = service.delete_course(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_seats() {
        let existing = course(3);
        let mut mocks = Mocks::default();
        mocks
            .courses
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mocks.enrollments.expect_count_enrolled().returning(|_| Ok(3));
        mocks.waiting_list.expect_count().returning(|_| Ok(2));
        let service = manager(mocks, MockPersonDirectory::new());

        let seats = service.seats(Uuid::new_v4()).await.unwrap();
        assert_eq!(seats.available, 0);
        assert_eq!(seats.waiting, 2);
        assert!(seats.is_full());
    }
}
