//! Exam scheduling and weighting.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::academic::{Exam, ExamUpdate, NewExam};

use crate::repository::AcademicRepositories;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ExamService: Send + Sync {
    /// Schedule an exam; the course's total exam weight may not exceed 100
    async fn create_exam(&self, input: NewExam) -> AppResult<Exam>;

    async fn get_exam(&self, id: Uuid) -> AppResult<Exam>;

    async fn list_exams(&self, course_id: Uuid) -> AppResult<Vec<Exam>>;

    async fn update_exam(&self, id: Uuid, update: ExamUpdate) -> AppResult<Exam>;

    /// Refused once any grade was recorded for the exam
    async fn delete_exam(&self, id: Uuid) -> AppResult<()>;
}

pub struct ExamManager {
    repos: AcademicRepositories,
}

impl ExamManager {
    pub fn new(repos: AcademicRepositories) -> Self {
        Self { repos }
    }

    /// Summed weight of the course's exams, leaving out `exclude`
    async fn weight_of_others(&self, course_id: Uuid, exclude: Option<Uuid>) -> AppResult<i32> {
        let exams = self.repos.exams.list_for_course(course_id).await?;
        Ok(exams
            .iter()
            .filter(|e| Some(e.id) != exclude)
            .map(|e| e.weight)
            .sum())
    }
}

#[async_trait]
impl ExamService for ExamManager {
    async fn create_exam(&self, input: NewExam) -> AppResult<Exam> {
        self.repos
            .courses
            .find_by_id(input.course_id)
            .await?
            .ok_or_not_found("Course")?;

        let other_weights = self.weight_of_others(input.course_id, None).await?;
        let exam = Exam::new(input, other_weights)?;
        let exam = self.repos.exams.create(&exam).await?;
        info!(
            exam_id = %exam.id,
            course_id = %exam.course_id,
            weight = exam.weight,
            "Exam scheduled"
        );
        Ok(exam)
    }

    async fn get_exam(&self, id: Uuid) -> AppResult<Exam> {
        self.repos.exams.find_by_id(id).await?.ok_or_not_found("Exam")
    }

    async fn list_exams(&self, course_id: Uuid) -> AppResult<Vec<Exam>> {
        self.repos
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or_not_found("Course")?;
        self.repos.exams.list_for_course(course_id).await
    }

    async fn update_exam(&self, id: Uuid, update: ExamUpdate) -> AppResult<Exam> {
        let mut exam = self.get_exam(id).await?;
        let other_weights = self.weight_of_others(exam.course_id, Some(exam.id)).await?;
        exam.apply(update, other_weights)?;
        self.repos.exams.save(&exam).await
    }

    async fn delete_exam(&self, id: Uuid) -> AppResult<()> {
        let exam = self.get_exam(id).await?;
        if self.repos.grades.count_for_exam(exam.id).await? > 0 {
            return Err(AppError::conflict_msg("Exam already has recorded grades"));
        }
        self.repos.exams.delete(exam.id).await?;
        info!(exam_id = %id, "Exam deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use domain::academic::ExamKind;
    use tokio_test::{assert_err, assert_ok};

    use crate::service::test_support::{course, exam, repos, Mocks};

    fn new_exam(course_id: Uuid, weight: i32) -> NewExam {
        NewExam {
            course_id,
            title: "Final".to_string(),
            kind: ExamKind::Final,
            scheduled_at: Utc::now() + Duration::days(60),
            duration_minutes: 120,
            location: Some("Hall A".to_string()),
            weight,
        }
    }

    #[tokio::test]
    async fn test_create_exam_within_weight_budget() {
        let course = course(30);
        let course_id = course.id;
        let mut mocks = Mocks::default();
        mocks
            .courses
            .expect_find_by_id()
            .returning(move |_| Ok(Some(course.clone())));
        mocks
            .exams
            .expect_list_for_course()
            .returning(move |id| Ok(vec![exam(id, 40)]));
        mocks.exams.expect_create().returning(|e| Ok(e.clone()));
        let service = ExamManager::new(repos(mocks));

        let exam = assert_ok!(service.create_exam(new_exam(course_id, 60)).await);
        assert_eq!(exam.weight, 60);
    }

    #[tokio::test]
    async fn test_create_exam_exceeding_weight_fails() {
        let course = course(30);
        let course_id = course.id;
        let mut mocks = Mocks::default();
        mocks
            .courses
            .expect_find_by_id()
            .returning(move |_| Ok(Some(course.clone())));
        mocks
            .exams
            .expect_list_for_course()
            .returning(move |id| Ok(vec![exam(id, 40), exam(id, 30)]));
        let service = ExamManager::new(repos(mocks));

        let result = service.create_exam(new_exam(course_id, 40)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_exam_excludes_own_weight() {
        let existing = exam(Uuid::new_v4(), 50);
        let existing_id = existing.id;
        let course_id = existing.course_id;
        let siblings = vec![existing.clone(), exam(course_id, 40)];
        let mut mocks = Mocks::default();
        mocks
            .exams
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mocks
            .exams
            .expect_list_for_course()
            .returning(move |_| Ok(siblings.clone()));
        mocks.exams.expect_save().returning(|e| Ok(e.clone()));
        let service = ExamManager::new(repos(mocks));

        let update = ExamUpdate {
            weight: Some(60),
            ..Default::default()
        };
        let updated = assert_ok!(service.update_exam(existing_id, update).await);
        assert_eq!(updated.weight, 60);
    }

    #[tokio::test]
    async fn test_delete_graded_exam_conflicts() {
        let existing = exam(Uuid::new_v4(), 20);
        let mut mocks = Mocks::default();
        mocks
            .exams
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mocks.grades.expect_count_for_exam().returning(|_| Ok(3));
        mocks.exams.expect_delete().never();
        let service = ExamManager::new(repos(mocks));

        assert_err!(service.delete_exam(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_list_exams_unknown_course() {
        let mut mocks = Mocks::default();
        mocks.courses.expect_find_by_id().returning(|_| Ok(None));
        let service = ExamManager::new(repos(mocks));

        let result = service.list_exams(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
