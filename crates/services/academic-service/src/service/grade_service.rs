//! Grades, transcripts and grade objections.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt, Page, PaginationParams};
use domain::academic::{
    weighted_score, CourseResult, Grade, GradeObjection, LetterGrade, ObjectionStatus, Transcript,
};

use crate::repository::{AcademicRepositories, GradeFilter};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait GradeService: Send + Sync {
    /// Record a score for a student enrolled in (or finished) the exam's course
    async fn record_grade(
        &self,
        exam_id: Uuid,
        student_id: Uuid,
        score: f64,
        graded_by: Option<Uuid>,
    ) -> AppResult<Grade>;

    async fn update_grade(&self, id: Uuid, score: f64, graded_by: Option<Uuid>)
        -> AppResult<Grade>;

    async fn get_grade(&self, id: Uuid) -> AppResult<Grade>;

    async fn list_grades(&self, filter: GradeFilter) -> AppResult<Vec<Grade>>;

    /// Per-course weighted results and credit-weighted GPA
    async fn transcript(&self, student_id: Uuid) -> AppResult<Transcript>;

    async fn file_objection(
        &self,
        grade_id: Uuid,
        student_id: Uuid,
        reason: String,
    ) -> AppResult<GradeObjection>;

    /// Approve and apply the revised score to the grade atomically
    async fn approve_objection(
        &self,
        id: Uuid,
        revised_score: f64,
        reviewer: Uuid,
        response: Option<String>,
    ) -> AppResult<GradeObjection>;

    async fn reject_objection(
        &self,
        id: Uuid,
        reviewer: Uuid,
        response: String,
    ) -> AppResult<GradeObjection>;

    async fn get_objection(&self, id: Uuid) -> AppResult<GradeObjection>;

    async fn list_objections(
        &self,
        status: Option<ObjectionStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<GradeObjection>>;
}

pub struct GradeManager {
    repos: AcademicRepositories,
}

impl GradeManager {
    pub fn new(repos: AcademicRepositories) -> Self {
        Self { repos }
    }

    async fn pending_objection(&self, id: Uuid) -> AppResult<GradeObjection> {
        let objection = self.get_objection(id).await?;
        if !objection.is_pending() {
            return Err(AppError::bad_request(format!(
                "Objection already {}",
                objection.status
            )));
        }
        Ok(objection)
    }
}

#[async_trait]
impl GradeService for GradeManager {
    async fn record_grade(
        &self,
        exam_id: Uuid,
        student_id: Uuid,
        score: f64,
        graded_by: Option<Uuid>,
    ) -> AppResult<Grade> {
        let exam = self
            .repos
            .exams
            .find_by_id(exam_id)
            .await?
            .ok_or_not_found("Exam")?;

        if self
            .repos
            .enrollments
            .find_gradable(student_id, exam.course_id)
            .await?
            .is_none()
        {
            return Err(AppError::bad_request(
                "Student is not enrolled in the exam's course",
            ));
        }
        if self.repos.grades.find_for(exam_id, student_id).await?.is_some() {
            return Err(AppError::conflict_msg("A grade already exists for this exam and student"));
        }

        let grade = Grade::new(exam_id, student_id, score, graded_by)?;
        let grade = self.repos.grades.create(&grade).await?;
        info!(grade_id = %grade.id, exam_id = %exam_id, student_id = %student_id, "Grade recorded");
        Ok(grade)
    }

    async fn update_grade(
        &self,
        id: Uuid,
        score: f64,
        graded_by: Option<Uuid>,
    ) -> AppResult<Grade> {
        let mut grade = self.get_grade(id).await?;
        grade.update_score(score, graded_by)?;
        self.repos.grades.save(&grade).await
    }

    async fn get_grade(&self, id: Uuid) -> AppResult<Grade> {
        self.repos.grades.find_by_id(id).await?.ok_or_not_found("Grade")
    }

    async fn list_grades(&self, filter: GradeFilter) -> AppResult<Vec<Grade>> {
        self.repos.grades.list(filter).await
    }

    async fn transcript(&self, student_id: Uuid) -> AppResult<Transcript> {
        let enrollments = self
            .repos
            .enrollments
            .list_gradable_for_student(student_id)
            .await?;
        if enrollments.is_empty() {
            return Ok(Transcript::new(student_id, vec![]));
        }

        let course_ids: Vec<Uuid> = enrollments.iter().map(|e| e.course_id).collect();
        let courses = self.repos.courses.find_by_ids(course_ids.clone()).await?;
        let exams = self.repos.exams.list_for_courses(course_ids).await?;
        let grades: HashMap<Uuid, f64> = self
            .repos
            .grades
            .list(GradeFilter {
                student_id: Some(student_id),
                exam_id: None,
            })
            .await?
            .into_iter()
            .map(|g| (g.exam_id, g.score))
            .collect();

        let results = courses
            .into_iter()
            .map(|course| {
                let scored: Vec<(f64, i32)> = exams
                    .iter()
                    .filter(|e| e.course_id == course.id)
                    .filter_map(|e| grades.get(&e.id).map(|score| (*score, e.weight)))
                    .collect();
                let weighted = weighted_score(&scored);
                CourseResult {
                    course_id: course.id,
                    course_code: course.code,
                    course_name: course.name,
                    credits: course.credits,
                    weighted_score: weighted,
                    letter: weighted.map(LetterGrade::from_score),
                    graded_weight: scored.iter().map(|(_, w)| *w).sum(),
                }
            })
            .collect();

        Ok(Transcript::new(student_id, results))
    }

    async fn file_objection(
        &self,
        grade_id: Uuid,
        student_id: Uuid,
        reason: String,
    ) -> AppResult<GradeObjection> {
        let grade = self.get_grade(grade_id).await?;
        let objection = GradeObjection::file(&grade, student_id, &reason, Utc::now())?;

        if self
            .repos
            .objections
            .find_pending_for_grade(grade_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict_msg("A pending objection already exists for this grade"));
        }

        let objection = self.repos.objections.create(&objection).await?;
        info!(objection_id = %objection.id, grade_id = %grade_id, "Grade objection filed");
        Ok(objection)
    }

    async fn approve_objection(
        &self,
        id: Uuid,
        revised_score: f64,
        reviewer: Uuid,
        response: Option<String>,
    ) -> AppResult<GradeObjection> {
        let mut objection = self.pending_objection(id).await?;
        let mut grade = self.get_grade(objection.grade_id).await?;

        objection.approve(revised_score, reviewer, response, Utc::now())?;
        grade.update_score(revised_score, Some(reviewer))?;

        let (objection, grade) = self
            .repos
            .objections
            .save_with_grade(&objection, &grade)
            .await?;
        info!(
            objection_id = %objection.id,
            grade_id = %grade.id,
            original_score = objection.original_score,
            revised_score = grade.score,
            "Grade objection approved"
        );
        Ok(objection)
    }

    async fn reject_objection(
        &self,
        id: Uuid,
        reviewer: Uuid,
        response: String,
    ) -> AppResult<GradeObjection> {
        let mut objection = self.pending_objection(id).await?;
        objection.reject(reviewer, &response, Utc::now())?;
        let objection = self.repos.objections.save(&objection).await?;
        info!(objection_id = %objection.id, "Grade objection rejected");
        Ok(objection)
    }

    async fn get_objection(&self, id: Uuid) -> AppResult<GradeObjection> {
        self.repos
            .objections
            .find_by_id(id)
            .await?
            .ok_or_not_found("Grade objection")
    }

    async fn list_objections(
        &self,
        status: Option<ObjectionStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<GradeObjection>> {
        self.repos.objections.list(status, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domain::academic::Enrollment;
    use mockall::predicate::eq;
    use tokio_test::assert_ok;

    use crate::service::test_support::{course, exam, repos, Mocks};

    fn grade(student_id: Uuid, score: f64) -> Grade {
        Grade::new(Uuid::new_v4(), student_id, score, None).unwrap()
    }

    #[tokio::test]
    async fn test_record_grade_requires_enrollment() {
        let exam = exam(Uuid::new_v4(), 30);
        let mut mocks = Mocks::default();
        mocks
            .exams
            .expect_find_by_id()
            .returning(move |_| Ok(Some(exam.clone())));
        mocks.enrollments.expect_find_gradable().returning(|_, _| Ok(None));
        mocks.grades.expect_create().never();
        let service = GradeManager::new(repos(mocks));

        let result = service
            .record_grade(Uuid::new_v4(), Uuid::new_v4(), 75.0, None)
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_record_grade_twice_conflicts() {
        let student_id = Uuid::new_v4();
        let exam = exam(Uuid::new_v4(), 30);
        let enrollment = Enrollment::new(student_id, exam.course_id, Utc::now());
        let existing = grade(student_id, 60.0);
        let mut mocks = Mocks::default();
        mocks
            .exams
            .expect_find_by_id()
            .returning(move |_| Ok(Some(exam.clone())));
        mocks
            .enrollments
            .expect_find_gradable()
            .returning(move |_, _| Ok(Some(enrollment.clone())));
        mocks
            .grades
            .expect_find_for()
            .returning(move |_, _| Ok(Some(existing.clone())));
        let service = GradeManager::new(repos(mocks));

        let result = service.record_grade(Uuid::new_v4(), student_id, 75.0, None).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_record_grade_validates_score() {
        let student_id = Uuid::new_v4();
        let exam = exam(Uuid::new_v4(), 30);
        let enrollment = Enrollment::new(student_id, exam.course_id, Utc::now());
        let mut mocks = Mocks::default();
        mocks
            .exams
            .expect_find_by_id()
            .returning(move |_| Ok(Some(exam.clone())));
        mocks
            .enrollments
            .expect_find_gradable()
            .returning(move |_, _| Ok(Some(enrollment.clone())));
        mocks.grades.expect_find_for().returning(|_, _| Ok(None));
        let service = GradeManager::new(repos(mocks));

        let result = service.record_grade(Uuid::new_v4(), student_id, 120.0, None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_transcript_weights_graded_exams() {
        let student_id = Uuid::new_v4();
        let course = course(30);
        let course_id = course.id;
        let midterm = exam(course_id, 40);
        let final_exam = exam(course_id, 50);
        let ungraded = exam(course_id, 10);
        let grades = vec![
            Grade::new(midterm.id, student_id, 80.0, None).unwrap(),
            Grade::new(final_exam.id, student_id, 90.0, None).unwrap(),
        ];
        let exams = vec![midterm, final_exam, ungraded];
        let enrollment = Enrollment::new(student_id, course_id, Utc::now());

        let mut mocks = Mocks::default();
        mocks
            .enrollments
            .expect_list_gradable_for_student()
            .with(eq(student_id))
            .returning(move |_| Ok(vec![enrollment.clone()]));
        mocks
            .courses
            .expect_find_by_ids()
            .returning(move |_| Ok(vec![course.clone()]));
        mocks
            .exams
            .expect_list_for_courses()
            .returning(move |_| Ok(exams.clone()));
        mocks
            .grades
            .expect_list()
            .returning(move |_| Ok(grades.clone()));
        let service = GradeManager::new(repos(mocks));

        let transcript = assert_ok!(service.transcript(student_id).await);
        assert_eq!(transcript.courses.len(), 1);
        let result = &transcript.courses[0];
        assert_eq!(result.weighted_score, Some(85.56));
        assert_eq!(result.letter, Some(LetterGrade::B));
        assert_eq!(result.graded_weight, 90);
        assert_eq!(transcript.gpa, Some(3.0));
    }

    #[tokio::test]
    async fn test_transcript_without_enrollments_is_empty() {
        let mut mocks = Mocks::default();
        mocks
            .enrollments
            .expect_list_gradable_for_student()
            .returning(|_| Ok(vec![]));
        let service = GradeManager::new(repos(mocks));

        let transcript = assert_ok!(service.transcript(Uuid::new_v4()).await);
        assert!(transcript.courses.is_empty());
        assert_eq!(transcript.gpa, None);
    }

    #[tokio::test]
    async fn test_file_objection_for_other_students_grade_is_forbidden() {
        let existing = grade(Uuid::new_v4(), 55.0);
        let mut mocks = Mocks::default();
        mocks
            .grades
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        let service = GradeManager::new(repos(mocks));

        let result = service
            .file_objection(Uuid::new_v4(), Uuid::new_v4(), "Recount please".to_string())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_file_objection_after_window_fails() {
        let student_id = Uuid::new_v4();
        let mut existing = grade(student_id, 55.0);
        existing.graded_at = Utc::now() - Duration::days(15);
        let mut mocks = Mocks::default();
        mocks
            .grades
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        let service = GradeManager::new(repos(mocks));

        let result = service
            .file_objection(Uuid::new_v4(), student_id, "Recount please".to_string())
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_file_duplicate_pending_objection_conflicts() {
        let student_id = Uuid::new_v4();
        let existing = grade(student_id, 55.0);
        let pending = GradeObjection::file(&existing, student_id, "First", Utc::now()).unwrap();
        let mut mocks = Mocks::default();
        mocks
            .grades
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mocks
            .objections
            .expect_find_pending_for_grade()
            .returning(move |_| Ok(Some(pending.clone())));
        mocks.objections.expect_create().never();
        let service = GradeManager::new(repos(mocks));

        let result = service
            .file_objection(Uuid::new_v4(), student_id, "Second".to_string())
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_approve_objection_revises_grade() {
        let student_id = Uuid::new_v4();
        let reviewer = Uuid::new_v4();
        let existing = grade(student_id, 55.0);
        let objection = GradeObjection::file(&existing, student_id, "Recount", Utc::now()).unwrap();
        let objection_id = objection.id;
        let mut mocks = Mocks::default();
        mocks
            .objections
            .expect_find_by_id()
            .returning(move |_| Ok(Some(objection.clone())));
        mocks
            .grades
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mocks
            .objections
            .expect_save_with_grade()
            .withf(move |o, g| {
                o.revised_score == Some(65.0) && g.score == 65.0 && g.graded_by == Some(reviewer)
            })
            .times(1)
            .returning(|o, g| Ok((o.clone(), g.clone())));
        let service = GradeManager::new(repos(mocks));

        let approved = assert_ok!(
            service
                .approve_objection(objection_id, 65.0, reviewer, None)
                .await
        );
        assert_eq!(approved.status, ObjectionStatus::Approved);
        assert_eq!(approved.original_score, 55.0);
    }

    #[tokio::test]
    async fn test_resolved_objection_cannot_be_rejected() {
        let student_id = Uuid::new_v4();
        let existing = grade(student_id, 55.0);
        let mut objection =
            GradeObjection::file(&existing, student_id, "Recount", Utc::now()).unwrap();
        objection
            .reject(Uuid::new_v4(), "Grading was correct", Utc::now())
            .unwrap();
        let mut mocks = Mocks::default();
        mocks
            .objections
            .expect_find_by_id()
            .returning(move |_| Ok(Some(objection.clone())));
        let service = GradeManager::new(repos(mocks));

        let result = service
            .reject_objection(Uuid::new_v4(), Uuid::new_v4(), "Again".to_string())
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
