//! Grade objections (appeals).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::grade::{validate_score, Grade};
use crate::constants::GRADE_OBJECTION_WINDOW_DAYS;
use crate::error::{DomainError, DomainResult};
use crate::macros::string_enum;
use crate::validation::{optional_text, required_text};

string_enum! {
    "objection status",
    pub enum ObjectionStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GradeObjection {
    pub id: Uuid,
    pub grade_id: Uuid,
    pub student_id: Uuid,
    pub reason: String,
    pub status: ObjectionStatus,
    pub response: Option<String>,
    pub reviewed_by: Option<Uuid>,
    /// Score before the objection was approved
    pub original_score: f64,
    pub revised_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl GradeObjection {
    /// File an objection against `grade`, within the objection window.
    pub fn file(
        grade: &Grade,
        student_id: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if grade.student_id != student_id {
            return Err(DomainError::Forbidden);
        }
        let deadline = grade.graded_at + Duration::days(GRADE_OBJECTION_WINDOW_DAYS);
        if now > deadline {
            return Err(DomainError::invalid_state(format!(
                "Objections must be filed within {} days of grading",
                GRADE_OBJECTION_WINDOW_DAYS
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            grade_id: grade.id,
            student_id,
            reason: required_text("Reason", reason)?,
            status: ObjectionStatus::Pending,
            response: None,
            reviewed_by: None,
            original_score: grade.score,
            revised_score: None,
            created_at: now,
            resolved_at: None,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == ObjectionStatus::Pending
    }

    /// Approve with a revised score; the caller applies it to the grade.
    pub fn approve(
        &mut self,
        revised_score: f64,
        reviewer: Uuid,
        response: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_pending()?;
        validate_score(revised_score)?;
        self.status = ObjectionStatus::Approved;
        self.revised_score = Some(revised_score);
        self.resolve(reviewer, response, now);
        Ok(())
    }

    pub fn reject(
        &mut self,
        reviewer: Uuid,
        response: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_pending()?;
        let response = required_text("Response", response)?;
        self.status = ObjectionStatus::Rejected;
        self.resolve(reviewer, Some(response), now);
        Ok(())
    }

    fn resolve(&mut self, reviewer: Uuid, response: Option<String>, now: DateTime<Utc>) {
        self.reviewed_by = Some(reviewer);
        self.response = optional_text(response);
        self.resolved_at = Some(now);
    }

    fn ensure_pending(&self) -> DomainResult<()> {
        if !self.is_pending() {
            return Err(DomainError::invalid_state(format!(
                "Objection already {}",
                self.status
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(student_id: Uuid) -> Grade {
        Grade::new(Uuid::new_v4(), student_id, 55.0, None).unwrap()
    }

    #[test]
    fn test_file_within_window() {
        let student = Uuid::new_v4();
        let grade = grade(student);
        let objection =
            GradeObjection::file(&grade, student, "Question 3 was marked wrong", Utc::now())
                .unwrap();
        assert!(objection.is_pending());
        assert_eq!(objection.original_score, 55.0);
    }

    #[test]
    fn test_file_after_window_rejected() {
        let student = Uuid::new_v4();
        let grade = grade(student);
        let late = grade.graded_at + Duration::days(GRADE_OBJECTION_WINDOW_DAYS + 1);
        assert!(matches!(
            GradeObjection::file(&grade, student, "Late", late),
            Err(DomainError::InvalidState(_))
        ));
    }

    #[test]
    fn test_only_grade_owner_may_object() {
        let grade = grade(Uuid::new_v4());
        assert_eq!(
            GradeObjection::file(&grade, Uuid::new_v4(), "Mine?", Utc::now()),
            Err(DomainError::Forbidden)
        );
    }

    #[test]
    fn test_resolution_is_final() {
        let student = Uuid::new_v4();
        let grade = grade(student);
        let now = Utc::now();
        let mut objection = GradeObjection::file(&grade, student, "Recount", now).unwrap();

        objection.approve(65.0, Uuid::new_v4(), None, now).unwrap();
        assert_eq!(objection.status, ObjectionStatus::Approved);
        assert_eq!(objection.revised_score, Some(65.0));
        assert!(objection.reject(Uuid::new_v4(), "No", now).is_err());
    }

    #[test]
    fn test_reject_requires_response() {
        let student = Uuid::new_v4();
        let grade = grade(student);
        let now = Utc::now();
        let mut objection = GradeObjection::file(&grade, student, "Recount", now).unwrap();
        assert!(objection.reject(Uuid::new_v4(), " ", now).is_err());
        assert!(objection.is_pending());
    }
}
