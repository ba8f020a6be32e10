//! Student profile and its status lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::macros::string_enum;
use crate::validation::{required_text, RECORD_NUMBER_REGEX};

string_enum! {
    "student status",
    pub enum StudentStatus {
        Active => "active",
        Suspended => "suspended",
        Graduated => "graduated",
        Withdrawn => "withdrawn",
    }
}

impl StudentStatus {
    /// Allowed lifecycle transitions
    pub fn can_transition_to(self, next: StudentStatus) -> bool {
        use StudentStatus::*;
        matches!(
            (self, next),
            (Active, Suspended)
                | (Active, Graduated)
                | (Active, Withdrawn)
                | (Suspended, Active)
                | (Suspended, Withdrawn)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, StudentStatus::Graduated | StudentStatus::Withdrawn)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Student {
    pub id: Uuid,
    pub person_id: Uuid,
    pub student_number: String,
    pub program: String,
    pub enrollment_date: NaiveDate,
    pub expected_graduation: Option<NaiveDate>,
    pub status: StudentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Student {
    pub fn new(
        person_id: Uuid,
        student_number: &str,
        program: &str,
        enrollment_date: NaiveDate,
        expected_graduation: Option<NaiveDate>,
    ) -> DomainResult<Self> {
        let student_number = student_number.trim().to_uppercase();
        if !RECORD_NUMBER_REGEX.is_match(&student_number) {
            return Err(DomainError::validation(
                "Student number must be 4-20 uppercase letters or digits",
            ));
        }
        validate_graduation(enrollment_date, expected_graduation)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            person_id,
            student_number,
            program: required_text("Program", program)?,
            enrollment_date,
            expected_graduation,
            status: StudentStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    pub fn update(
        &mut self,
        program: Option<&str>,
        expected_graduation: Option<NaiveDate>,
    ) -> DomainResult<()> {
        if let Some(program) = program {
            self.program = required_text("Program", program)?;
        }
        if expected_graduation.is_some() {
            validate_graduation(self.enrollment_date, expected_graduation)?;
            self.expected_graduation = expected_graduation;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn change_status(&mut self, next: StudentStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::invalid_state(format!(
                "Cannot change student status from {} to {}",
                self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn soft_delete(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}

fn validate_graduation(enrolled: NaiveDate, graduation: Option<NaiveDate>) -> DomainResult<()> {
    match graduation {
        Some(date) if date <= enrolled => Err(DomainError::validation(
            "Expected graduation must be after the enrollment date",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Student {
        Student::new(
            Uuid::new_v4(),
            "s2025001",
            "Computer Science",
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2029, 6, 30),
        )
        .unwrap()
    }

    #[test]
    fn test_new_student_is_active() {
        let student = student();
        assert_eq!(student.student_number, "S2025001");
        assert_eq!(student.status, StudentStatus::Active);
    }

    #[test]
    fn test_graduation_before_enrollment_rejected() {
        let result = Student::new(
            Uuid::new_v4(),
            "S2025002",
            "Physics",
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_status_transitions() {
        let mut student = student();
        student.change_status(StudentStatus::Suspended).unwrap();
        student.change_status(StudentStatus::Active).unwrap();
        student.change_status(StudentStatus::Graduated).unwrap();
        assert!(matches!(
            student.change_status(StudentStatus::Active),
            Err(DomainError::InvalidState(_))
        ));
    }

    #[test]
    fn test_suspended_cannot_graduate() {
        assert!(!StudentStatus::Suspended.can_transition_to(StudentStatus::Graduated));
        assert!(StudentStatus::Withdrawn.is_terminal());
    }
}
