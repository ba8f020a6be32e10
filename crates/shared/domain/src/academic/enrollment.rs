//! Course enrollment and waiting list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::macros::string_enum;

string_enum! {
    "enrollment status",
    pub enum EnrollmentStatus {
        Enrolled => "enrolled",
        Dropped => "dropped",
        Completed => "completed",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Enrollment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
    pub dropped_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    pub fn new(student_id: Uuid, course_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            course_id,
            status: EnrollmentStatus::Enrolled,
            enrolled_at: now,
            dropped_at: None,
            completed_at: None,
        }
    }

    /// Occupies a seat
    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Enrolled
    }

    /// Grades may be recorded against enrolled or completed enrollments
    pub fn is_gradable(&self) -> bool {
        self.status != EnrollmentStatus::Dropped
    }

    pub fn drop_course(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_enrolled("dropped")?;
        self.status = EnrollmentStatus::Dropped;
        self.dropped_at = Some(now);
        Ok(())
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_enrolled("completed")?;
        self.status = EnrollmentStatus::Completed;
        self.completed_at = Some(now);
        Ok(())
    }

    fn ensure_enrolled(&self, action: &str) -> DomainResult<()> {
        if self.status != EnrollmentStatus::Enrolled {
            return Err(DomainError::invalid_state(format!(
                "Only enrolled students can be {} (current status: {})",
                action, self.status
            )));
        }
        Ok(())
    }
}

/// Queue position for a full course
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WaitingListEntry {
    pub id: Uuid,
    pub course_id: Uuid,
    pub student_id: Uuid,
    /// 1-based; lower is served first
    pub position: i32,
    pub joined_at: DateTime<Utc>,
}

impl WaitingListEntry {
    /// Position for a new entry given the current highest position.
    pub fn next_position(max_position: Option<i32>) -> i32 {
        max_position.map_or(1, |max| max + 1)
    }

    pub fn new(course_id: Uuid, student_id: Uuid, max_position: Option<i32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            course_id,
            student_id,
            position: Self::next_position(max_position),
            joined_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_then_complete_fails() {
        let now = Utc::now();
        let mut enrollment = Enrollment::new(Uuid::new_v4(), Uuid::new_v4(), now);
        assert!(enrollment.is_active());

        enrollment.drop_course(now).unwrap();
        assert_eq!(enrollment.status, EnrollmentStatus::Dropped);
        assert!(!enrollment.is_gradable());
        assert!(matches!(
            enrollment.complete(now),
            Err(DomainError::InvalidState(_))
        ));
    }

    #[test]
    fn test_completed_is_gradable() {
        let now = Utc::now();
        let mut enrollment = Enrollment::new(Uuid::new_v4(), Uuid::new_v4(), now);
        enrollment.complete(now).unwrap();
        assert!(enrollment.is_gradable());
        assert!(!enrollment.is_active());
    }

    #[test]
    fn test_waiting_list_position() {
        assert_eq!(WaitingListEntry::next_position(None), 1);
        assert_eq!(WaitingListEntry::next_position(Some(4)), 5);

        let entry = WaitingListEntry::new(Uuid::new_v4(), Uuid::new_v4(), Some(2));
        assert_eq!(entry.position, 3);
    }
}
