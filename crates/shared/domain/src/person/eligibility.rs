//! Enrollment eligibility snapshot shared between person and academic services.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::restriction::RestrictionKind;
use super::student::StudentStatus;

/// Whether a student may currently enroll in courses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EnrollmentEligibility {
    pub student_id: Uuid,
    pub status: StudentStatus,
    /// Kinds of active restrictions that block enrollment
    pub blocking_restrictions: Vec<RestrictionKind>,
}

impl EnrollmentEligibility {
    pub fn is_eligible(&self) -> bool {
        self.status == StudentStatus::Active && self.blocking_restrictions.is_empty()
    }

    /// Human readable reason when not eligible
    pub fn reason(&self) -> Option<String> {
        if self.status != StudentStatus::Active {
            return Some(format!("Student status is {}", self.status));
        }
        if !self.blocking_restrictions.is_empty() {
            let kinds: Vec<&str> = self.blocking_restrictions.iter().map(|k| k.as_str()).collect();
            return Some(format!("Student has active restrictions: {}", kinds.join(", ")));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligibility() {
        let mut e = EnrollmentEligibility {
            student_id: Uuid::new_v4(),
            status: StudentStatus::Active,
            blocking_restrictions: vec![],
        };
        assert!(e.is_eligible());
        assert_eq!(e.reason(), None);

        e.blocking_restrictions.push(RestrictionKind::Financial);
        assert!(!e.is_eligible());
        assert_eq!(e.reason().unwrap(), "Student has active restrictions: financial");

        e.blocking_restrictions.clear();
        e.status = StudentStatus::Suspended;
        assert_eq!(e.reason().unwrap(), "Student status is suspended");
    }
}
