//! In-process client for the person service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use common::AppResult;
use domain::person::EnrollmentEligibility;
use person_service_lib::{StaffService, StudentService};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// What the academic context needs to know about people.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PersonDirectory: Send + Sync {
    /// Eligibility of a student to enroll; unknown students are a 404
    async fn student_eligibility(&self, student_id: Uuid) -> AppResult<EnrollmentEligibility>;

    /// Whether the id names an active staff member
    async fn is_active_staff(&self, staff_id: Uuid) -> AppResult<bool>;
}

/// Person directory backed by the person service traits.
pub struct PersonClient {
    students: Arc<dyn StudentService>,
    staff: Arc<dyn StaffService>,
}

impl PersonClient {
    pub fn new(students: Arc<dyn StudentService>, staff: Arc<dyn StaffService>) -> Self {
        Self { students, staff }
    }
}

#[async_trait]
impl PersonDirectory for PersonClient {
    async fn student_eligibility(&self, student_id: Uuid) -> AppResult<EnrollmentEligibility> {
        debug!(student_id = %student_id, "Checking enrollment eligibility");
        self.students.enrollment_eligibility(student_id).await
    }

    async fn is_active_staff(&self, staff_id: Uuid) -> AppResult<bool> {
        self.staff.staff_exists(staff_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::person::StudentStatus;
    use person_service_lib::service::{MockStaffService, MockStudentService};

    #[tokio::test]
    async fn test_delegates_to_person_services() {
        let mut students = MockStudentService::new();
        students.expect_enrollment_eligibility().returning(|id| {
            Ok(EnrollmentEligibility {
                student_id: id,
                status: StudentStatus::Active,
                blocking_restrictions: vec![],
            })
        });
        let mut staff = MockStaffService::new();
        staff.expect_staff_exists().returning(|_| Ok(true));
        let client = PersonClient::new(Arc::new(students), Arc::new(staff));

        let id = Uuid::new_v4();
        let eligibility = client.student_eligibility(id).await.unwrap();
        assert_eq!(eligibility.student_id, id);
        assert!(client.is_active_staff(Uuid::new_v4()).await.unwrap());
    }
}
