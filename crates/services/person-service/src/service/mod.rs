//! Service layer for person and HR use cases.

mod person_service;
mod staff_service;
mod student_service;

use uuid::Uuid;

use common::{AppError, AppResult};

use crate::repository::PersonRepositories;

pub use person_service::{NewEmergencyContact, NewRestriction, PersonManager, PersonService};
pub use staff_service::{NewStaff, StaffManager, StaffService, StaffUpdate};
pub use student_service::{NewStudent, StudentManager, StudentService, StudentUpdate};

#[cfg(any(test, feature = "test-utils"))]
pub use person_service::MockPersonService;
#[cfg(any(test, feature = "test-utils"))]
pub use staff_service::MockStaffService;
#[cfg(any(test, feature = "test-utils"))]
pub use student_service::MockStudentService;

/// A person holds at most one profile: a student record or a staff record.
async fn ensure_profile_free(repos: &PersonRepositories, person_id: Uuid) -> AppResult<()> {
    if repos.students.find_by_person(person_id).await?.is_some() {
        return Err(AppError::conflict_msg("Person already has a student profile"));
    }
    if repos.staff.find_by_person(person_id).await?.is_some() {
        return Err(AppError::conflict_msg("Person already has a staff profile"));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::repository::{
        MockContactRepository, MockHealthRecordRepository, MockPersonRepository,
        MockRestrictionRepository, MockStaffRepository, MockStudentRepository,
        PersonRepositories,
    };

    #[derive(Default)]
    pub struct Mocks {
        pub persons: MockPersonRepository,
        pub students: MockStudentRepository,
        pub staff: MockStaffRepository,
        pub contacts: MockContactRepository,
        pub restrictions: MockRestrictionRepository,
        pub health: MockHealthRecordRepository,
    }

    pub fn repos(mocks: Mocks) -> PersonRepositories {
        PersonRepositories {
            persons: Arc::new(mocks.persons),
            students: Arc::new(mocks.students),
            staff: Arc::new(mocks.staff),
            contacts: Arc::new(mocks.contacts),
            restrictions: Arc::new(mocks.restrictions),
            health: Arc::new(mocks.health),
        }
    }
}
