//! Repository layer for data access.

pub mod entities;
mod contact_repository;
mod health_repository;
mod person_repository;
mod restriction_repository;
mod staff_repository;
mod student_repository;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use contact_repository::{ContactRepository, ContactStore};
pub use health_repository::{HealthRecordRepository, HealthRecordStore};
pub use person_repository::{PersonRepository, PersonStore};
pub use restriction_repository::{RestrictionRepository, RestrictionStore};
pub use staff_repository::{StaffRepository, StaffStore};
pub use student_repository::{StudentRepository, StudentStore};

#[cfg(any(test, feature = "test-utils"))]
pub use contact_repository::MockContactRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use health_repository::MockHealthRecordRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use person_repository::MockPersonRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use restriction_repository::MockRestrictionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use staff_repository::MockStaffRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use student_repository::MockStudentRepository;

/// Every person repository, shared by the service managers.
#[derive(Clone)]
pub struct PersonRepositories {
    pub persons: Arc<dyn PersonRepository>,
    pub students: Arc<dyn StudentRepository>,
    pub staff: Arc<dyn StaffRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub restrictions: Arc<dyn RestrictionRepository>,
    pub health: Arc<dyn HealthRecordRepository>,
}

impl PersonRepositories {
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self {
            persons: Arc::new(PersonStore::new(db.clone())),
            students: Arc::new(StudentStore::new(db.clone())),
            staff: Arc::new(StaffStore::new(db.clone())),
            contacts: Arc::new(ContactStore::new(db.clone())),
            restrictions: Arc::new(RestrictionStore::new(db.clone())),
            health: Arc::new(HealthRecordStore::new(db)),
        }
    }
}
