//! Person Service Library
//!
//! Persons and the records attached to them: student and staff profiles,
//! addresses, emergency contacts, restrictions and health records. The
//! academic service consults it for enrollment eligibility and instructor
//! lookups.

pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use infra::Migrator;
pub use repository::PersonRepositories;
pub use service::{
    NewEmergencyContact, NewRestriction, NewStaff, NewStudent, PersonManager, PersonService,
    StaffManager, StaffService, StaffUpdate, StudentManager, StudentService, StudentUpdate,
};

/// Service container for the person context.
#[derive(Clone)]
pub struct PersonServices {
    pub persons: Arc<dyn PersonService>,
    pub students: Arc<dyn StudentService>,
    pub staff: Arc<dyn StaffService>,
}

impl PersonServices {
    pub fn build(db: DatabaseConnection) -> Self {
        let repos = PersonRepositories::from_connection(db);

        Self {
            persons: Arc::new(PersonManager::new(repos.clone())),
            students: Arc::new(StudentManager::new(repos.clone())),
            staff: Arc::new(StaffManager::new(repos)),
        }
    }
}
