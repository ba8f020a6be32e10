//! Academic Service Library
//!
//! Courses, enrollments with waiting lists, exams, grades, transcripts and
//! grade objections. Student eligibility and instructor lookups go through
//! [`clients::PersonDirectory`].

pub mod clients;
pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use clients::{PersonClient, PersonDirectory};
pub use infra::Migrator;
pub use repository::{AcademicRepositories, EnrollmentFilter, GradeFilter};
pub use service::{
    CourseManager, CourseService, EnrollmentManager, EnrollmentService, ExamManager, ExamService,
    GradeManager, GradeService,
};

/// Service container for the academic context.
#[derive(Clone)]
pub struct AcademicServices {
    pub courses: Arc<dyn CourseService>,
    pub enrollments: Arc<dyn EnrollmentService>,
    pub exams: Arc<dyn ExamService>,
    pub grades: Arc<dyn GradeService>,
}

impl AcademicServices {
    pub fn build(db: DatabaseConnection, people: Arc<dyn PersonDirectory>) -> Self {
        let repos = AcademicRepositories::from_connection(db);

        Self {
            courses: Arc::new(CourseManager::new(repos.clone(), people.clone())),
            enrollments: Arc::new(EnrollmentManager::new(repos.clone(), people)),
            exams: Arc::new(ExamManager::new(repos.clone())),
            grades: Arc::new(GradeManager::new(repos)),
        }
    }
}
