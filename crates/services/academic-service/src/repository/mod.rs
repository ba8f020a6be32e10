//! Repository layer for data access.

pub mod entities;
mod course_repository;
mod enrollment_repository;
mod exam_repository;
mod grade_repository;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use course_repository::{CourseRepository, CourseStore};
pub use enrollment_repository::{
    EnrollmentFilter, EnrollmentRepository, EnrollmentStore, WaitingListRepository,
    WaitingListStore,
};
pub use exam_repository::{ExamRepository, ExamStore};
pub use grade_repository::{
    GradeFilter, GradeRepository, GradeStore, ObjectionRepository, ObjectionStore,
};

#[cfg(any(test, feature = "test-utils"))]
pub use course_repository::MockCourseRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use enrollment_repository::{MockEnrollmentRepository, MockWaitingListRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use exam_repository::MockExamRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use grade_repository::{MockGradeRepository, MockObjectionRepository};

/// Every academic repository, shared by the service managers.
#[derive(Clone)]
pub struct AcademicRepositories {
    pub courses: Arc<dyn CourseRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub waiting_list: Arc<dyn WaitingListRepository>,
    pub exams: Arc<dyn ExamRepository>,
    pub grades: Arc<dyn GradeRepository>,
    pub objections: Arc<dyn ObjectionRepository>,
}

impl AcademicRepositories {
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self {
            courses: Arc::new(CourseStore::new(db.clone())),
            enrollments: Arc::new(EnrollmentStore::new(db.clone())),
            waiting_list: Arc::new(WaitingListStore::new(db.clone())),
            exams: Arc::new(ExamStore::new(db.clone())),
            grades: Arc::new(GradeStore::new(db.clone())),
            objections: Arc::new(ObjectionStore::new(db)),
        }
    }
}
