//! Service layer for academic use cases.

mod course_service;
mod enrollment_service;
mod exam_service;
mod grade_service;

pub use course_service::{CourseManager, CourseService};
pub use enrollment_service::{EnrollmentManager, EnrollmentService};
pub use exam_service::{ExamManager, ExamService};
pub use grade_service::{GradeManager, GradeService};

#[cfg(any(test, feature = "test-utils"))]
pub use course_service::MockCourseService;
#[cfg(any(test, feature = "test-utils"))]
pub use enrollment_service::MockEnrollmentService;
#[cfg(any(test, feature = "test-utils"))]
pub use exam_service::MockExamService;
#[cfg(any(test, feature = "test-utils"))]
pub use grade_service::MockGradeService;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use domain::academic::{Course, Exam, ExamKind, NewCourse, NewExam};
    use domain::person::{EnrollmentEligibility, StudentStatus};

    use crate::repository::{
        AcademicRepositories, MockCourseRepository, MockEnrollmentRepository,
        MockExamRepository, MockGradeRepository, MockObjectionRepository,
        MockWaitingListRepository,
    };

    #[derive(Default)]
    pub struct Mocks {
        pub courses: MockCourseRepository,
        pub enrollments: MockEnrollmentRepository,
        pub waiting_list: MockWaitingListRepository,
        pub exams: MockExamRepository,
        pub grades: MockGradeRepository,
        pub objections: MockObjectionRepository,
    }

    pub fn repos(mocks: Mocks) -> AcademicRepositories {
        AcademicRepositories {
            courses: Arc::new(mocks.courses),
            enrollments: Arc::new(mocks.enrollments),
            waiting_list: Arc::new(mocks.waiting_list),
            exams: Arc::new(mocks.exams),
            grades: Arc::new(mocks.grades),
            objections: Arc::new(mocks.objections),
        }
    }

    pub fn course(capacity: i32) -> Course {
        Course::new(NewCourse {
            code: "CS101".to_string(),
            name: "Introduction to Programming".to_string(),
            description: None,
            credits: 6,
            capacity,
            semester: "2025-FALL".to_string(),
            instructor_id: None,
        })
        .unwrap()
    }

    pub fn exam(course_id: Uuid, weight: i32) -> Exam {
        Exam::new(
            NewExam {
                course_id,
                title: "Midterm".to_string(),
                kind: ExamKind::Midterm,
                scheduled_at: Utc::now() + Duration::days(30),
                duration_minutes: 90,
                location: None,
                weight,
            },
            0,
        )
        .unwrap()
    }

    pub fn eligible(student_id: Uuid) -> EnrollmentEligibility {
        EnrollmentEligibility {
            student_id,
            status: StudentStatus::Active,
            blocking_restrictions: vec![],
        }
    }
}
