//! Academic records aggregates.

mod course;
mod enrollment;
mod exam;
mod grade;
mod objection;

pub use course::{Course, CourseSeats, CourseUpdate, NewCourse};
pub use enrollment::{Enrollment, EnrollmentStatus, WaitingListEntry};
pub use exam::{Exam, ExamKind, ExamUpdate, NewExam};
pub use grade::{weighted_score, CourseResult, Grade, GradeResponse, LetterGrade, Transcript};
pub use objection::{GradeObjection, ObjectionStatus};
