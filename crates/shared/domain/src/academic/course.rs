//! Course catalogue entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_COURSE_CREDITS, MIN_COURSE_CREDITS};
use crate::error::{DomainError, DomainResult};
use crate::validation::{optional_text, required_text, COURSE_CODE_REGEX, SEMESTER_REGEX};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Course {
    pub id: Uuid,
    /// Catalogue code such as `CS101`
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: i32,
    /// Maximum number of concurrently enrolled students
    pub capacity: i32,
    /// `YYYY-FALL`, `YYYY-SPRING` or `YYYY-SUMMER`
    pub semester: String,
    /// Staff member teaching the course
    pub instructor_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: i32,
    pub capacity: i32,
    pub semester: String,
    pub instructor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub credits: Option<i32>,
    pub capacity: Option<i32>,
    pub instructor_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

impl Course {
    pub fn new(input: NewCourse) -> DomainResult<Self> {
        let code = input.code.trim().to_uppercase();
        if !COURSE_CODE_REGEX.is_match(&code) {
            return Err(DomainError::validation(
                "Course code must be 2-5 letters followed by 3-4 digits",
            ));
        }
        let semester = input.semester.trim().to_uppercase();
        if !SEMESTER_REGEX.is_match(&semester) {
            return Err(DomainError::validation(
                "Semester must look like 2025-FALL, 2025-SPRING or 2025-SUMMER",
            ));
        }
        validate_credits(input.credits)?;
        validate_capacity(input.capacity)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            code,
            name: required_text("Course name", &input.name)?,
            description: optional_text(input.description),
            credits: input.credits,
            capacity: input.capacity,
            semester,
            instructor_id: input.instructor_id,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    pub fn is_open(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }

    /// Apply an update. `enrolled` is the current number of active enrollments,
    /// capacity cannot drop below it.
    pub fn apply(&mut self, update: CourseUpdate, enrolled: u64) -> DomainResult<()> {
        if let Some(name) = update.name {
            self.name = required_text("Course name", &name)?;
        }
        if update.description.is_some() {
            self.description = optional_text(update.description);
        }
        if let Some(credits) = update.credits {
            validate_credits(credits)?;
            self.credits = credits;
        }
        if let Some(capacity) = update.capacity {
            validate_capacity(capacity)?;
            if (capacity as u64) < enrolled {
                return Err(DomainError::validation(format!(
                    "Capacity cannot be lower than the {} students already enrolled",
                    enrolled
                )));
            }
            self.capacity = capacity;
        }
        if update.instructor_id.is_some() {
            self.instructor_id = update.instructor_id;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn soft_delete(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    pub fn restore(&mut self) -> DomainResult<()> {
        if self.deleted_at.is_none() {
            return Err(DomainError::invalid_state("Course is not deleted"));
        }
        self.deleted_at = None;
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn validate_credits(credits: i32) -> DomainResult<()> {
    if !(MIN_COURSE_CREDITS..=MAX_COURSE_CREDITS).contains(&credits) {
        return Err(DomainError::validation(format!(
            "Credits must be between {} and {}",
            MIN_COURSE_CREDITS, MAX_COURSE_CREDITS
        )));
    }
    Ok(())
}

fn validate_capacity(capacity: i32) -> DomainResult<()> {
    if capacity <= 0 {
        return Err(DomainError::validation("Capacity must be positive"));
    }
    Ok(())
}

/// Seat usage for a course
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CourseSeats {
    pub course_id: Uuid,
    pub capacity: u64,
    pub enrolled: u64,
    pub available: u64,
    pub waiting: u64,
}

impl CourseSeats {
    pub fn new(course: &Course, enrolled: u64, waiting: u64) -> Self {
        let capacity = course.capacity.max(0) as u64;
        Self {
            course_id: course.id,
            capacity,
            enrolled,
            available: capacity.saturating_sub(enrolled),
            waiting,
        }
    }

    pub fn is_full(&self) -> bool {
        self.available == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn new_course() -> NewCourse {
        NewCourse {
            code: "cs101".into(),
            name: "Intro to Programming".into(),
            description: None,
            credits: 6,
            capacity: 2,
            semester: "2025-fall".into(),
            instructor_id: None,
        }
    }

    #[test]
    fn test_new_course_normalizes() {
        let course = Course::new(new_course()).unwrap();
        assert_eq!(course.code, "CS101");
        assert_eq!(course.semester, "2025-FALL");
        assert!(course.is_open());
    }

    #[test]
    fn test_invalid_code_and_credits() {
        let mut input = new_course();
        input.code = "101CS".into();
        assert!(Course::new(input).is_err());

        let mut input = new_course();
        input.credits = 0;
        assert!(Course::new(input).is_err());
    }

    #[test]
    fn test_capacity_not_below_enrolled() {
        let mut course = Course::new(new_course()).unwrap();
        let update = CourseUpdate {
            capacity: Some(1),
            ..Default::default()
        };
        assert!(course.apply(update.clone(), 2).is_err());
        assert!(course.apply(update, 1).is_ok());
        assert_eq!(course.capacity, 1);
    }

    #[test]
    fn test_seats() {
        let course = Course::new(new_course()).unwrap();
        let seats = CourseSeats::new(&course, 2, 3);
        assert_eq!(seats.available, 0);
        assert!(seats.is_full());
        assert!(!CourseSeats::new(&course, 1, 0).is_full());
    }
}
