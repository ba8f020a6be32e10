//! Exams and their weighting within a course.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_EXAM_DURATION_MINUTES, MAX_TOTAL_EXAM_WEIGHT, MIN_EXAM_DURATION_MINUTES};
use crate::error::{DomainError, DomainResult};
use crate::macros::string_enum;
use crate::validation::{optional_text, required_text};

string_enum! {
    "exam kind",
    pub enum ExamKind {
        Quiz => "quiz",
        Midterm => "midterm",
        Final => "final",
        Makeup => "makeup",
        Project => "project",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Exam {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub kind: ExamKind,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub location: Option<String>,
    /// Share of the final course score, in percent
    pub weight: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExam {
    pub course_id: Uuid,
    pub title: String,
    pub kind: ExamKind,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub location: Option<String>,
    pub weight: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExamUpdate {
    pub title: Option<String>,
    pub kind: Option<ExamKind>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
    pub weight: Option<i32>,
}

impl Exam {
    /// `other_weights` is the summed weight of the course's other exams.
    pub fn new(input: NewExam, other_weights: i32) -> DomainResult<Self> {
        validate_duration(input.duration_minutes)?;
        validate_weight(input.weight, other_weights)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            course_id: input.course_id,
            title: required_text("Title", &input.title)?,
            kind: input.kind,
            scheduled_at: input.scheduled_at,
            duration_minutes: input.duration_minutes,
            location: optional_text(input.location),
            weight: input.weight,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, update: ExamUpdate, other_weights: i32) -> DomainResult<()> {
        if let Some(title) = update.title {
            self.title = required_text("Title", &title)?;
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(scheduled_at) = update.scheduled_at {
            self.scheduled_at = scheduled_at;
        }
        if let Some(duration) = update.duration_minutes {
            validate_duration(duration)?;
            self.duration_minutes = duration;
        }
        if update.location.is_some() {
            self.location = optional_text(update.location);
        }
        if let Some(weight) = update.weight {
            validate_weight(weight, other_weights)?;
            self.weight = weight;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn validate_duration(minutes: i32) -> DomainResult<()> {
    if !(MIN_EXAM_DURATION_MINUTES..=MAX_EXAM_DURATION_MINUTES).contains(&minutes) {
        return Err(DomainError::validation(format!(
            "Duration must be between {} and {} minutes",
            MIN_EXAM_DURATION_MINUTES, MAX_EXAM_DURATION_MINUTES
        )));
    }
    Ok(())
}

fn validate_weight(weight: i32, other_weights: i32) -> DomainResult<()> {
    if !(1..=MAX_TOTAL_EXAM_WEIGHT).contains(&weight) {
        return Err(DomainError::validation(format!(
            "Weight must be between 1 and {}",
            MAX_TOTAL_EXAM_WEIGHT
        )));
    }
    if other_weights + weight > MAX_TOTAL_EXAM_WEIGHT {
        return Err(DomainError::validation(format!(
            "Exam weights for a course cannot exceed {} (remaining: {})",
            MAX_TOTAL_EXAM_WEIGHT,
            (MAX_TOTAL_EXAM_WEIGHT - other_weights).max(0)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(weight: i32) -> NewExam {
        NewExam {
            course_id: Uuid::new_v4(),
            title: "Midterm".into(),
            kind: ExamKind::Midterm,
            scheduled_at: Utc::now(),
            duration_minutes: 90,
            location: Some("Hall A".into()),
            weight,
        }
    }

    #[test]
    fn test_weight_budget() {
        assert!(Exam::new(input(40), 60).is_ok());
        assert!(Exam::new(input(41), 60).is_err());
        assert!(Exam::new(input(0), 0).is_err());
    }

    #[test]
    fn test_update_weight_checks_budget() {
        let mut exam = Exam::new(input(30), 50).unwrap();
        let update = ExamUpdate {
            weight: Some(60),
            ..Default::default()
        };
        assert!(exam.apply(update, 50).is_err());
        assert_eq!(exam.weight, 30);
    }

    #[test]
    fn test_duration_range() {
        let mut data = input(10);
        data.duration_minutes = 0;
        assert!(Exam::new(data, 0).is_err());
    }
}
