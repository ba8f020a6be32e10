//! Exam grades, letter grades and course results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_SCORE, MIN_SCORE};
use crate::error::{DomainError, DomainResult};
use crate::macros::string_enum;

string_enum! {
    "letter grade",
    pub enum LetterGrade {
        A => "A",
        B => "B",
        C => "C",
        D => "D",
        F => "F",
    }
}

impl LetterGrade {
    /// A >= 90, B >= 80, C >= 70, D >= 60, otherwise F.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => LetterGrade::A,
            s if s >= 80.0 => LetterGrade::B,
            s if s >= 70.0 => LetterGrade::C,
            s if s >= 60.0 => LetterGrade::D,
            _ => LetterGrade::F,
        }
    }

    pub fn grade_points(self) -> f64 {
        match self {
            LetterGrade::A => 4.0,
            LetterGrade::B => 3.0,
            LetterGrade::C => 2.0,
            LetterGrade::D => 1.0,
            LetterGrade::F => 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Grade {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub student_id: Uuid,
    pub score: f64,
    pub graded_by: Option<Uuid>,
    pub graded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Grade {
    pub fn new(
        exam_id: Uuid,
        student_id: Uuid,
        score: f64,
        graded_by: Option<Uuid>,
    ) -> DomainResult<Self> {
        validate_score(score)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            exam_id,
            student_id,
            score,
            graded_by,
            graded_at: now,
            updated_at: now,
        })
    }

    pub fn letter(&self) -> LetterGrade {
        LetterGrade::from_score(self.score)
    }

    pub fn update_score(&mut self, score: f64, graded_by: Option<Uuid>) -> DomainResult<()> {
        validate_score(score)?;
        self.score = score;
        if graded_by.is_some() {
            self.graded_by = graded_by;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

pub fn validate_score(score: f64) -> DomainResult<()> {
    if !score.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(DomainError::validation(format!(
            "Score must be between {} and {}",
            MIN_SCORE, MAX_SCORE
        )));
    }
    Ok(())
}

/// Grade with its letter, as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GradeResponse {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub student_id: Uuid,
    pub score: f64,
    pub letter: LetterGrade,
    pub graded_by: Option<Uuid>,
    pub graded_at: DateTime<Utc>,
}

impl From<Grade> for GradeResponse {
    fn from(grade: Grade) -> Self {
        Self {
            letter: grade.letter(),
            id: grade.id,
            exam_id: grade.exam_id,
            student_id: grade.student_id,
            score: grade.score,
            graded_by: grade.graded_by,
            graded_at: grade.graded_at,
        }
    }
}

/// Weighted average of `(score, weight)` pairs, `None` when nothing is graded.
pub fn weighted_score(scores: &[(f64, i32)]) -> Option<f64> {
    let total_weight: i32 = scores.iter().map(|(_, w)| *w).sum();
    if total_weight <= 0 {
        return None;
    }
    let weighted: f64 = scores.iter().map(|(s, w)| s * f64::from(*w)).sum();
    Some((weighted / f64::from(total_weight) * 100.0).round() / 100.0)
}

/// One course line of a transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CourseResult {
    pub course_id: Uuid,
    pub course_code: String,
    pub course_name: String,
    pub credits: i32,
    /// Weighted over graded exams only
    pub weighted_score: Option<f64>,
    pub letter: Option<LetterGrade>,
    pub graded_weight: i32,
}

/// Transcript for a student across all non-dropped enrollments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Transcript {
    pub student_id: Uuid,
    pub courses: Vec<CourseResult>,
    /// Credit-weighted grade point average over graded courses
    pub gpa: Option<f64>,
}

impl Transcript {
    pub fn new(student_id: Uuid, courses: Vec<CourseResult>) -> Self {
        let graded: Vec<(f64, i32)> = courses
            .iter()
            .filter_map(|c| c.letter.map(|l| (l.grade_points(), c.credits)))
            .collect();
        let gpa = weighted_score(&graded);
        Self {
            student_id,
            courses,
            gpa,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_cutoffs() {
        assert_eq!(LetterGrade::from_score(100.0), LetterGrade::A);
        assert_eq!(LetterGrade::from_score(90.0), LetterGrade::A);
        assert_eq!(LetterGrade::from_score(89.99), LetterGrade::B);
        assert_eq!(LetterGrade::from_score(70.0), LetterGrade::C);
        assert_eq!(LetterGrade::from_score(60.0), LetterGrade::D);
        assert_eq!(LetterGrade::from_score(59.9), LetterGrade::F);
    }

    #[test]
    fn test_score_range() {
        assert!(Grade::new(Uuid::new_v4(), Uuid::new_v4(), 101.0, None).is_err());
        assert!(Grade::new(Uuid::new_v4(), Uuid::new_v4(), -1.0, None).is_err());
        assert!(Grade::new(Uuid::new_v4(), Uuid::new_v4(), f64::NAN, None).is_err());
        assert!(Grade::new(Uuid::new_v4(), Uuid::new_v4(), 0.0, None).is_ok());
    }

    #[test]
    fn test_weighted_score() {
        assert_eq!(weighted_score(&[]), None);
        assert_eq!(weighted_score(&[(80.0, 40), (90.0, 60)]), Some(86.0));
        assert_eq!(weighted_score(&[(70.0, 10)]), Some(70.0));
    }

    #[test]
    fn test_transcript_gpa() {
        let line = |letter, credits| CourseResult {
            course_id: Uuid::new_v4(),
            course_code: "CS101".into(),
            course_name: "Intro".into(),
            credits,
            weighted_score: None,
            letter,
            graded_weight: 0,
        };
        let transcript = Transcript::new(
            Uuid::new_v4(),
            vec![line(Some(LetterGrade::A), 6), line(Some(LetterGrade::C), 3), line(None, 3)],
        );
        assert_eq!(transcript.gpa, Some(3.33));
    }
}
