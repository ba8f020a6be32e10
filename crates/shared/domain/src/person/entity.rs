//! Person aggregate root.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::macros::string_enum;
use crate::validation::{normalize_email, optional_text, required_text};

string_enum! {
    "gender",
    pub enum Gender {
        Male => "male",
        Female => "female",
        Other => "other",
        Undisclosed => "undisclosed",
    }
}

/// A human known to the university; students and staff hang off a person.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Person {
    pub id: Uuid,
    /// Linked login account, if the person has one
    pub user_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for [`Person::new`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewPerson {
    pub user_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub user_id: Option<Uuid>,
}

impl Person {
    pub fn new(input: NewPerson, today: NaiveDate) -> DomainResult<Self> {
        let national_id = input.national_id.trim().to_uppercase();
        if national_id.is_empty() || !national_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::validation("National ID must be alphanumeric"));
        }
        validate_birth_date(input.date_of_birth, today)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            first_name: required_text("First name", &input.first_name)?,
            last_name: required_text("Last name", &input.last_name)?,
            national_id,
            date_of_birth: input.date_of_birth,
            gender: input.gender,
            email: normalize_optional_email(input.email)?,
            phone: optional_text(input.phone),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn apply(&mut self, update: PersonUpdate, today: NaiveDate) -> DomainResult<()> {
        if let Some(first_name) = update.first_name {
            self.first_name = required_text("First name", &first_name)?;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = required_text("Last name", &last_name)?;
        }
        if let Some(date_of_birth) = update.date_of_birth {
            validate_birth_date(date_of_birth, today)?;
            self.date_of_birth = date_of_birth;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if update.email.is_some() {
            self.email = normalize_optional_email(update.email)?;
        }
        if update.phone.is_some() {
            self.phone = optional_text(update.phone);
        }
        if update.user_id.is_some() {
            self.user_id = update.user_id;
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
        if !self.is_deleted() {
            return Err(DomainError::invalid_state("Person is not deleted"));
        }
        self.deleted_at = None;
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn validate_birth_date(date_of_birth: NaiveDate, today: NaiveDate) -> DomainResult<()> {
    if date_of_birth > today {
        return Err(DomainError::validation("Date of birth cannot be in the future"));
    }
    Ok(())
}

fn normalize_optional_email(email: Option<String>) -> DomainResult<Option<String>> {
    optional_text(email).map(|e| normalize_email(&e)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn input() -> NewPerson {
        NewPerson {
            user_id: None,
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            national_id: "ab12345".into(),
            date_of_birth: NaiveDate::from_ymd_opt(2000, 12, 9).unwrap(),
            gender: Gender::Female,
            email: Some("Grace@Uni.edu".into()),
            phone: Some("  ".into()),
        }
    }

    #[test]
    fn test_new_person_normalizes_fields() {
        let person = Person::new(input(), today()).unwrap();
        assert_eq!(person.national_id, "AB12345");
        assert_eq!(person.email.as_deref(), Some("grace@uni.edu"));
        assert_eq!(person.phone, None);
    }

    #[test]
    fn test_future_birth_date_rejected() {
        let mut data = input();
        data.date_of_birth = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert!(Person::new(data, today()).is_err());
    }

    #[test]
    fn test_partial_update() {
        let mut person = Person::new(input(), today()).unwrap();
        person
            .apply(
                PersonUpdate {
                    last_name: Some("Murray".into()),
                    ..Default::default()
                },
                today(),
            )
            .unwrap();
        assert_eq!(person.last_name, "Murray");
        assert_eq!(person.first_name, "Grace");
    }

    #[test]
    fn test_gender_parsing() {
        assert_eq!("other".parse::<Gender>().unwrap(), Gender::Other);
        assert!("x".parse::<Gender>().is_err());
    }
}
