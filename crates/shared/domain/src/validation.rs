//! Field validation rules shared by aggregates and request DTOs.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{MAX_NAME_LENGTH, MAX_USERNAME_LENGTH, MIN_USERNAME_LENGTH};
use crate::error::{DomainError, DomainResult};

pub static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

pub static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("valid username regex"));

pub static ROLE_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_-]{2,50}$").expect("valid role regex"));

pub static PERMISSION_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9_]*\.[a-z][a-z0-9_]*$").expect("valid permission regex")
});

pub static COURSE_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,5}[0-9]{3,4}$").expect("valid course code regex"));

pub static SEMESTER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-(FALL|SPRING|SUMMER)$").expect("valid semester regex"));

pub static RECORD_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{4,20}$").expect("valid record number regex"));

/// Trim a required text field and reject blanks or overlong values.
pub fn required_text(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} is required", field)));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(DomainError::validation(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

/// Normalize an optional text field; blank strings become `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Lowercase and validate an email address.
pub fn normalize_email(email: &str) -> DomainResult<String> {
    let email = email.trim().to_lowercase();
    if !EMAIL_REGEX.is_match(&email) {
        return Err(DomainError::validation("Invalid email format"));
    }
    Ok(email)
}

pub fn validate_username(username: &str) -> DomainResult<String> {
    let username = username.trim();
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(DomainError::validation(format!(
            "Username must be between {} and {} characters",
            MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
        )));
    }
    if !USERNAME_REGEX.is_match(username) {
        return Err(DomainError::validation(
            "Username may only contain letters, digits, '.', '_' and '-'",
        ));
    }
    Ok(username.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text("Name", "  Ada ").unwrap(), "Ada");
        assert!(required_text("Name", "   ").is_err());
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        assert_eq!(optional_text(Some("  ".to_string())), None);
        assert_eq!(optional_text(Some(" x ".to_string())), Some("x".to_string()));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Ada@Uni.EDU ").unwrap(), "ada@uni.edu");
        assert!(normalize_email("not-an-email").is_err());
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("ada.lovelace").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_patterns() {
        assert!(COURSE_CODE_REGEX.is_match("CS101"));
        assert!(!COURSE_CODE_REGEX.is_match("cs101"));
        assert!(SEMESTER_REGEX.is_match("2025-FALL"));
        assert!(!SEMESTER_REGEX.is_match("2025-WINTER"));
        assert!(PERMISSION_NAME_REGEX.is_match("grades.write"));
        assert!(!PERMISSION_NAME_REGEX.is_match("grades"));
        assert!(RECORD_NUMBER_REGEX.is_match("S2025001"));
    }
}
