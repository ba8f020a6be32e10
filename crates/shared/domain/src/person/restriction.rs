//! Time-boxed restrictions (holds) placed on a person.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::macros::string_enum;
use crate::validation::{optional_text, required_text};

string_enum! {
    "restriction kind",
    pub enum RestrictionKind {
        Academic => "academic",
        Financial => "financial",
        Disciplinary => "disciplinary",
        Administrative => "administrative",
    }
}

impl RestrictionKind {
    /// Whether an active restriction of this kind prevents enrollment
    pub fn blocks_enrollment(self) -> bool {
        !matches!(self, RestrictionKind::Administrative)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PersonRestriction {
    pub id: Uuid,
    pub person_id: Uuid,
    pub kind: RestrictionKind,
    pub reason: String,
    pub starts_at: DateTime<Utc>,
    /// Open-ended when absent
    pub ends_at: Option<DateTime<Utc>>,
    pub lifted_at: Option<DateTime<Utc>>,
    pub lifted_reason: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PersonRestriction {
    pub fn new(
        person_id: Uuid,
        kind: RestrictionKind,
        reason: &str,
        starts_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
        created_by: Option<Uuid>,
    ) -> DomainResult<Self> {
        if let Some(ends_at) = ends_at {
            if ends_at <= starts_at {
                return Err(DomainError::validation(
                    "Restriction end must be after its start",
                ));
            }
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            person_id,
            kind,
            reason: required_text("Reason", reason)?,
            starts_at,
            ends_at,
            lifted_at: None,
            lifted_reason: None,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// In force at `now`: not lifted, started, and not yet ended.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.lifted_at.is_none()
            && self.starts_at <= now
            && self.ends_at.map_or(true, |end| now < end)
    }

    pub fn blocks_enrollment(&self, now: DateTime<Utc>) -> bool {
        self.kind.blocks_enrollment() && self.is_active(now)
    }

    pub fn lift(&mut self, now: DateTime<Utc>, reason: Option<String>) -> DomainResult<()> {
        if self.lifted_at.is_some() {
            return Err(DomainError::invalid_state("Restriction already lifted"));
        }
        self.lifted_at = Some(now);
        self.lifted_reason = optional_text(reason);
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn restriction(starts: DateTime<Utc>, ends: Option<DateTime<Utc>>) -> PersonRestriction {
        PersonRestriction::new(
            Uuid::new_v4(),
            RestrictionKind::Financial,
            "Unpaid fees",
            starts,
            ends,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_activity_window() {
        let now = Utc::now();
        let r = restriction(now - Duration::days(1), Some(now + Duration::days(1)));
        assert!(r.is_active(now));
        assert!(!r.is_active(now - Duration::days(2)));
        assert!(!r.is_active(now + Duration::days(1)));
    }

    #[test]
    fn test_open_ended_restriction() {
        let now = Utc::now();
        let r = restriction(now, None);
        assert!(r.is_active(now + Duration::days(3650)));
    }

    #[test]
    fn test_lifted_restriction_inactive() {
        let now = Utc::now();
        let mut r = restriction(now - Duration::hours(1), None);
        r.lift(now, Some("Paid".into())).unwrap();
        assert!(!r.is_active(now));
        assert!(r.lift(now, None).is_err());
    }

    #[test]
    fn test_end_before_start_rejected() {
        let now = Utc::now();
        let result = PersonRestriction::new(
            Uuid::new_v4(),
            RestrictionKind::Academic,
            "Probation",
            now,
            Some(now - Duration::days(1)),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_administrative_does_not_block() {
        let now = Utc::now();
        let mut r = restriction(now - Duration::hours(1), None);
        assert!(r.blocks_enrollment(now));
        r.kind = RestrictionKind::Administrative;
        assert!(!r.blocks_enrollment(now));
    }
}
