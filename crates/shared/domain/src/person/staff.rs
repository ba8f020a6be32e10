//! Staff profile.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::macros::string_enum;
use crate::validation::{required_text, RECORD_NUMBER_REGEX};

string_enum! {
    "staff status",
    pub enum StaffStatus {
        Active => "active",
        OnLeave => "on_leave",
        Terminated => "terminated",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Staff {
    pub id: Uuid,
    pub person_id: Uuid,
    pub employee_number: String,
    pub department: String,
    pub title: String,
    pub hire_date: NaiveDate,
    pub termination_date: Option<NaiveDate>,
    pub status: StaffStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Staff {
    pub fn new(
        person_id: Uuid,
        employee_number: &str,
        department: &str,
        title: &str,
        hire_date: NaiveDate,
    ) -> DomainResult<Self> {
        let employee_number = employee_number.trim().to_uppercase();
        if !RECORD_NUMBER_REGEX.is_match(&employee_number) {
            return Err(DomainError::validation(
                "Employee number must be 4-20 uppercase letters or digits",
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            person_id,
            employee_number,
            department: required_text("Department", department)?,
            title: required_text("Title", title)?,
            hire_date,
            termination_date: None,
            status: StaffStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == StaffStatus::Active && self.deleted_at.is_none()
    }

    pub fn update(
        &mut self,
        department: Option<&str>,
        title: Option<&str>,
        status: Option<StaffStatus>,
    ) -> DomainResult<()> {
        if self.status == StaffStatus::Terminated {
            return Err(DomainError::invalid_state("Terminated staff cannot be modified"));
        }
        if let Some(department) = department {
            self.department = required_text("Department", department)?;
        }
        if let Some(title) = title {
            self.title = required_text("Title", title)?;
        }
        match status {
            Some(StaffStatus::Terminated) => {
                return Err(DomainError::validation(
                    "Use the terminate operation to end employment",
                ))
            }
            Some(status) => self.status = status,
            None => {}
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn terminate(&mut self, termination_date: NaiveDate) -> DomainResult<()> {
        if self.status == StaffStatus::Terminated {
            return Err(DomainError::invalid_state("Staff member already terminated"));
        }
        if termination_date < self.hire_date {
            return Err(DomainError::validation(
                "Termination date cannot precede the hire date",
            ));
        }
        self.termination_date = Some(termination_date);
        self.status = StaffStatus::Terminated;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn soft_delete(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff() -> Staff {
        Staff::new(
            Uuid::new_v4(),
            "e1001",
            "Mathematics",
            "Lecturer",
            NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_terminate() {
        let mut staff = staff();
        assert!(staff
            .terminate(NaiveDate::from_ymd_opt(2019, 1, 1).unwrap())
            .is_err());
        staff
            .terminate(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .unwrap();
        assert_eq!(staff.status, StaffStatus::Terminated);
        assert!(!staff.is_active());
        assert!(staff.update(Some("Physics"), None, None).is_err());
    }

    #[test]
    fn test_leave_via_update() {
        let mut staff = staff();
        staff.update(None, None, Some(StaffStatus::OnLeave)).unwrap();
        assert_eq!(staff.status, StaffStatus::OnLeave);
        assert!(staff
            .update(None, None, Some(StaffStatus::Terminated))
            .is_err());
    }
}
