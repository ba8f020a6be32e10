//! Addresses and emergency contacts owned by a person.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainResult;
use crate::macros::string_enum;
use crate::validation::{normalize_email, optional_text, required_text};

string_enum! {
    "address kind",
    pub enum AddressKind {
        Home => "home",
        Mailing => "mailing",
        Work => "work",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Address {
    pub id: Uuid,
    pub person_id: Uuid,
    pub kind: AddressKind,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    /// At most one primary address per person
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Address fields supplied on create and replace
#[derive(Debug, Clone, PartialEq)]
pub struct AddressData {
    pub kind: AddressKind,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    pub is_primary: bool,
}

impl Address {
    pub fn new(person_id: Uuid, data: AddressData) -> DomainResult<Self> {
        let now = Utc::now();
        let mut address = Self {
            id: Uuid::new_v4(),
            person_id,
            kind: data.kind,
            line1: String::new(),
            line2: None,
            city: String::new(),
            state: None,
            postal_code: String::new(),
            country: String::new(),
            is_primary: false,
            created_at: now,
            updated_at: now,
        };
        address.replace(data)?;
        Ok(address)
    }

    pub fn replace(&mut self, data: AddressData) -> DomainResult<()> {
        self.kind = data.kind;
        self.line1 = required_text("Address line 1", &data.line1)?;
        self.line2 = optional_text(data.line2);
        self.city = required_text("City", &data.city)?;
        self.state = optional_text(data.state);
        self.postal_code = required_text("Postal code", &data.postal_code)?;
        self.country = required_text("Country", &data.country)?.to_uppercase();
        self.is_primary = data.is_primary;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EmergencyContact {
    pub id: Uuid,
    pub person_id: Uuid,
    pub name: String,
    pub relationship: String,
    pub phone: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl EmergencyContact {
    pub fn new(
        person_id: Uuid,
        name: &str,
        relationship: &str,
        phone: &str,
        email: Option<String>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            person_id,
            name: required_text("Name", name)?,
            relationship: required_text("Relationship", relationship)?,
            phone: required_text("Phone", phone)?,
            email: optional_text(email)
                .map(|e| normalize_email(&e))
                .transpose()?,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_requires_city() {
        let data = AddressData {
            kind: AddressKind::Home,
            line1: "1 Main St".into(),
            line2: None,
            city: " ".into(),
            state: None,
            postal_code: "12345".into(),
            country: "us".into(),
            is_primary: true,
        };
        assert!(Address::new(Uuid::new_v4(), data.clone()).is_err());

        let address = Address::new(
            Uuid::new_v4(),
            AddressData {
                city: "Springfield".into(),
                ..data
            },
        )
        .unwrap();
        assert_eq!(address.country, "US");
        assert!(address.is_primary);
    }

    #[test]
    fn test_contact_email_validated() {
        let result =
            EmergencyContact::new(Uuid::new_v4(), "Bob", "Father", "555", Some("bad".into()));
        assert!(result.is_err());
    }
}
