//! Health record, one per person.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::macros::string_enum;
use crate::validation::optional_text;

string_enum! {
    "blood type",
    pub enum BloodType {
        APositive => "A+",
        ANegative => "A-",
        BPositive => "B+",
        BNegative => "B-",
        AbPositive => "AB+",
        AbNegative => "AB-",
        OPositive => "O+",
        ONegative => "O-",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthRecord {
    pub id: Uuid,
    pub person_id: Uuid,
    pub blood_type: Option<BloodType>,
    pub allergies: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub medications: Vec<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthRecordData {
    pub blood_type: Option<BloodType>,
    pub allergies: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub medications: Vec<String>,
    pub notes: Option<String>,
}

impl HealthRecord {
    pub fn new(person_id: Uuid, data: HealthRecordData) -> Self {
        let now = Utc::now();
        let mut record = Self {
            id: Uuid::new_v4(),
            person_id,
            blood_type: None,
            allergies: Vec::new(),
            chronic_conditions: Vec::new(),
            medications: Vec::new(),
            notes: None,
            created_at: now,
            updated_at: now,
        };
        record.replace(data);
        record
    }

    pub fn replace(&mut self, data: HealthRecordData) {
        self.blood_type = data.blood_type;
        self.allergies = clean_list(data.allergies);
        self.chronic_conditions = clean_list(data.chronic_conditions);
        self.medications = clean_list(data.medications);
        self.notes = optional_text(data.notes);
        self.updated_at = Utc::now();
    }
}

/// Trim entries, drop blanks and duplicates, keep first-seen order.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim().to_string();
        if !item.is_empty() && !cleaned.iter().any(|c| c.eq_ignore_ascii_case(&item)) {
            cleaned.push(item);
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_are_cleaned() {
        let record = HealthRecord::new(
            Uuid::new_v4(),
            HealthRecordData {
                allergies: vec!["Peanuts".into(), " ".into(), "peanuts".into(), "Latex ".into()],
                ..Default::default()
            },
        );
        assert_eq!(record.allergies, vec!["Peanuts".to_string(), "Latex".to_string()]);
    }

    #[test]
    fn test_blood_type_text() {
        assert_eq!(BloodType::AbNegative.as_str(), "AB-");
        assert_eq!("O+".parse::<BloodType>().unwrap(), BloodType::OPositive);
        let json = serde_json::to_string(&BloodType::APositive).unwrap();
        assert_eq!(json, "\"A+\"");
    }
}
