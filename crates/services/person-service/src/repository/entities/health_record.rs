//! Health record entity. List fields are stored as JSON arrays.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use common::AppError;
use domain::person::{BloodType, HealthRecord};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "health_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub person_id: Uuid,
    pub blood_type: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub allergies: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub chronic_conditions: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub medications: Json,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn string_list(field: &str, value: Json) -> Result<Vec<String>, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::internal(format!("Corrupt health record {}: {}", field, e)))
}

impl TryFrom<Model> for HealthRecord {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(HealthRecord {
            id: model.id,
            person_id: model.person_id,
            blood_type: model.blood_type.as_deref().map(str::parse::<BloodType>).transpose()?,
            allergies: string_list("allergies", model.allergies)?,
            chronic_conditions: string_list("chronic conditions", model.chronic_conditions)?,
            medications: string_list("medications", model.medications)?,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&HealthRecord> for ActiveModel {
    fn from(record: &HealthRecord) -> Self {
        ActiveModel {
            id: Set(record.id),
            person_id: Set(record.person_id),
            blood_type: Set(record.blood_type.map(|b| b.as_str().to_string())),
            allergies: Set(Json::from(record.allergies.clone())),
            chronic_conditions: Set(Json::from(record.chronic_conditions.clone())),
            medications: Set(Json::from(record.medications.clone())),
            notes: Set(record.notes.clone()),
            created_at: Set(record.created_at),
            updated_at: Set(record.updated_at),
        }
    }
}
