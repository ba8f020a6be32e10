//! Person restriction (hold) entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use common::AppError;
use domain::person::PersonRestriction;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "person_restrictions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub person_id: Uuid,
    pub kind: String,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub starts_at: DateTimeUtc,
    pub ends_at: Option<DateTimeUtc>,
    pub lifted_at: Option<DateTimeUtc>,
    #[sea_orm(column_type = "Text", nullable)]
    pub lifted_reason: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for PersonRestriction {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(PersonRestriction {
            id: model.id,
            person_id: model.person_id,
            kind: model.kind.parse()?,
            reason: model.reason,
            starts_at: model.starts_at,
            ends_at: model.ends_at,
            lifted_at: model.lifted_at,
            lifted_reason: model.lifted_reason,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&PersonRestriction> for ActiveModel {
    fn from(restriction: &PersonRestriction) -> Self {
        ActiveModel {
            id: Set(restriction.id),
            person_id: Set(restriction.person_id),
            kind: Set(restriction.kind.as_str().to_string()),
            reason: Set(restriction.reason.clone()),
            starts_at: Set(restriction.starts_at),
            ends_at: Set(restriction.ends_at),
            lifted_at: Set(restriction.lifted_at),
            lifted_reason: Set(restriction.lifted_reason.clone()),
            created_by: Set(restriction.created_by),
            created_at: Set(restriction.created_at),
            updated_at: Set(restriction.updated_at),
        }
    }
}
