use sea_orm::entity::prelude::*;
use sea_orm::Set;

use common::AppError;
use domain::person::Address;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "addresses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub person_id: Uuid,
    pub kind: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    pub is_primary: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Address {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Address {
            id: model.id,
            person_id: model.person_id,
            kind: model.kind.parse()?,
            line1: model.line1,
            line2: model.line2,
            city: model.city,
            state: model.state,
            postal_code: model.postal_code,
            country: model.country,
            is_primary: model.is_primary,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Address> for ActiveModel {
    fn from(address: &Address) -> Self {
        ActiveModel {
            id: Set(address.id),
            person_id: Set(address.person_id),
            kind: Set(address.kind.as_str().to_string()),
            line1: Set(address.line1.clone()),
            line2: Set(address.line2.clone()),
            city: Set(address.city.clone()),
            state: Set(address.state.clone()),
            postal_code: Set(address.postal_code.clone()),
            country: Set(address.country.clone()),
            is_primary: Set(address.is_primary),
            created_at: Set(address.created_at),
            updated_at: Set(address.updated_at),
        }
    }
}
