//! Role database entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::identity::Role;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub is_system: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Role {
    fn from(model: Model) -> Self {
        Role {
            id: model.id,
            name: model.name,
            description: model.description,
            is_system: model.is_system,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

impl From<&Role> for ActiveModel {
    fn from(role: &Role) -> Self {
        ActiveModel {
            id: Set(role.id),
            name: Set(role.name.clone()),
            description: Set(role.description.clone()),
            is_system: Set(role.is_system),
            created_at: Set(role.created_at),
            updated_at: Set(role.updated_at),
            deleted_at: Set(role.deleted_at),
        }
    }
}
