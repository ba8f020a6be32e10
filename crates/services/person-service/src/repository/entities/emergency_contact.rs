use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::person::EmergencyContact;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "emergency_contacts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub person_id: Uuid,
    pub name: String,
    pub relationship: String,
    pub phone: String,
    pub email: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for EmergencyContact {
    fn from(model: Model) -> Self {
        EmergencyContact {
            id: model.id,
            person_id: model.person_id,
            name: model.name,
            relationship: model.relationship,
            phone: model.phone,
            email: model.email,
            created_at: model.created_at,
        }
    }
}

impl From<&EmergencyContact> for ActiveModel {
    fn from(contact: &EmergencyContact) -> Self {
        ActiveModel {
            id: Set(contact.id),
            person_id: Set(contact.person_id),
            name: Set(contact.name.clone()),
            relationship: Set(contact.relationship.clone()),
            phone: Set(contact.phone.clone()),
            email: Set(contact.email.clone()),
            created_at: Set(contact.created_at),
        }
    }
}
