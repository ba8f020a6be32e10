//! Person database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use common::AppError;
use domain::person::Person;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "persons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub national_id: String,
    pub date_of_birth: Date,
    pub gender: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Person {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Person {
            id: model.id,
            user_id: model.user_id,
            first_name: model.first_name,
            last_name: model.last_name,
            national_id: model.national_id,
            date_of_birth: model.date_of_birth,
            gender: model.gender.parse()?,
            email: model.email,
            phone: model.phone,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        })
    }
}

impl From<&Person> for ActiveModel {
    fn from(person: &Person) -> Self {
        ActiveModel {
            id: Set(person.id),
            user_id: Set(person.user_id),
            first_name: Set(person.first_name.clone()),
            last_name: Set(person.last_name.clone()),
            national_id: Set(person.national_id.clone()),
            date_of_birth: Set(person.date_of_birth),
            gender: Set(person.gender.as_str().to_string()),
            email: Set(person.email.clone()),
            phone: Set(person.phone.clone()),
            created_at: Set(person.created_at),
            updated_at: Set(person.updated_at),
            deleted_at: Set(person.deleted_at),
        }
    }
}
