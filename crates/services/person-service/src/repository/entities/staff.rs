//! Staff profile entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use common::AppError;
use domain::person::Staff;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "staff")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub person_id: Uuid,
    #[sea_orm(unique)]
    pub employee_number: String,
    pub department: String,
    pub title: String,
    pub hire_date: Date,
    pub termination_date: Option<Date>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Staff {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Staff {
            id: model.id,
            person_id: model.person_id,
            employee_number: model.employee_number,
            department: model.department,
            title: model.title,
            hire_date: model.hire_date,
            termination_date: model.termination_date,
            status: model.status.parse()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        })
    }
}

impl From<&Staff> for ActiveModel {
    fn from(staff: &Staff) -> Self {
        ActiveModel {
            id: Set(staff.id),
            person_id: Set(staff.person_id),
            employee_number: Set(staff.employee_number.clone()),
            department: Set(staff.department.clone()),
            title: Set(staff.title.clone()),
            hire_date: Set(staff.hire_date),
            termination_date: Set(staff.termination_date),
            status: Set(staff.status.as_str().to_string()),
            created_at: Set(staff.created_at),
            updated_at: Set(staff.updated_at),
            deleted_at: Set(staff.deleted_at),
        }
    }
}
