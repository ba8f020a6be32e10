//! Student profile entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use common::AppError;
use domain::person::Student;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub person_id: Uuid,
    #[sea_orm(unique)]
    pub student_number: String,
    pub program: String,
    pub enrollment_date: Date,
    pub expected_graduation: Option<Date>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Student {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Student {
            id: model.id,
            person_id: model.person_id,
            student_number: model.student_number,
            program: model.program,
            enrollment_date: model.enrollment_date,
            expected_graduation: model.expected_graduation,
            status: model.status.parse()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        })
    }
}

impl From<&Student> for ActiveModel {
    fn from(student: &Student) -> Self {
        ActiveModel {
            id: Set(student.id),
            person_id: Set(student.person_id),
            student_number: Set(student.student_number.clone()),
            program: Set(student.program.clone()),
            enrollment_date: Set(student.enrollment_date),
            expected_graduation: Set(student.expected_graduation),
            status: Set(student.status.as_str().to_string()),
            created_at: Set(student.created_at),
            updated_at: Set(student.updated_at),
            deleted_at: Set(student.deleted_at),
        }
    }
}
