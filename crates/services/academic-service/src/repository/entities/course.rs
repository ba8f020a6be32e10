//! Course database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::academic::Course;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub credits: i32,
    pub capacity: i32,
    pub semester: String,
    pub instructor_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Course {
    fn from(model: Model) -> Self {
        Course {
            id: model.id,
            code: model.code,
            name: model.name,
            description: model.description,
            credits: model.credits,
            capacity: model.capacity,
            semester: model.semester,
            instructor_id: model.instructor_id,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

impl From<&Course> for ActiveModel {
    fn from(course: &Course) -> Self {
        ActiveModel {
            id: Set(course.id),
            code: Set(course.code.clone()),
            name: Set(course.name.clone()),
            description: Set(course.description.clone()),
            credits: Set(course.credits),
            capacity: Set(course.capacity),
            semester: Set(course.semester.clone()),
            instructor_id: Set(course.instructor_id),
            is_active: Set(course.is_active),
            created_at: Set(course.created_at),
            updated_at: Set(course.updated_at),
            deleted_at: Set(course.deleted_at),
        }
    }
}
