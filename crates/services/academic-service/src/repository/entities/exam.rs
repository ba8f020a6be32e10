use sea_orm::entity::prelude::*;
use sea_orm::Set;

use common::AppError;
use domain::academic::Exam;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "exams")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub kind: String,
    pub scheduled_at: DateTimeUtc,
    pub duration_minutes: i32,
    pub location: Option<String>,
    pub weight: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Exam {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Exam {
            id: model.id,
            course_id: model.course_id,
            title: model.title,
            kind: model.kind.parse()?,
            scheduled_at: model.scheduled_at,
            duration_minutes: model.duration_minutes,
            location: model.location,
            weight: model.weight,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Exam> for ActiveModel {
    fn from(exam: &Exam) -> Self {
        ActiveModel {
            id: Set(exam.id),
            course_id: Set(exam.course_id),
            title: Set(exam.title.clone()),
            kind: Set(exam.kind.as_str().to_string()),
            scheduled_at: Set(exam.scheduled_at),
            duration_minutes: Set(exam.duration_minutes),
            location: Set(exam.location.clone()),
            weight: Set(exam.weight),
            created_at: Set(exam.created_at),
            updated_at: Set(exam.updated_at),
        }
    }
}
