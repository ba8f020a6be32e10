use sea_orm::entity::prelude::*;
use sea_orm::Set;

use common::AppError;
use domain::academic::Enrollment;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub status: String,
    pub enrolled_at: DateTimeUtc,
    pub dropped_at: Option<DateTimeUtc>,
    pub completed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Enrollment {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Enrollment {
            id: model.id,
            student_id: model.student_id,
            course_id: model.course_id,
            status: model.status.parse()?,
            enrolled_at: model.enrolled_at,
            dropped_at: model.dropped_at,
            completed_at: model.completed_at,
        })
    }
}

impl From<&Enrollment> for ActiveModel {
    fn from(enrollment: &Enrollment) -> Self {
        ActiveModel {
            id: Set(enrollment.id),
            student_id: Set(enrollment.student_id),
            course_id: Set(enrollment.course_id),
            status: Set(enrollment.status.as_str().to_string()),
            enrolled_at: Set(enrollment.enrolled_at),
            dropped_at: Set(enrollment.dropped_at),
            completed_at: Set(enrollment.completed_at),
        }
    }
}
