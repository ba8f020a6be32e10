//! Grade entity. Scores are stored as double precision.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::academic::Grade;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grades")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub exam_id: Uuid,
    pub student_id: Uuid,
    pub score: f64,
    pub graded_by: Option<Uuid>,
    pub graded_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Grade {
    fn from(model: Model) -> Self {
        Grade {
            id: model.id,
            exam_id: model.exam_id,
            student_id: model.student_id,
            score: model.score,
            graded_by: model.graded_by,
            graded_at: model.graded_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Grade> for ActiveModel {
    fn from(grade: &Grade) -> Self {
        ActiveModel {
            id: Set(grade.id),
            exam_id: Set(grade.exam_id),
            student_id: Set(grade.student_id),
            score: Set(grade.score),
            graded_by: Set(grade.graded_by),
            graded_at: Set(grade.graded_at),
            updated_at: Set(grade.updated_at),
        }
    }
}
