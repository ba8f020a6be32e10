use sea_orm::entity::prelude::*;
use sea_orm::Set;

use common::AppError;
use domain::academic::GradeObjection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grade_objections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub grade_id: Uuid,
    pub student_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub response: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub original_score: f64,
    pub revised_score: Option<f64>,
    pub created_at: DateTimeUtc,
    pub resolved_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for GradeObjection {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(GradeObjection {
            id: model.id,
            grade_id: model.grade_id,
            student_id: model.student_id,
            reason: model.reason,
            status: model.status.parse()?,
            response: model.response,
            reviewed_by: model.reviewed_by,
            original_score: model.original_score,
            revised_score: model.revised_score,
            created_at: model.created_at,
            resolved_at: model.resolved_at,
        })
    }
}

impl From<&GradeObjection> for ActiveModel {
    fn from(objection: &GradeObjection) -> Self {
        ActiveModel {
            id: Set(objection.id),
            grade_id: Set(objection.grade_id),
            student_id: Set(objection.student_id),
            reason: Set(objection.reason.clone()),
            status: Set(objection.status.as_str().to_string()),
            response: Set(objection.response.clone()),
            reviewed_by: Set(objection.reviewed_by),
            original_score: Set(objection.original_score),
            revised_score: Set(objection.revised_score),
            created_at: Set(objection.created_at),
            resolved_at: Set(objection.resolved_at),
        }
    }
}
