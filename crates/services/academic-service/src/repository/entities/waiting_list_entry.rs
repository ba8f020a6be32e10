use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::academic::WaitingListEntry;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "waiting_list_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub course_id: Uuid,
    pub student_id: Uuid,
    pub position: i32,
    pub joined_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for WaitingListEntry {
    fn from(model: Model) -> Self {
        WaitingListEntry {
            id: model.id,
            course_id: model.course_id,
            student_id: model.student_id,
            position: model.position,
            joined_at: model.joined_at,
        }
    }
}

impl From<&WaitingListEntry> for ActiveModel {
    fn from(entry: &WaitingListEntry) -> Self {
        ActiveModel {
            id: Set(entry.id),
            course_id: Set(entry.course_id),
            student_id: Set(entry.student_id),
            position: Set(entry.position),
            joined_at: Set(entry.joined_at),
        }
    }
}
