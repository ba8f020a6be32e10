use sea_orm_migration::{prelude::*, schema::*};

use super::m20250103_000001_create_courses_table::Courses;

static FK_EXAMS_COURSE_ID: &str = "fk_exams_course_id";
static IDX_EXAMS_COURSE_ID: &str = "idx_exams_course_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Exams::Table)
                    .if_not_exists()
                    .col(pk_uuid(Exams::Id))
                    .col(uuid(Exams::CourseId))
                    .col(string(Exams::Title))
                    .col(string(Exams::Kind))
                    .col(timestamp_with_time_zone(Exams::ScheduledAt))
                    .col(integer(Exams::DurationMinutes))
                    .col(string_null(Exams::Location))
                    .col(integer(Exams::Weight))
                    .col(timestamp_with_time_zone(Exams::CreatedAt))
                    .col(timestamp_with_time_zone(Exams::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_EXAMS_COURSE_ID)
                            .from(Exams::Table, Exams::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_EXAMS_COURSE_ID)
                    .table(Exams::Table)
                    .col(Exams::CourseId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Exams::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Exams {
    Table,
    Id,
    CourseId,
    Title,
    Kind,
    ScheduledAt,
    DurationMinutes,
    Location,
    Weight,
    CreatedAt,
    UpdatedAt,
}
