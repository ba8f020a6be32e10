use sea_orm_migration::{prelude::*, schema::*};

static IDX_COURSES_SEMESTER: &str = "idx_courses_semester";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(pk_uuid(Courses::Id))
                    .col(string_uniq(Courses::Code))
                    .col(string(Courses::Name))
                    .col(text_null(Courses::Description))
                    .col(integer(Courses::Credits))
                    .col(integer(Courses::Capacity))
                    .col(string(Courses::Semester))
                    .col(uuid_null(Courses::InstructorId))
                    .col(boolean(Courses::IsActive).default(true))
                    .col(timestamp_with_time_zone(Courses::CreatedAt))
                    .col(timestamp_with_time_zone(Courses::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Courses::DeletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_COURSES_SEMESTER)
                    .table(Courses::Table)
                    .col(Courses::Semester)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Courses {
    Table,
    Id,
    Code,
    Name,
    Description,
    Credits,
    Capacity,
    Semester,
    InstructorId,
    IsActive,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
