use sea_orm_migration::{prelude::*, schema::*};

use super::m20250103_000001_create_courses_table::Courses;

static FK_ENROLLMENTS_COURSE_ID: &str = "fk_enrollments_course_id";
static FK_WAITING_LIST_COURSE_ID: &str = "fk_waiting_list_course_id";
static IDX_ENROLLMENTS_COURSE_STATUS: &str = "idx_enrollments_course_status";
static IDX_ENROLLMENTS_STUDENT_ID: &str = "idx_enrollments_student_id";
static IDX_WAITING_LIST_COURSE_STUDENT: &str = "idx_waiting_list_course_student";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(pk_uuid(Enrollments::Id))
                    .col(uuid(Enrollments::StudentId))
                    .col(uuid(Enrollments::CourseId))
                    .col(string(Enrollments::Status))
                    .col(timestamp_with_time_zone(Enrollments::EnrolledAt))
                    .col(timestamp_with_time_zone_null(Enrollments::DroppedAt))
                    .col(timestamp_with_time_zone_null(Enrollments::CompletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_ENROLLMENTS_COURSE_ID)
                            .from(Enrollments::Table, Enrollments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_ENROLLMENTS_COURSE_STATUS)
                    .table(Enrollments::Table)
                    .col(Enrollments::CourseId)
                    .col(Enrollments::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_ENROLLMENTS_STUDENT_ID)
                    .table(Enrollments::Table)
                    .col(Enrollments::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WaitingListEntries::Table)
                    .if_not_exists()
                    .col(pk_uuid(WaitingListEntries::Id))
                    .col(uuid(WaitingListEntries::CourseId))
                    .col(uuid(WaitingListEntries::StudentId))
                    .col(integer(WaitingListEntries::Position))
                    .col(timestamp_with_time_zone(WaitingListEntries::JoinedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_WAITING_LIST_COURSE_ID)
                            .from(WaitingListEntries::Table, WaitingListEntries::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_WAITING_LIST_COURSE_STUDENT)
                    .table(WaitingListEntries::Table)
                    .col(WaitingListEntries::CourseId)
                    .col(WaitingListEntries::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WaitingListEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Enrollments {
    Table,
    Id,
    StudentId,
    CourseId,
    Status,
    EnrolledAt,
    DroppedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum WaitingListEntries {
    Table,
    Id,
    CourseId,
    StudentId,
    Position,
    JoinedAt,
}
