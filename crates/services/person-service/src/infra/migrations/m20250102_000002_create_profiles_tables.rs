use sea_orm_migration::{prelude::*, schema::*};

use super::m20250102_000001_create_persons_table::Persons;

static FK_STUDENTS_PERSON_ID: &str = "fk_students_person_id";
static FK_STAFF_PERSON_ID: &str = "fk_staff_person_id";
static IDX_STUDENTS_PERSON_ID: &str = "idx_students_person_id";
static IDX_STAFF_PERSON_ID: &str = "idx_staff_person_id";
static IDX_STAFF_DEPARTMENT: &str = "idx_staff_department";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(pk_uuid(Students::Id))
                    .col(uuid(Students::PersonId))
                    .col(string_uniq(Students::StudentNumber))
                    .col(string(Students::Program))
                    .col(date(Students::EnrollmentDate))
                    .col(date_null(Students::ExpectedGraduation))
                    .col(string(Students::Status))
                    .col(timestamp_with_time_zone(Students::CreatedAt))
                    .col(timestamp_with_time_zone(Students::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Students::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_STUDENTS_PERSON_ID)
                            .from(Students::Table, Students::PersonId)
                            .to(Persons::Table, Persons::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_STUDENTS_PERSON_ID)
                    .table(Students::Table)
                    .col(Students::PersonId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Staff::Table)
                    .if_not_exists()
                    .col(pk_uuid(Staff::Id))
                    .col(uuid(Staff::PersonId))
                    .col(string_uniq(Staff::EmployeeNumber))
                    .col(string(Staff::Department))
                    .col(string(Staff::Title))
                    .col(date(Staff::HireDate))
                    .col(date_null(Staff::TerminationDate))
                    .col(string(Staff::Status))
                    .col(timestamp_with_time_zone(Staff::CreatedAt))
                    .col(timestamp_with_time_zone(Staff::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Staff::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_STAFF_PERSON_ID)
                            .from(Staff::Table, Staff::PersonId)
                            .to(Persons::Table, Persons::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_STAFF_PERSON_ID)
                    .table(Staff::Table)
                    .col(Staff::PersonId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_STAFF_DEPARTMENT)
                    .table(Staff::Table)
                    .col(Staff::Department)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Staff::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
    PersonId,
    StudentNumber,
    Program,
    EnrollmentDate,
    ExpectedGraduation,
    Status,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Staff {
    Table,
    Id,
    PersonId,
    EmployeeNumber,
    Department,
    Title,
    HireDate,
    TerminationDate,
    Status,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
