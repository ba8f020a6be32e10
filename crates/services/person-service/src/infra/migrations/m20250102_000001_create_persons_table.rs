use sea_orm_migration::{prelude::*, schema::*};

static IDX_PERSONS_LAST_NAME: &str = "idx_persons_last_name";
static IDX_PERSONS_USER_ID: &str = "idx_persons_user_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Persons::Table)
                    .if_not_exists()
                    .col(pk_uuid(Persons::Id))
                    .col(uuid_null(Persons::UserId))
                    .col(string(Persons::FirstName))
                    .col(string(Persons::LastName))
                    .col(string_uniq(Persons::NationalId))
                    .col(date(Persons::DateOfBirth))
                    .col(string(Persons::Gender))
                    .col(string_null(Persons::Email))
                    .col(string_null(Persons::Phone))
                    .col(timestamp_with_time_zone(Persons::CreatedAt))
                    .col(timestamp_with_time_zone(Persons::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Persons::DeletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_PERSONS_LAST_NAME)
                    .table(Persons::Table)
                    .col(Persons::LastName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_PERSONS_USER_ID)
                    .table(Persons::Table)
                    .col(Persons::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Persons::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Persons {
    Table,
    Id,
    UserId,
    FirstName,
    LastName,
    NationalId,
    DateOfBirth,
    Gender,
    Email,
    Phone,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
