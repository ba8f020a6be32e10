use sea_orm_migration::{prelude::*, schema::*};

use super::m20250102_000001_create_persons_table::Persons;

static FK_PERSON_RESTRICTIONS_PERSON_ID: &str = "fk_person_restrictions_person_id";
static IDX_PERSON_RESTRICTIONS_PERSON_ID: &str = "idx_person_restrictions_person_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PersonRestrictions::Table)
                    .if_not_exists()
                    .col(pk_uuid(PersonRestrictions::Id))
                    .col(uuid(PersonRestrictions::PersonId))
                    .col(string(PersonRestrictions::Kind))
                    .col(text(PersonRestrictions::Reason))
                    .col(timestamp_with_time_zone(PersonRestrictions::StartsAt))
                    .col(timestamp_with_time_zone_null(PersonRestrictions::EndsAt))
                    .col(timestamp_with_time_zone_null(PersonRestrictions::LiftedAt))
                    .col(text_null(PersonRestrictions::LiftedReason))
                    .col(uuid_null(PersonRestrictions::CreatedBy))
                    .col(timestamp_with_time_zone(PersonRestrictions::CreatedAt))
                    .col(timestamp_with_time_zone(PersonRestrictions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_PERSON_RESTRICTIONS_PERSON_ID)
                            .from(PersonRestrictions::Table, PersonRestrictions::PersonId)
                            .to(Persons::Table, Persons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_PERSON_RESTRICTIONS_PERSON_ID)
                    .table(PersonRestrictions::Table)
                    .col(PersonRestrictions::PersonId)
                    .col(PersonRestrictions::StartsAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PersonRestrictions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PersonRestrictions {
    Table,
    Id,
    PersonId,
    Kind,
    Reason,
    StartsAt,
    EndsAt,
    LiftedAt,
    LiftedReason,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
