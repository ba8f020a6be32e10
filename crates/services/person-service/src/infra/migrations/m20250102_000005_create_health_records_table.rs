use sea_orm_migration::{prelude::*, schema::*};

use super::m20250102_000001_create_persons_table::Persons;

static FK_HEALTH_RECORDS_PERSON_ID: &str = "fk_health_records_person_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HealthRecords::Table)
                    .if_not_exists()
                    .col(pk_uuid(HealthRecords::Id))
                    .col(uuid_uniq(HealthRecords::PersonId))
                    .col(string_null(HealthRecords::BloodType))
                    .col(json_binary(HealthRecords::Allergies))
                    .col(json_binary(HealthRecords::ChronicConditions))
                    .col(json_binary(HealthRecords::Medications))
                    .col(text_null(HealthRecords::Notes))
                    .col(timestamp_with_time_zone(HealthRecords::CreatedAt))
                    .col(timestamp_with_time_zone(HealthRecords::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_HEALTH_RECORDS_PERSON_ID)
                            .from(HealthRecords::Table, HealthRecords::PersonId)
                            .to(Persons::Table, Persons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HealthRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum HealthRecords {
    Table,
    Id,
    PersonId,
    BloodType,
    Allergies,
    ChronicConditions,
    Medications,
    Notes,
    CreatedAt,
    UpdatedAt,
}
