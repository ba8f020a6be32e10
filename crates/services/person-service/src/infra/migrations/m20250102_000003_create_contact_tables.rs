use sea_orm_migration::{prelude::*, schema::*};

use super::m20250102_000001_create_persons_table::Persons;

static FK_ADDRESSES_PERSON_ID: &str = "fk_addresses_person_id";
static FK_EMERGENCY_CONTACTS_PERSON_ID: &str = "fk_emergency_contacts_person_id";
static IDX_ADDRESSES_PERSON_ID: &str = "idx_addresses_person_id";
static IDX_EMERGENCY_CONTACTS_PERSON_ID: &str = "idx_emergency_contacts_person_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Addresses::Table)
                    .if_not_exists()
                    .col(pk_uuid(Addresses::Id))
                    .col(uuid(Addresses::PersonId))
                    .col(string(Addresses::Kind))
                    .col(string(Addresses::Line1))
                    .col(string_null(Addresses::Line2))
                    .col(string(Addresses::City))
                    .col(string_null(Addresses::State))
                    .col(string(Addresses::PostalCode))
                    .col(string(Addresses::Country))
                    .col(boolean(Addresses::IsPrimary).default(false))
                    .col(timestamp_with_time_zone(Addresses::CreatedAt))
                    .col(timestamp_with_time_zone(Addresses::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_ADDRESSES_PERSON_ID)
                            .from(Addresses::Table, Addresses::PersonId)
                            .to(Persons::Table, Persons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_ADDRESSES_PERSON_ID)
                    .table(Addresses::Table)
                    .col(Addresses::PersonId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmergencyContacts::Table)
                    .if_not_exists()
                    .col(pk_uuid(EmergencyContacts::Id))
                    .col(uuid(EmergencyContacts::PersonId))
                    .col(string(EmergencyContacts::Name))
                    .col(string(EmergencyContacts::Relationship))
                    .col(string(EmergencyContacts::Phone))
                    .col(string_null(EmergencyContacts::Email))
                    .col(timestamp_with_time_zone(EmergencyContacts::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_EMERGENCY_CONTACTS_PERSON_ID)
                            .from(EmergencyContacts::Table, EmergencyContacts::PersonId)
                            .to(Persons::Table, Persons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_EMERGENCY_CONTACTS_PERSON_ID)
                    .table(EmergencyContacts::Table)
                    .col(EmergencyContacts::PersonId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmergencyContacts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Addresses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Addresses {
    Table,
    Id,
    PersonId,
    Kind,
    Line1,
    Line2,
    City,
    State,
    PostalCode,
    Country,
    IsPrimary,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EmergencyContacts {
    Table,
    Id,
    PersonId,
    Name,
    Relationship,
    Phone,
    Email,
    CreatedAt,
}
