use sea_orm_migration::{prelude::*, schema::*};

use super::m20250101_000001_create_users_table::Users;

static FK_TWO_FACTOR_AUTH_USER_ID: &str = "fk_two_factor_auth_user_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TwoFactorAuth::Table)
                    .if_not_exists()
                    .col(pk_uuid(TwoFactorAuth::UserId))
                    .col(string(TwoFactorAuth::Secret))
                    .col(json_binary(TwoFactorAuth::BackupCodes))
                    .col(boolean(TwoFactorAuth::IsVerified).default(false))
                    .col(timestamp_with_time_zone_null(TwoFactorAuth::VerifiedAt))
                    .col(timestamp_with_time_zone(TwoFactorAuth::CreatedAt))
                    .col(timestamp_with_time_zone(TwoFactorAuth::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_TWO_FACTOR_AUTH_USER_ID)
                            .from(TwoFactorAuth::Table, TwoFactorAuth::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TwoFactorAuth::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TwoFactorAuth {
    Table,
    UserId,
    Secret,
    BackupCodes,
    IsVerified,
    VerifiedAt,
    CreatedAt,
    UpdatedAt,
}
