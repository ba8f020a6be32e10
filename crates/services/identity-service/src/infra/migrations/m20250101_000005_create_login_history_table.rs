use sea_orm_migration::{prelude::*, schema::*};

use super::m20250101_000001_create_users_table::Users;

static IDX_LOGIN_HISTORY_USER_ID: &str = "idx_login_history_user_id";
static FK_LOGIN_HISTORY_USER_ID: &str = "fk_login_history_user_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LoginHistory::Table)
                    .if_not_exists()
                    .col(pk_uuid(LoginHistory::Id))
                    .col(uuid_null(LoginHistory::UserId))
                    .col(string(LoginHistory::Email))
                    .col(string_null(LoginHistory::IpAddress))
                    .col(string_null(LoginHistory::UserAgent))
                    .col(boolean(LoginHistory::Succeeded))
                    .col(string_null(LoginHistory::FailureReason))
                    .col(timestamp_with_time_zone(LoginHistory::AttemptedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_LOGIN_HISTORY_USER_ID)
                            .from(LoginHistory::Table, LoginHistory::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_LOGIN_HISTORY_USER_ID)
                    .table(LoginHistory::Table)
                    .col(LoginHistory::UserId)
                    .col(LoginHistory::AttemptedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LoginHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LoginHistory {
    Table,
    Id,
    UserId,
    Email,
    IpAddress,
    UserAgent,
    Succeeded,
    FailureReason,
    AttemptedAt,
}
