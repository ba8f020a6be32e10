//! Identity schema migrations.
//!
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users_table;
mod m20250101_000002_create_roles_and_permissions;
mod m20250101_000003_create_refresh_tokens_table;
mod m20250101_000004_create_two_factor_table;
mod m20250101_000005_create_login_history_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users_table::Migration),
            Box::new(m20250101_000002_create_roles_and_permissions::Migration),
            Box::new(m20250101_000003_create_refresh_tokens_table::Migration),
            Box::new(m20250101_000004_create_two_factor_table::Migration),
            Box::new(m20250101_000005_create_login_history_table::Migration),
        ]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("identity_migrations").into_iden()
    }
}
