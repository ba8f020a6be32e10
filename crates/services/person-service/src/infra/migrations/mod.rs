//! Person and HR schema migrations.

use sea_orm_migration::prelude::*;

mod m20250102_000001_create_persons_table;
mod m20250102_000002_create_profiles_tables;
mod m20250102_000003_create_contact_tables;
mod m20250102_000004_create_restrictions_table;
mod m20250102_000005_create_health_records_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250102_000001_create_persons_table::Migration),
            Box::new(m20250102_000002_create_profiles_tables::Migration),
            Box::new(m20250102_000003_create_contact_tables::Migration),
            Box::new(m20250102_000004_create_restrictions_table::Migration),
            Box::new(m20250102_000005_create_health_records_table::Migration),
        ]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("person_migrations").into_iden()
    }
}
