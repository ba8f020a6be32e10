//! Academic records schema migrations.
//!
//! Student and staff ids reference the person schema by value; there are no
//! foreign keys across service boundaries.

use sea_orm_migration::prelude::*;

mod m20250103_000001_create_courses_table;
mod m20250103_000002_create_enrollment_tables;
mod m20250103_000003_create_exams_table;
mod m20250103_000004_create_grade_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250103_000001_create_courses_table::Migration),
            Box::new(m20250103_000002_create_enrollment_tables::Migration),
            Box::new(m20250103_000003_create_exams_table::Migration),
            Box::new(m20250103_000004_create_grade_tables::Migration),
        ]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("academic_migrations").into_iden()
    }
}
