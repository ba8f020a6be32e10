//! Migrate command - applies each service's migrator.
//!
//! Forward actions run identity, person, academic in that order; rollbacks
//! run in reverse so dependent tables go first.

use sea_orm_migration::MigratorTrait;

use academic_service_lib::Migrator as AcademicMigrator;
use common::{AppConfig, AppResult, Database, MigrateAction};
use identity_service_lib::Migrator as IdentityMigrator;
use person_service_lib::Migrator as PersonMigrator;

pub async fn execute(action: MigrateAction, config: AppConfig) -> AppResult<()> {
    let db = Database::connect(&config.database).await?;
    run(&db, action).await
}

/// Run `action` against every migrator.
pub async fn run(db: &Database, action: MigrateAction) -> AppResult<()> {
    match action {
        MigrateAction::Up => {
            tracing::info!("Running pending migrations...");
            up(db).await?;
            tracing::info!("Migrations completed successfully");
        }
        MigrateAction::Down => {
            tracing::info!("Rolling back last migration of each service...");
            db.migrate_down::<AcademicMigrator>().await?;
            db.migrate_down::<PersonMigrator>().await?;
            db.migrate_down::<IdentityMigrator>().await?;
            tracing::info!("Rollback completed successfully");
        }
        MigrateAction::Status => {
            print_status::<IdentityMigrator>(db, "identity").await?;
            print_status::<PersonMigrator>(db, "person").await?;
            print_status::<AcademicMigrator>(db, "academic").await?;
        }
        MigrateAction::Fresh => {
            tracing::warn!("Resetting database and running all migrations...");
            db.migrate_reset::<AcademicMigrator>().await?;
            db.migrate_reset::<PersonMigrator>().await?;
            db.migrate_reset::<IdentityMigrator>().await?;
            up(db).await?;
            tracing::info!("Fresh migrations completed successfully");
        }
    }

    Ok(())
}

async fn up(db: &Database) -> AppResult<()> {
    db.migrate_up::<IdentityMigrator>().await?;
    db.migrate_up::<PersonMigrator>().await?;
    db.migrate_up::<AcademicMigrator>().await?;
    Ok(())
}

async fn print_status<M: MigratorTrait>(db: &Database, service: &str) -> AppResult<()> {
    for entry in db.migration_status::<M>().await? {
        let status = if entry.applied { "applied" } else { "pending" };
        println!("[{}] {}: {}", service, entry.name, status);
    }
    Ok(())
}
