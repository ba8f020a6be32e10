//! Database connection management and migration helpers.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection, DbErr};
use sea_orm_migration::{MigrationStatus, MigratorTrait};

use crate::config::DatabaseConfig;

/// Migration action requested from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Applied state of a single migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationEntry {
    pub name: String,
    pub applied: bool,
}

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Open a connection pool. Migrations are run by each service separately.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let connection = SeaDatabase::connect(options).await?;
        tracing::info!(
            max_connections = config.max_connections,
            "Database connection pool ready"
        );
        Ok(Self { connection })
    }

    /// Wrap an existing connection.
    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    /// Get a reference to the database connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Get a clone of the database connection.
    pub fn get_connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    /// Apply all pending migrations of `M`.
    pub async fn migrate_up<M: MigratorTrait>(&self) -> Result<(), DbErr> {
        M::up(&self.connection, None).await
    }

    /// Roll back the last applied migration of `M`.
    pub async fn migrate_down<M: MigratorTrait>(&self) -> Result<(), DbErr> {
        M::down(&self.connection, Some(1)).await
    }

    /// Roll back every applied migration of `M`.
    pub async fn migrate_reset<M: MigratorTrait>(&self) -> Result<(), DbErr> {
        M::reset(&self.connection).await
    }

    /// List the migrations of `M` with their applied status.
    pub async fn migration_status<M: MigratorTrait>(&self) -> Result<Vec<MigrationEntry>, DbErr> {
        let migrations = M::get_migration_with_status(&self.connection).await?;
        Ok(migrations
            .iter()
            .map(|m| MigrationEntry {
                name: m.name().to_string(),
                applied: m.status() == MigrationStatus::Applied,
            })
            .collect())
    }

    /// Check database connectivity. A disconnected handle reports an error.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection.ping().await
    }
}
