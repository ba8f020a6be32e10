//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// University administration API
#[derive(Parser, Debug)]
#[command(name = "university-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Migrate, seed and start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations for every service
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

/// Overrides for the configured bind address
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Roll back the last migration of each service
    Down,
    /// Show migration status
    Status,
    /// Drop everything and re-run all migrations
    Fresh,
}

impl From<MigrateAction> for common::MigrateAction {
    fn from(action: MigrateAction) -> Self {
        match action {
            MigrateAction::Up => common::MigrateAction::Up,
            MigrateAction::Down => common::MigrateAction::Down,
            MigrateAction::Status => common::MigrateAction::Status,
            MigrateAction::Fresh => common::MigrateAction::Fresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from(["university-api", "serve", "--port", "8080"]);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(8080));
                assert!(args.host.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_migrate_action() {
        let cli = Cli::parse_from(["university-api", "-v", "migrate", "fresh"]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Migrate {
                action: MigrateAction::Fresh
            }
        ));
    }
}
