//! CLI module for the Quora auth service
//!
//! Provides subcommands:
//! - `serve`: HTTP API server
//! - `migrate`: apply, revert or inspect the Postgres schema

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Quora auth service - accounts, sessions and admin access
#[derive(Parser)]
#[command(name = "quora-auth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Manage the Postgres schema
    Migrate(migrate::MigrateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["quora-auth", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve));
    }

    #[test]
    fn test_parse_migrate_defaults_to_run() {
        let cli = Cli::try_parse_from(["quora-auth", "migrate"]).unwrap();

        match cli.command {
            Command::Migrate(args) => {
                assert_eq!(args.action, migrate::MigrateAction::Run);
                assert!(args.database_url.is_none());
            }
            Command::Serve => panic!("expected migrate"),
        }
    }

    #[test]
    fn test_parse_migrate_revert_with_url() {
        let cli = Cli::try_parse_from([
            "quora-auth",
            "migrate",
            "revert",
            "--database-url",
            "postgres://db/auth",
        ])
        .unwrap();

        match cli.command {
            Command::Migrate(args) => {
                assert_eq!(args.action, migrate::MigrateAction::Revert);
                assert_eq!(args.database_url.as_deref(), Some("postgres://db/auth"));
            }
            Command::Serve => panic!("expected migrate"),
        }
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["quora-auth", "ui"]).is_err());
    }
}
