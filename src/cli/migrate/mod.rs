//! Migrate command - applies or reverts the Postgres schema

use anyhow::Context;
use clap::{Args, ValueEnum};
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::storage::{
    Migrator, PostgresAuthStore, PostgresConfig, PostgresMigrator, StorageConfig,
    auth_migrations,
};

/// Arguments for the migrate command
#[derive(Args, Clone, Debug)]
pub struct MigrateArgs {
    /// What to do with the schema
    #[arg(value_enum, default_value_t = MigrateAction::Run)]
    pub action: MigrateAction,

    /// Database URL (overrides `storage.url`)
    #[arg(long)]
    pub database_url: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MigrateAction {
    /// Apply every pending migration
    Run,
    /// Revert the most recently applied migration
    Revert,
    /// Show applied and pending migrations
    Status,
}

/// Run the migrate command
pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging)?;

    let pg_config = postgres_config(&config, args.database_url.as_deref())?;
    let store = PostgresAuthStore::connect(&pg_config).await?;
    let migrator = PostgresMigrator::new(store.pool().clone());

    match args.action {
        MigrateAction::Run => {
            migrator.run().await?;
            info!(version = ?migrator.version().await?, "Schema up to date");
        }
        MigrateAction::Revert => {
            migrator.revert().await?;
            info!(version = ?migrator.version().await?, "Reverted latest migration");
        }
        MigrateAction::Status => {
            let applied = migrator.applied_versions().await?;

            for migration in auth_migrations() {
                let state = if applied.contains(&migration.version) {
                    "applied"
                } else {
                    "pending"
                };
                info!(
                    version = migration.version,
                    description = %migration.description,
                    state,
                    "Migration"
                );
            }
        }
    }

    Ok(())
}

/// Postgres settings from config, with an optional URL override
fn postgres_config(config: &AppConfig, url: Option<&str>) -> anyhow::Result<PostgresConfig> {
    let mut settings = config.storage.clone();
    settings.backend = "postgres".to_string();

    if let Some(url) = url {
        settings.url = Some(url.to_string());
    }

    match StorageConfig::from_settings(&settings)
        .context("migrate needs storage.url or --database-url")?
    {
        StorageConfig::Postgres(pg) => Ok(pg),
        StorageConfig::InMemory => anyhow::bail!("migrate requires the postgres backend"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_override_wins() {
        let mut config = AppConfig::default();
        config.storage.url = Some("postgres://from-config/auth".to_string());

        let pg = postgres_config(&config, Some("postgres://override/auth")).unwrap();
        assert_eq!(pg.url, "postgres://override/auth");
    }

    #[test]
    fn test_config_url_used_for_memory_backend() {
        let mut config = AppConfig::default();
        config.storage.url = Some("postgres://from-config/auth".to_string());
        config.storage.max_connections = 3;

        let pg = postgres_config(&config, None).unwrap();
        assert_eq!(pg.url, "postgres://from-config/auth");
        assert_eq!(pg.max_connections, 3);
    }

    #[test]
    fn test_missing_url_is_an_error() {
        assert!(postgres_config(&AppConfig::default(), None).is_err());
    }
}
