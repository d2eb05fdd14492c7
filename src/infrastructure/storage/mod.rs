//! Storage infrastructure - Account and session store implementations

mod factory;
mod in_memory;
pub mod migrations;
mod postgres;

pub use factory::{StorageConfig, StorageType};
pub use in_memory::{InMemoryAuthStore, InMemoryTransaction};
pub use migrations::{Migration, Migrator, PostgresMigrator, auth_migrations, run_auth_migrations};
pub use postgres::{PostgresAuthStore, PostgresConfig, PostgresTransaction};
