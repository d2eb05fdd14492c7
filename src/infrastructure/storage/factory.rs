//! Runtime storage selection

use crate::config::StorageSettings;
use crate::domain::DomainError;

use super::postgres::PostgresConfig;

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// In-memory storage configuration
    InMemory,
    /// PostgreSQL storage configuration
    Postgres(PostgresConfig),
}

impl StorageConfig {
    /// Creates an in-memory storage configuration
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Creates a PostgreSQL storage configuration
    pub fn postgres(config: PostgresConfig) -> Self {
        Self::Postgres(config)
    }

    /// Creates a PostgreSQL configuration from a URL
    pub fn postgres_url(url: impl Into<String>) -> Self {
        Self::Postgres(PostgresConfig::new(url))
    }

    /// Resolve a backend name plus optional URL.
    ///
    /// A PostgreSQL backend without a URL is a configuration error.
    pub fn resolve(backend: &str, url: Option<&str>) -> Result<Self, DomainError> {
        match StorageType::parse(backend) {
            Some(StorageType::InMemory) => Ok(Self::InMemory),
            Some(StorageType::Postgres) => match url {
                Some(url) if !url.is_empty() => Ok(Self::postgres_url(url)),
                _ => Err(DomainError::configuration(
                    "storage.url is required for the postgres backend",
                )),
            },
            None => Err(DomainError::configuration(format!(
                "Unknown storage backend '{}'",
                backend
            ))),
        }
    }

    /// Resolve the `[storage]` config section, carrying its pool settings
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, DomainError> {
        match Self::resolve(&settings.backend, settings.url.as_deref())? {
            Self::Postgres(config) => Ok(Self::Postgres(
                config
                    .with_max_connections(settings.max_connections)
                    .with_min_connections(settings.min_connections)
                    .with_connect_timeout(settings.connect_timeout_secs),
            )),
            other => Ok(other),
        }
    }

    /// Returns the storage type
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}
