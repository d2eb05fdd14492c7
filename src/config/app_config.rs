use serde::Deserialize;

use crate::domain::SignedOutCheck;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Session and password settings
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for session tokens; a random one is generated when unset
    #[serde(default)]
    pub token_secret: Option<String>,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    #[serde(default)]
    pub signed_out_check: SignedOutCheck,
    /// Argon2 memory cost in KiB; library default when unset
    #[serde(default)]
    pub argon2_memory_kib: Option<u32>,
    /// Argon2 iteration count; library default when unset
    #[serde(default)]
    pub argon2_iterations: Option<u32>,
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

/// Admin account created at startup when no account has its username
#[derive(Clone, Deserialize)]
pub struct BootstrapAdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// `memory` or `postgres`
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Prometheus metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

fn default_session_ttl_hours() -> i64 {
    8
}

fn default_storage_backend() -> String {
    "memory".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &self.token_secret.as_ref().map(|_| "[REDACTED]"))
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("signed_out_check", &self.signed_out_check)
            .field("argon2_memory_kib", &self.argon2_memory_kib)
            .field("argon2_iterations", &self.argon2_iterations)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish()
    }
}

impl std::fmt::Debug for BootstrapAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdminConfig")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: None,
            session_ttl_hours: default_session_ttl_hours(),
            signed_out_check: SignedOutCheck::default(),
            argon2_memory_kib: None,
            argon2_iterations: None,
            bootstrap_admin: None,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_metrics_path(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    fn from_toml(toml: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.session_ttl_hours, 8);
        assert_eq!(config.auth.signed_out_check, SignedOutCheck::Presence);
        assert!(config.auth.token_secret.is_none());
        assert_eq!(config.storage.backend, "memory");
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_empty_source_uses_defaults() {
        let config = from_toml("");

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.metrics.path, "/metrics");
    }

    #[test]
    fn test_auth_section() {
        let config = from_toml(
            r#"
            [auth]
            token_secret = "s3cret"
            session_ttl_hours = 2
            signed_out_check = "logout_elapsed"

            [auth.bootstrap_admin]
            username = "root"
            email = "root@x.com"
            password = "rootpw"

            [storage]
            backend = "postgres"
            url = "postgres://db/auth"
            "#,
        );

        assert_eq!(config.auth.session_ttl_hours, 2);
        assert_eq!(config.auth.signed_out_check, SignedOutCheck::LogoutElapsed);
        assert_eq!(
            config.auth.bootstrap_admin.as_ref().map(|a| a.username.as_str()),
            Some("root")
        );
        assert_eq!(config.storage.url.as_deref(), Some("postgres://db/auth"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = from_toml(
            r#"
            [auth]
            token_secret = "s3cret"

            [auth.bootstrap_admin]
            username = "root"
            email = "root@x.com"
            password = "rootpw"
            "#,
        );

        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("rootpw"));
    }
}
