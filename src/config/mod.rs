//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, BootstrapAdminConfig, LogFormat, LoggingConfig, MetricsConfig,
    ServerConfig, StorageSettings,
};
