//! Quora auth service
//!
//! Account and session subsystem for a Q&A platform:
//! - Registration with unique username and email
//! - Basic-credential sign-in issuing signed, eight-hour session tokens
//! - Sign-out, token validation and admin-only account deletion
//! - In-memory or PostgreSQL storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use chrono::Duration;
use crate::config::AuthConfig;
use domain::{AuthStore, DomainError};
use infrastructure::{
    auth::{Argon2Hasher, AuthSessionManager, JwtTokenIssuer, SessionPolicy},
    storage::{InMemoryAuthStore, PostgresAuthStore, StorageConfig, run_auth_migrations},
};
use rand::Rng;
use tracing::info;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    match StorageConfig::from_settings(&config.storage)? {
        StorageConfig::InMemory => {
            info!("Using in-memory storage");
            build_state(Arc::new(InMemoryAuthStore::new()), &config.auth).await
        }
        StorageConfig::Postgres(pg_config) => {
            info!(
                max_connections = pg_config.max_connections,
                "Using PostgreSQL storage"
            );
            let store = PostgresAuthStore::connect(&pg_config).await?;
            run_auth_migrations(store.pool()).await?;
            build_state(Arc::new(store), &config.auth).await
        }
    }
}

async fn build_state<S>(store: Arc<S>, config: &AuthConfig) -> anyhow::Result<AppState>
where
    S: AuthStore + 'static,
{
    let hasher = Arc::new(create_hasher(config)?);
    let tokens = Arc::new(JwtTokenIssuer::new(&resolve_token_secret(config))?);

    let manager = Arc::new(
        AuthSessionManager::new(store, hasher, tokens).with_policy(create_policy(config)?),
    );

    if let Some(admin) = &config.bootstrap_admin {
        match manager
            .ensure_admin(&admin.username, &admin.email, &admin.password)
            .await?
        {
            Some(account) => info!(
                account_id = %account.id(),
                username = %account.username(),
                "Bootstrap admin account created"
            ),
            None => info!(username = %admin.username, "Bootstrap admin already exists"),
        }
    }

    Ok(AppState::from_manager(manager))
}

/// Argon2id hasher; unset costs fall back to the library defaults
fn create_hasher(config: &AuthConfig) -> Result<Argon2Hasher, DomainError> {
    match (config.argon2_memory_kib, config.argon2_iterations) {
        (None, None) => Ok(Argon2Hasher::new()),
        (memory, iterations) => Argon2Hasher::with_cost(
            memory.unwrap_or(argon2::Params::DEFAULT_M_COST),
            iterations.unwrap_or(argon2::Params::DEFAULT_T_COST),
        ),
    }
}

fn create_policy(config: &AuthConfig) -> Result<SessionPolicy, DomainError> {
    if config.session_ttl_hours <= 0 {
        return Err(DomainError::configuration(
            "auth.session_ttl_hours must be positive",
        ));
    }

    let ttl = Duration::try_hours(config.session_ttl_hours).ok_or_else(|| {
        DomainError::configuration("auth.session_ttl_hours is too large")
    })?;

    Ok(SessionPolicy::default()
        .with_ttl(ttl)
        .with_signed_out_check(config.signed_out_check))
}

/// Token secret from config, then `TOKEN_SECRET`, else a random one
fn resolve_token_secret(config: &AuthConfig) -> String {
    config
        .token_secret
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| std::env::var("TOKEN_SECRET").ok().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| {
            tracing::warn!(
                "No auth.token_secret or TOKEN_SECRET configured. Generating random secret. \
                Sessions will NOT survive a restart."
            );
            generate_random_secret()
        })
}

/// Generate a random token secret
fn generate_random_secret() -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BootstrapAdminConfig;
    use crate::domain::SignedOutCheck;
    use crate::infrastructure::auth::BasicCredentials;

    fn fast_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.argon2_memory_kib = Some(1024);
        config.auth.argon2_iterations = Some(1);
        config.auth.token_secret = Some("lib-test-secret".to_string());
        config
    }

    #[tokio::test]
    async fn test_default_state_uses_memory_store() {
        let state = create_app_state_with_config(&fast_config()).await.unwrap();
        assert!(state.auth.check_store().await.is_ok());
    }

    #[tokio::test]
    async fn test_bootstrap_admin_can_sign_in() {
        let mut config = fast_config();
        config.auth.bootstrap_admin = Some(BootstrapAdminConfig {
            username: "root".to_string(),
            email: "root@example.com".to_string(),
            password: "root-pass".to_string(),
        });

        let state = create_app_state_with_config(&config).await.unwrap();

        let session = state
            .auth
            .sign_in(&BasicCredentials::new("root", "root-pass").encode())
            .await
            .unwrap();
        let admin = state.admin_gate.require_admin(session.token()).await.unwrap();

        assert_eq!(admin.username(), "root");
    }

    #[tokio::test]
    async fn test_unknown_backend_rejected() {
        let mut config = fast_config();
        config.storage.backend = "cassandra".to_string();

        assert!(create_app_state_with_config(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_postgres_without_url_rejected() {
        let mut config = fast_config();
        config.storage.backend = "postgres".to_string();

        assert!(create_app_state_with_config(&config).await.is_err());
    }

    #[test]
    fn test_policy_from_config() {
        let mut config = AuthConfig::default();
        config.session_ttl_hours = 2;
        config.signed_out_check = SignedOutCheck::LogoutElapsed;

        let policy = create_policy(&config).unwrap();

        assert_eq!(policy.ttl, Duration::hours(2));
        assert_eq!(policy.signed_out_check, SignedOutCheck::LogoutElapsed);
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let mut config = AuthConfig::default();
        config.session_ttl_hours = 0;

        assert!(matches!(
            create_policy(&config),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        let mut config = AuthConfig::default();
        config.session_ttl_hours = i64::MAX;

        assert!(matches!(
            create_policy(&config),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_oversized_ttl_fails_startup() {
        let mut config = fast_config();
        config.auth.session_ttl_hours = i64::MAX;

        assert!(create_app_state_with_config(&config).await.is_err());
    }

    #[test]
    fn test_configured_secret_wins() {
        let mut config = AuthConfig::default();
        config.token_secret = Some("configured".to_string());

        assert_eq!(resolve_token_secret(&config), "configured");
    }

    #[test]
    fn test_generated_secret() {
        let a = generate_random_secret();
        let b = generate_random_secret();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_partial_argon2_costs() {
        let mut config = AuthConfig::default();
        config.argon2_memory_kib = Some(1024);

        assert!(create_hasher(&config).is_ok());

        config.argon2_memory_kib = Some(1);
        assert!(create_hasher(&config).is_err());
    }
}
