//! Admin authorization gate

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::{Account, AuthError, AuthStore};

use super::password::PasswordHasher;
use super::service::AuthSessionManager;

/// Resolves a session token to its account
#[async_trait]
pub trait TokenValidator: Send + Sync + Debug {
    async fn validate_token(&self, token: &str) -> Result<Account, AuthError>;
}

#[async_trait]
impl<S, H> TokenValidator for AuthSessionManager<S, H>
where
    S: AuthStore + 'static,
    H: PasswordHasher + 'static,
{
    async fn validate_token(&self, token: &str) -> Result<Account, AuthError> {
        AuthSessionManager::validate_token(self, token).await
    }
}

/// Admits only tokens whose session belongs to an admin account
#[derive(Debug, Clone)]
pub struct AdminGate {
    validator: Arc<dyn TokenValidator>,
}

impl AdminGate {
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self { validator }
    }

    /// Validate `token` and require the admin role.
    ///
    /// Token failures (`NotSignedIn`, `SignedOut`, `SessionExpired`) propagate
    /// unchanged; a valid non-admin token yields `Forbidden`.
    pub async fn require_admin(&self, token: &str) -> Result<Account, AuthError> {
        let account = self.validator.validate_token(token).await?;

        if !account.is_admin() {
            warn!(account_id = %account.id(), "Admin access denied");
            return Err(AuthError::Forbidden);
        }

        Ok(account)
    }
}
