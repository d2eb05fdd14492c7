//! Application state for shared services

use std::sync::Arc;

use crate::domain::{Account, AccountId, AuthError, AuthStore, DomainError, Session};
use crate::infrastructure::auth::{AdminGate, AuthSessionManager, PasswordHasher, SignUpRequest};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthServiceTrait>,
    pub admin_gate: Arc<AdminGate>,
}

impl AppState {
    pub fn new(auth: Arc<dyn AuthServiceTrait>, admin_gate: Arc<AdminGate>) -> Self {
        Self { auth, admin_gate }
    }

    /// Build the state around one manager, which also backs the admin gate
    pub fn from_manager<S, H>(manager: Arc<AuthSessionManager<S, H>>) -> Self
    where
        S: AuthStore + 'static,
        H: PasswordHasher + 'static,
    {
        let admin_gate = Arc::new(AdminGate::new(manager.clone()));
        Self::new(manager, admin_gate)
    }
}

/// Trait for account and session operations
#[async_trait::async_trait]
pub trait AuthServiceTrait: Send + Sync {
    async fn sign_up(&self, request: SignUpRequest) -> Result<Account, AuthError>;
    async fn sign_in(&self, blob: &str) -> Result<Session, AuthError>;
    async fn sign_out(&self, token: &str) -> Result<Account, AuthError>;
    async fn validate_token(&self, token: &str) -> Result<Account, AuthError>;
    async fn fetch_by_id(&self, id: &AccountId) -> Result<Account, AuthError>;
    async fn delete_account(
        &self,
        requesting: &Account,
        target: &AccountId,
    ) -> Result<Account, AuthError>;
    async fn check_store(&self) -> Result<(), DomainError>;
}

#[async_trait::async_trait]
impl<S, H> AuthServiceTrait for AuthSessionManager<S, H>
where
    S: AuthStore + 'static,
    H: PasswordHasher + 'static,
{
    async fn sign_up(&self, request: SignUpRequest) -> Result<Account, AuthError> {
        AuthSessionManager::sign_up(self, request).await
    }

    async fn sign_in(&self, blob: &str) -> Result<Session, AuthError> {
        AuthSessionManager::sign_in(self, blob).await
    }

    async fn sign_out(&self, token: &str) -> Result<Account, AuthError> {
        AuthSessionManager::sign_out(self, token).await
    }

    async fn validate_token(&self, token: &str) -> Result<Account, AuthError> {
        AuthSessionManager::validate_token(self, token).await
    }

    async fn fetch_by_id(&self, id: &AccountId) -> Result<Account, AuthError> {
        AuthSessionManager::fetch_by_id(self, id).await
    }

    async fn delete_account(
        &self,
        requesting: &Account,
        target: &AccountId,
    ) -> Result<Account, AuthError> {
        AuthSessionManager::delete_account(self, requesting, target).await
    }

    async fn check_store(&self) -> Result<(), DomainError> {
        AuthSessionManager::check_store(self).await
    }
}
