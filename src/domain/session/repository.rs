//! Session store trait

use async_trait::async_trait;

use super::entity::Session;
use crate::domain::DomainError;
use crate::domain::account::AccountId;

/// Session operations available inside a store transaction
#[async_trait]
pub trait SessionStore: Send {
    /// Look up a session by its token, whether or not it has been signed out
    async fn find_session_by_token(&mut self, token: &str) -> Result<Option<Session>, DomainError>;

    /// Record a new session
    async fn insert_session(&mut self, session: Session) -> Result<Session, DomainError>;

    /// Update an existing session
    async fn update_session(&mut self, session: &Session) -> Result<Session, DomainError>;

    /// Remove every session owned by an account, returning how many were removed
    async fn delete_sessions_for_account(&mut self, account_id: &AccountId)
    -> Result<u64, DomainError>;
}
