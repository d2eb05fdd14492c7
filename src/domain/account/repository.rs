//! Account store trait

use async_trait::async_trait;

use super::entity::{Account, AccountId};
use crate::domain::DomainError;

/// Account operations available inside a store transaction
#[async_trait]
pub trait AccountStore: Send {
    /// Get an account by its ID
    async fn find_account_by_id(&mut self, id: &AccountId) -> Result<Option<Account>, DomainError>;

    /// Get an account by its username (for sign-in and uniqueness checks)
    async fn find_account_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<Account>, DomainError>;

    /// Get an account by its email (for uniqueness checks)
    async fn find_account_by_email(&mut self, email: &str) -> Result<Option<Account>, DomainError>;

    /// Insert a new account; username and email must be unused
    async fn insert_account(&mut self, account: Account) -> Result<Account, DomainError>;

    /// Update an existing account
    async fn update_account(&mut self, account: &Account) -> Result<Account, DomainError>;

    /// Delete an account, returning whether it existed
    async fn delete_account(&mut self, id: &AccountId) -> Result<bool, DomainError>;
}
