//! Transaction traits

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::account::AccountStore;
use crate::domain::session::SessionStore;

/// Source of transactions spanning the account and session stores
///
/// Every authentication operation runs inside exactly one transaction. Stores
/// must serialize transactions that race on the same username or email.
#[async_trait]
pub trait AuthStore: Send + Sync + Debug {
    type Transaction: AuthTransaction;

    /// Open a new transaction
    async fn begin(&self) -> Result<Self::Transaction, DomainError>;
}

/// An open unit of work
///
/// Changes become visible to other transactions only on `commit`. Dropping a
/// transaction without committing discards its changes.
#[async_trait]
pub trait AuthTransaction: AccountStore + SessionStore + Send {
    /// Publish all changes made in this transaction
    async fn commit(self) -> Result<(), DomainError>;

    /// Discard all changes made in this transaction
    async fn rollback(self) -> Result<(), DomainError>;
}
