//! Domain layer - Core entities, failure kinds and store traits

pub mod account;
pub mod auth;
pub mod error;
pub mod session;
pub mod storage;

pub use account::{Account, AccountDraft, AccountId, AccountProfile, AccountRole, AccountStore};
pub use auth::{AuthError, Clock, SystemClock};
pub use error::DomainError;
pub use session::{Session, SessionId, SessionStore, SignedOutCheck};
pub use storage::{AuthStore, AuthTransaction};
