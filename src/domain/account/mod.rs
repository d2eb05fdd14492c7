//! Account domain
//!
//! Account entities, sign-up drafts, role tags and the account store trait.

mod entity;
mod repository;

pub use entity::{Account, AccountDraft, AccountId, AccountProfile, AccountRole};
pub use repository::AccountStore;
