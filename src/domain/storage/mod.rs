//! Storage domain - Transactional unit of work over accounts and sessions

mod transaction;

pub use transaction::{AuthStore, AuthTransaction};
