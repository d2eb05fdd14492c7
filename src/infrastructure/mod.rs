//! Infrastructure layer - Store, hashing, token and observability implementations

pub mod auth;
pub mod logging;
pub mod observability;
pub mod storage;
