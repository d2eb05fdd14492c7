//! Session domain

mod entity;
mod repository;

pub use entity::{Session, SessionId, SignedOutCheck};
pub use repository::SessionStore;
