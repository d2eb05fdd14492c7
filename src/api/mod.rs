//! API layer - HTTP endpoints and middleware

pub mod admin;
pub mod auth;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;
pub mod user;

pub use router::{create_app_router, create_router_with_state};
pub use state::AppState;
