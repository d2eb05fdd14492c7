//! Admin API endpoints

pub mod users;

use axum::{Router, routing::delete};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new().route("/admin/user/{id}", delete(users::delete_user))
}
