//! Admin authorization extractor

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::Account;

use super::user_auth::extract_access_token;

/// Extractor that requires a live session token owned by an admin account
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Account);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_access_token(&parts.headers)?;

        let account = state.admin_gate.require_admin(&token).await?;
        debug!(account_id = %account.id(), "Admin access granted");

        Ok(RequireAdmin(account))
    }
}
