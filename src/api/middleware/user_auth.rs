//! Session token authentication extractor

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::{Account, AuthError};

/// Extractor that requires a live session token
///
/// The token is read from the `Authorization` header, either as
/// `Bearer <token>` or as the raw header value.
#[derive(Debug, Clone)]
pub struct RequireUser(pub Account);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_access_token(&parts.headers)?;

        let account = state.auth.validate_token(&token).await?;
        debug!(account_id = %account.id(), "Session token accepted");

        Ok(RequireUser(account))
    }
}

/// Extract the session token from the Authorization header
pub fn extract_access_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::NotSignedIn)?
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();

    if token.is_empty() {
        return Err(AuthError::NotSignedIn.into());
    }

    Ok(token.to_string())
}

/// Extract the raw `Authorization` header value (the credential blob for sign-in)
pub fn extract_authorization(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AuthError::malformed_credentials("missing Authorization header"))?
        .to_str()
        .map_err(|_| AuthError::malformed_credentials("invalid Authorization header encoding"))?;

    Ok(value.to_string())
}
