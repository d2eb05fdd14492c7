//! Account profile endpoints

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{Account, AccountId, AccountProfile, AuthError};

/// Create the profile router
pub fn create_user_router() -> Router<AppState> {
    Router::new().route("/userprofile/{id}", get(get_profile))
}

/// Account details safe to expose; never includes hash or salt
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(flatten)]
    pub profile: AccountProfile,
    pub created_at: String,
}

impl ProfileResponse {
    pub fn from_account(account: &Account) -> Self {
        Self {
            id: account.id().to_string(),
            username: account.username().to_string(),
            email: account.email().to_string(),
            role: account.role().as_str().to_string(),
            profile: account.profile().clone(),
            created_at: account.created_at().to_rfc3339(),
        }
    }
}

/// Parse a path identifier; anything that is not a UUID cannot name an account
pub(crate) fn parse_account_id(id: &str) -> Result<AccountId, ApiError> {
    AccountId::parse(id).map_err(|_| AuthError::NotFound.into())
}

/// Get any account's profile; requires a signed-in caller
///
/// GET /userprofile/{id}
pub async fn get_profile(
    State(state): State<AppState>,
    RequireUser(_caller): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let id = parse_account_id(&id)?;
    let account = state.auth.fetch_by_id(&id).await?;

    Ok(Json(ProfileResponse::from_account(&account)))
}
