//! Account administration

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::api::user::parse_account_id;

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    pub id: String,
    pub status: String,
}

/// Delete an account and all of its sessions
///
/// DELETE /admin/user/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    let id = parse_account_id(&id)?;
    let deleted = state.auth.delete_account(&admin, &id).await?;

    Ok(Json(DeleteUserResponse {
        id: deleted.id().to_string(),
        status: "USER SUCCESSFULLY DELETED".to_string(),
    }))
}
