//! Authentication API endpoints
//!
//! Sign-up, sign-in and sign-out. Sign-in takes a `Basic` credential blob in the
//! `Authorization` header and returns the session token in the `access-token`
//! response header.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{extract_access_token, extract_authorization};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{AccountDraft, AccountProfile};
use crate::infrastructure::auth::SignUpRequest;

/// Response header carrying the issued session token
pub const ACCESS_TOKEN_HEADER: HeaderName = HeaderName::from_static("access-token");

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/user/signup", post(sign_up))
        .route("/user/signin", post(sign_in))
        .route("/user/signout", post(sign_out))
}

/// Sign-up request body
#[derive(Deserialize)]
pub struct SignUpBody {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: AccountProfile,
}

impl std::fmt::Debug for SignUpBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpBody")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignUpResponse {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: String,
    pub message: String,
}

/// Register a new (non-admin) account
///
/// POST /user/signup
pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpBody>,
) -> Result<(StatusCode, Json<SignUpResponse>), ApiError> {
    let request = SignUpRequest::new(body.username, body.email, body.password)
        .with_draft(AccountDraft::new().with_profile(body.profile));

    let account = state.auth.sign_up(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            id: account.id().to_string(),
            status: "USER SUCCESSFULLY REGISTERED".to_string(),
        }),
    ))
}

/// Sign in with `Authorization: Basic base64(username:password)`
///
/// POST /user/signin
pub async fn sign_in(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let blob = extract_authorization(&headers)?;
    let session = state.auth.sign_in(&blob).await?;

    let token = HeaderValue::from_str(session.token())
        .map_err(|_| ApiError::internal("Issued token is not a valid header value"))?;

    Ok((
        [(ACCESS_TOKEN_HEADER, token)],
        Json(SessionResponse {
            id: session.account_id().to_string(),
            message: "SIGNED IN SUCCESSFULLY".to_string(),
        }),
    ))
}

/// Terminate the session whose token is in the `Authorization` header
///
/// POST /user/signout
pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, ApiError> {
    let token = extract_access_token(&headers)?;
    let account = state.auth.sign_out(&token).await?;

    Ok(Json(SessionResponse {
        id: account.id().to_string(),
        message: "SIGNED OUT SUCCESSFULLY".to_string(),
    }))
}
