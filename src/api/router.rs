use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use super::admin;
use super::auth;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::user;
use crate::infrastructure::observability::{PrometheusMetrics, create_metrics_router};

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Sign-up, sign-in and sign-out
        .merge(auth::create_auth_router())
        // Profiles (signed-in callers)
        .merge(user::create_user_router())
        // Account administration (admin callers)
        .merge(admin::create_admin_router())
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Full router plus the Prometheus scrape endpoint when metrics are enabled
pub fn create_app_router(
    state: AppState,
    metrics: Option<PrometheusMetrics>,
    metrics_path: &str,
) -> Router {
    let router = create_router_with_state(state);

    match metrics {
        Some(m) => router.merge(create_metrics_router(m, metrics_path)),
        None => router,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::infrastructure::auth::{Argon2Hasher, AuthSessionManager, JwtTokenIssuer};
    use crate::infrastructure::storage::InMemoryAuthStore;

    const ADMIN_PASSWORD: &str = "root-pass";

    async fn create_app() -> Router {
        let store = Arc::new(InMemoryAuthStore::new());
        let hasher = Arc::new(Argon2Hasher::with_cost(1024, 1).unwrap());
        let tokens = Arc::new(JwtTokenIssuer::new("router-test-secret").unwrap());
        let manager = Arc::new(AuthSessionManager::new(store, hasher, tokens));

        manager
            .ensure_admin("root", "root@example.com", ADMIN_PASSWORD)
            .await
            .unwrap();

        create_router_with_state(AppState::from_manager(manager))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let response = app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let token = response
            .headers()
            .get("access-token")
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, token, body)
    }

    fn sign_up_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/user/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn sign_in_request(username: &str, password: &str) -> Request<Body> {
        let blob = STANDARD.encode(format!("{}:{}", username, password));
        Request::builder()
            .method("POST")
            .uri("/user/signin")
            .header(header::AUTHORIZATION, format!("Basic {}", blob))
            .body(Body::empty())
            .unwrap()
    }

    fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    async fn register(app: &Router, username: &str, email: &str) -> String {
        let (status, _, body) = send(
            app,
            sign_up_request(json!({
                "username": username,
                "email": email,
                "password": "pw-123",
                "first_name": "Ada",
                "country": "UK"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn sign_in(app: &Router, username: &str, password: &str) -> String {
        let (status, token, _) = send(app, sign_in_request(username, password)).await;
        assert_eq!(status, StatusCode::OK);
        token.unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = create_app().await;

        for uri in ["/health", "/ready"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let (status, _, body) = send(&app, request).await;

            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert_eq!(body["status"], "healthy");
        }

        let request = Request::builder().uri("/live").body(Body::empty()).unwrap();
        let (status, _, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sign_up_sign_in_profile_sign_out() {
        let app = create_app().await;
        let id = register(&app, "alice", "a@x.com").await;
        let token = sign_in(&app, "alice", "pw-123").await;

        let (status, _, profile) =
            send(&app, authed("GET", &format!("/userprofile/{}", id), &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["username"], "alice");
        assert_eq!(profile["role"], "nonadmin");
        assert_eq!(profile["first_name"], "Ada");
        assert!(profile.get("password").is_none());
        assert!(profile.get("salt").is_none());

        let (status, _, body) = send(&app, authed("POST", "/user/signout", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id.as_str());
        assert_eq!(body["message"], "SIGNED OUT SUCCESSFULLY");

        let (status, _, body) =
            send(&app, authed("GET", &format!("/userprofile/{}", id), &token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "ATHR-002");
    }

    #[tokio::test]
    async fn test_sign_up_response_body() {
        let app = create_app().await;

        let (status, _, body) = send(
            &app,
            sign_up_request(json!({"username": "bob", "email": "b@x.com", "password": "pw"})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "USER SUCCESSFULLY REGISTERED");
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_conflicts() {
        let app = create_app().await;
        register(&app, "alice", "a@x.com").await;

        let (status, _, body) = send(
            &app,
            sign_up_request(json!({"username": "alice", "email": "other@x.com", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "SGR-001");

        let (status, _, body) = send(
            &app,
            sign_up_request(json!({"username": "carol", "email": "a@x.com", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "SGR-002");
    }

    #[tokio::test]
    async fn test_sign_in_failures() {
        let app = create_app().await;
        register(&app, "alice", "a@x.com").await;

        let (status, token, body) = send(&app, sign_in_request("alice", "wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(token.is_none());
        assert_eq!(body["error"]["code"], "ATH-002");

        let (status, _, body) = send(&app, sign_in_request("nobody", "pw")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "ATH-001");
    }

    #[tokio::test]
    async fn test_sign_in_malformed_blob() {
        let app = create_app().await;

        let request = Request::builder()
            .method("POST")
            .uri("/user/signin")
            .header(header::AUTHORIZATION, "Basic !!!not-base64")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "ATH-004");
    }

    #[tokio::test]
    async fn test_profile_requires_token() {
        let app = create_app().await;
        let id = register(&app, "alice", "a@x.com").await;

        let request = Request::builder()
            .uri(format!("/userprofile/{}", id))
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "ATHR-001");
    }

    #[tokio::test]
    async fn test_profile_of_unknown_account() {
        let app = create_app().await;
        register(&app, "alice", "a@x.com").await;
        let token = sign_in(&app, "alice", "pw-123").await;

        let (status, _, body) = send(&app, authed("GET", "/userprofile/not-a-uuid", &token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "USR-001");

        let missing = uuid::Uuid::new_v4();
        let (status, _, _) =
            send(&app, authed("GET", &format!("/userprofile/{}", missing), &token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_delete_flow() {
        let app = create_app().await;
        let id = register(&app, "alice", "a@x.com").await;
        let user_token = sign_in(&app, "alice", "pw-123").await;
        let admin_token = sign_in(&app, "root", ADMIN_PASSWORD).await;

        let uri = format!("/admin/user/{}", id);

        let (status, _, body) = send(&app, authed("DELETE", &uri, &user_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "ATHR-003");

        let (status, _, body) = send(&app, authed("DELETE", &uri, &admin_token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id.as_str());
        assert_eq!(body["status"], "USER SUCCESSFULLY DELETED");

        let (status, _, body) = send(&app, authed("DELETE", &uri, &admin_token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "USR-001");

        // the deleted account's session went with it
        let (status, _, _) = send(&app, authed("POST", "/user/signout", &user_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, _) = send(&app, sign_in_request("alice", "pw-123")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_metrics_route_only_when_enabled() {
        let store = Arc::new(InMemoryAuthStore::new());
        let hasher = Arc::new(Argon2Hasher::with_cost(1024, 1).unwrap());
        let tokens = Arc::new(JwtTokenIssuer::new("router-test-secret").unwrap());
        let manager = Arc::new(AuthSessionManager::new(store, hasher, tokens));
        let app = create_app_router(AppState::from_manager(manager), None, "/metrics");

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let (status, _, _) = send(&app, request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
