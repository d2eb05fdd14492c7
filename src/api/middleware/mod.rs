//! API middleware components

pub mod admin_auth;
pub mod logging;
pub mod metrics;
pub mod user_auth;

pub use admin_auth::RequireAdmin;
pub use logging::logging_middleware;
pub use metrics::metrics_middleware;
pub use user_auth::{RequireUser, extract_access_token, extract_authorization};
