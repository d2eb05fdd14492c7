//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use uuid::Uuid;

use crate::config::MetricsConfig;
use crate::domain::AuthError;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("quora_auth_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record the outcome of an auth operation (sign_up, sign_in, ...)
pub fn record_auth_outcome<T>(operation: &'static str, result: &Result<T, AuthError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };

    counter!("auth_operations_total", "operation" => operation, "outcome" => outcome)
        .increment(1);

    match result {
        Ok(_) => tracing::debug!(operation, "Auth operation succeeded"),
        Err(AuthError::Storage { message }) => {
            tracing::error!(operation, error = %message, "Auth operation hit a storage failure")
        }
        Err(e) => tracing::debug!(operation, code = e.code(), outcome, "Auth operation rejected"),
    }
}

/// Sanitize URL path for metric labels (replace IDs, limit cardinality)
fn sanitize_path(path: &str) -> String {
    let path = path
        .split('/')
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() || segment.parse::<u64>().is_ok() {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/");

    path.chars().take(50).collect()
}
