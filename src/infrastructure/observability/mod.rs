//! Observability infrastructure - Metrics

mod metrics;

pub use metrics::{
    PrometheusMetrics, create_metrics_router, init_metrics, record_auth_outcome,
    record_http_request,
};
