use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use super::AppState;
use crate::metrics;

/// State of the Prometheus scrape route
#[derive(Clone)]
pub struct MetricsState {
    pub handle: Arc<PrometheusHandle>,
    pub app: AppState,
}

/// Render Prometheus metrics
///
/// Store sizes are sampled at scrape time rather than tracked on every write.
pub async fn metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    metrics::record_store_sizes(state.app.quotations.len(), state.app.sessions.len());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.handle.render(),
    )
}
