//! Health check and metrics exposition handlers.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::http::error::ApiError;
use crate::http::state::AppState;

/// Content type of the Prometheus text exposition produced by `prometheus-client`.
const METRICS_CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Health check endpoint.
///
/// # Returns
///
/// Returns "ok" if the server is healthy.
pub async fn healthz() -> &'static str {
    "ok"
}

/// Expose the adapter metrics.
pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state.metrics().encode().map_err(|_| ApiError::Metrics)?;
    Ok(([(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)], body).into_response())
}
