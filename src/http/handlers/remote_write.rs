//! Remote Write Protocol implementation.
//!
//! Decodes snappy-compressed protobuf write requests and stores every sample
//! through the adapter.

use std::time::Instant;

use axum::{body::Bytes, extract::State, http::StatusCode};
use tracing::debug;

use crate::codec::decode_write_request;
use crate::http::error::ApiError;
use crate::http::state::AppState;
use crate::metrics::observe_duration;

/// Handle remote write requests from Prometheus or compatible agents.
///
/// # Returns
///
/// Returns HTTP 200 when every sample was stored, 400 for an undecodable body,
/// or 500 with all storage error messages joined. Samples stored before or
/// after a failure stay stored.
pub async fn remote_write(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let started = Instant::now();
    let result = handle_remote_write_impl(&state, &body).await;
    observe_duration(&state.metrics().write_latency_seconds, started.elapsed());
    result
}

async fn handle_remote_write_impl(state: &AppState, body: &[u8]) -> Result<StatusCode, ApiError> {
    let request = decode_write_request(body)?;
    debug!("received remote write request with {} series", request.timeseries.len());

    let report = state.adapter.write(request).await;
    match report.error_message() {
        Some(message) => Err(ApiError::Write(message)),
        None => Ok(StatusCode::OK),
    }
}
