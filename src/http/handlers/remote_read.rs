//! Remote Read Protocol implementation.
//!
//! Answers the first query of a read request with `SAMPLES` responses; the
//! accepted response types and read hints sent by the client are not used.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::codec::{decode_read_request, encode_read_response};
use crate::http::error::ApiError;
use crate::http::state::AppState;
use crate::metrics::observe_duration;

/// Content type of protobuf response bodies.
pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

/// Handle remote read requests from Prometheus.
///
/// # Returns
///
/// Returns a snappy-compressed protobuf `ReadResponse`, 400 for an
/// undecodable body or an unsupported matcher, or 500 on storage failure.
pub async fn remote_read(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let started = Instant::now();
    let result = handle_remote_read_impl(&state, &body).await;
    observe_duration(&state.metrics().read_latency_seconds, started.elapsed());
    result
}

async fn handle_remote_read_impl(state: &AppState, body: &[u8]) -> Result<Response, ApiError> {
    let request = decode_read_request(body)?;
    debug!("received remote read request with {} queries", request.queries.len());

    let response = state.adapter.read(&request).await?;
    let encoded = encode_read_response(&response)?;

    Ok((
        [(header::CONTENT_TYPE, PROTOBUF_CONTENT_TYPE), (header::CONTENT_ENCODING, "snappy")],
        encoded,
    )
        .into_response())
}
