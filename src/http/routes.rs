//! HTTP routing configuration for all API endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::http::handlers::*;
use crate::http::state::AppState;

/// Build the Axum router with all API endpoints.
///
/// # Parameters
///
/// - `state` - Application state containing the adapter
///
/// # Returns
///
/// Returns configured Axum `Router` with the remote storage endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        // Remote storage API
        .route("/write", post(remote_write))
        .route("/read", post(remote_read))
        .with_state(state)
}
