//! Application state shared by the HTTP handlers.

use std::io;
use std::sync::Arc;

use crate::adapter::Adapter;
use crate::metrics::AdapterMetrics;
use crate::storage::StorageAdapter;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator for write and read requests
    pub adapter: Adapter,
}

impl AppState {
    /// Create new application state around an adapter.
    pub fn new(adapter: Adapter) -> Self {
        Self { adapter }
    }

    /// Get a builder for configuring application state step by step.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Metrics the adapter records into.
    pub fn metrics(&self) -> &Arc<AdapterMetrics> {
        self.adapter.metrics()
    }
}

/// Builder for constructing AppState with fluent interface.
#[derive(Default)]
pub struct AppStateBuilder {
    storage: Option<Arc<dyn StorageAdapter>>,
    metrics: Option<Arc<AdapterMetrics>>,
}

impl AppStateBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage backend.
    pub fn with_storage(mut self, storage: Arc<dyn StorageAdapter>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the metrics container, shared with whoever exposes it.
    pub fn with_metrics(mut self, metrics: Arc<AdapterMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the final AppState.
    ///
    /// # Errors
    ///
    /// Returns error if storage is not provided.
    pub fn build(self) -> io::Result<AppState> {
        let storage = self.storage.ok_or(io::Error::new(
            io::ErrorKind::InvalidInput,
            "Storage is required for AppState",
        ))?;
        let metrics = self.metrics.unwrap_or_default();

        Ok(AppState::new(Adapter::new(storage, metrics)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    /// Test that building without storage fails.
    #[test]
    fn test_builder_requires_storage() {
        let err = AppState::builder().build().err().expect("storage missing");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    /// Test that injected metrics are the ones the adapter records into.
    #[test]
    fn test_builder_shares_metrics() {
        let metrics = Arc::new(AdapterMetrics::new());
        let state = AppState::builder()
            .with_storage(Arc::new(MemoryStorage::new("metrics")))
            .with_metrics(metrics.clone())
            .build()
            .expect("valid state");

        assert!(Arc::ptr_eq(state.metrics(), &metrics));
        assert_eq!(state.adapter.storage().collection_name(), "metrics");
    }
}
