//! Request orchestration for remote write and remote read.
//!
//! Writes are best effort: every sample is stored with its own call, failures
//! are collected and nothing already stored is rolled back. Reads process only
//! the first query of a request.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, warn};

use crate::aggregate::aggregate_rows;
use crate::codec::{QueryResult, ReadRequest, ReadResponse, TimeSeries, WriteRequest};
use crate::mapper::map_timeseries;
use crate::matchers::ReadQuery;
use crate::metrics::{observe_duration, AdapterMetrics};
use crate::query::{compile, CompileError};
use crate::storage::{StorageAdapter, StorageError, StoredKey};

/// Errors that abort a read request.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The query could not be compiled; nothing was executed.
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// The storage backend failed while executing or streaming the query.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result of storing one sample.
#[derive(Debug)]
pub struct StoreOutcome {
    pub key: StoredKey,
    pub result: Result<(), StorageError>,
}

/// Per-sample outcomes of a write request, in storage call order.
#[derive(Debug, Default)]
pub struct WriteReport {
    outcomes: Vec<StoreOutcome>,
}

impl WriteReport {
    pub fn outcomes(&self) -> &[StoreOutcome] {
        &self.outcomes
    }

    /// Number of samples that were persisted.
    pub fn stored(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Outcomes whose storage call failed.
    pub fn failures(&self) -> impl Iterator<Item = (&StoredKey, &StorageError)> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err().map(|e| (&o.key, e)))
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// All failure messages joined with `", "`, or `None` if every store succeeded.
    pub fn error_message(&self) -> Option<String> {
        let messages: Vec<String> = self.failures().map(|(_, e)| e.to_string()).collect();
        (!messages.is_empty()).then(|| messages.join(", "))
    }
}

/// Sequences codec output through the mapper, compiler, storage and aggregator.
#[derive(Clone)]
pub struct Adapter {
    storage: Arc<dyn StorageAdapter>,
    metrics: Arc<AdapterMetrics>,
}

impl Adapter {
    /// Create an adapter over a storage backend, recording into `metrics`.
    pub fn new(storage: Arc<dyn StorageAdapter>, metrics: Arc<AdapterMetrics>) -> Self {
        Self { storage, metrics }
    }

    pub fn storage(&self) -> &Arc<dyn StorageAdapter> {
        &self.storage
    }

    pub fn metrics(&self) -> &Arc<AdapterMetrics> {
        &self.metrics
    }

    /// Store every sample of the request, one storage call at a time.
    pub async fn write(&self, request: WriteRequest) -> WriteReport {
        let mut report = WriteReport::default();

        for series in &request.timeseries {
            for (key, record) in map_timeseries(series) {
                let started = Instant::now();
                let result = self.storage.store(key.clone(), record).await;
                observe_duration(&self.metrics.write_storage_latency_seconds, started.elapsed());

                if let Err(e) = &result {
                    self.metrics.write_storage_failed.inc();
                    warn!("failed to store sample {key}: {e}");
                }
                report.outcomes.push(StoreOutcome { key, result });
            }
            self.metrics.write_timeseries_samples.observe(series.samples.len() as f64);
        }

        debug!(
            "stored {} of {} samples from {} series",
            report.stored(),
            report.outcomes.len(),
            request.timeseries.len()
        );
        report
    }

    /// Answer a read request from its first query.
    ///
    /// Additional queries are ignored. A request without queries gets an
    /// empty response.
    pub async fn read(&self, request: &ReadRequest) -> Result<ReadResponse, ReadError> {
        let Some(first) = request.queries.first() else {
            debug!("read request without queries");
            return Ok(ReadResponse::default());
        };
        if request.queries.len() > 1 {
            debug!("ignoring {} additional read queries", request.queries.len() - 1);
        }

        let query = ReadQuery::try_from(first)?;
        let timeseries = self.process_query(&query).await?;
        Ok(ReadResponse { results: vec![QueryResult { timeseries }] })
    }

    /// Compile, execute and regroup a single query.
    pub async fn process_query(&self, query: &ReadQuery) -> Result<Vec<TimeSeries>, ReadError> {
        let expr = compile(query, self.storage.collection_name())?;
        debug!("executing {} with params {:?}", expr.statement(), expr.params());

        let started = Instant::now();
        let result = match self.storage.query(&expr).await {
            Ok(rows) => aggregate_rows(rows).await,
            Err(e) => Err(e),
        };
        observe_duration(&self.metrics.read_storage_latency_seconds, started.elapsed());

        let timeseries = result.map_err(|e| {
            self.metrics.read_storage_failed.inc();
            warn!("storage query failed: {e}");
            e
        })?;

        for series in &timeseries {
            self.metrics.read_timeseries_samples.observe(series.samples.len() as f64);
        }
        Ok(timeseries)
    }
}
