//! Storage port and the records that travel through it.
//!
//! The adapter never talks to a database directly. Everything it persists or
//! reads goes through [`StorageAdapter`], so a concrete engine can be plugged
//! in behind the same three operations.

pub mod memory;

// Re-export main implementations
pub use memory::MemoryStorage;

use std::fmt;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::labels::LabelSet;
use crate::query::QueryExpression;

/// Errors reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backend rejected or failed an operation.
    #[error("{0}")]
    Backend(String),
    /// The backend could not execute a query expression.
    #[error("invalid query: {0}")]
    Query(String),
    /// Shared state was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Lazy sequence of rows returned by [`StorageAdapter::query`].
pub type SampleStream = BoxStream<'static, Result<SampleRecord, StorageError>>;

/// Storage abstraction the adapter persists samples into and reads them from.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Persist one record under one key.
    ///
    /// Calls are independent: a failure affects only this record.
    async fn store(&self, key: StoredKey, sample: SampleRecord) -> Result<(), StorageError>;

    /// Execute a compiled query with its bound parameters.
    async fn query(&self, query: &QueryExpression) -> Result<SampleStream, StorageError>;

    /// Logical name of the collection the adapter targets.
    fn collection_name(&self) -> &str;
}

/// Opaque unique identifier a record is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoredKey(String);

impl StoredKey {
    /// Generate a fresh random key.
    ///
    /// Keys never depend on the record, so identical samples written twice
    /// are stored twice.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoredKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for StoredKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// One stored sample: the series labels, a timestamp and a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub metric: LabelSet,
    /// Milliseconds since Unix epoch.
    pub timestamp: i64,
    pub value: f64,
}

impl SampleRecord {
    pub fn new(metric: LabelSet, timestamp: i64, value: f64) -> Self {
        Self { metric, timestamp, value }
    }
}
