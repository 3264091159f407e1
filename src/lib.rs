//! # Prometheus Remote Storage Adapter
//!
//! A library implementing the Prometheus remote-write and remote-read
//! protocol on top of a pluggable storage backend.
//!
//! This library provides components for:
//! - **Wire Codec**: snappy + protobuf decoding and encoding of protocol bodies
//! - **Sample Mapping**: one keyed, storable record per written sample
//! - **Query Compilation**: label matchers into parameterized query expressions
//! - **Result Aggregation**: stored rows regrouped into time series
//! - **In-Memory Storage**: a document collection implementing the storage port
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use prom_remote_adapter::{MemoryStorage, http::build_router};
//!
//! # fn example() -> std::io::Result<()> {
//! let storage = Arc::new(MemoryStorage::new("metrics"));
//!
//! let state = prom_remote_adapter::http::AppState::builder()
//!     .with_storage(storage)
//!     .build()?;
//! let app = build_router(state);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod aggregate;
pub mod codec;
pub mod config;
pub mod http;
pub mod labels;
pub mod mapper;
pub mod matchers;
pub mod metrics;
pub mod query;
pub mod storage;

// Re-export commonly used types for convenience
pub use adapter::{Adapter, ReadError, StoreOutcome, WriteReport};
pub use aggregate::SeriesAggregator;
pub use config::AdapterConfig;
pub use labels::LabelSet;
pub use matchers::{MatchKind, Matcher, ReadQuery};
pub use metrics::AdapterMetrics;
pub use query::{compile, CompileError, Predicate, QueryExpression};
pub use storage::{MemoryStorage, SampleRecord, StorageAdapter, StorageError, StoredKey};
