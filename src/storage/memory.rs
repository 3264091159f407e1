//! In-memory document collection implementing the storage port.
//!
//! Documents are kept in insertion order and query expressions are evaluated
//! by scanning them, the way a document store without secondary indexes
//! would. Label predicates on a label the document does not carry never match,
//! negated forms included.

use std::sync::RwLock;

use async_trait::async_trait;
use fnv::FnvHashMap;
use futures::stream::{self, StreamExt};
use regex::Regex;

use crate::matchers::MatchKind;
use crate::query::{Predicate, QueryExpression};
use crate::storage::{SampleRecord, SampleStream, StorageAdapter, StorageError, StoredKey};

#[derive(Default)]
struct Collection {
    /// Map from key to position in `documents`
    index: FnvHashMap<StoredKey, usize>,
    documents: Vec<SampleRecord>,
}

/// Named in-memory collection of sample documents.
pub struct MemoryStorage {
    name: String,
    collection: RwLock<Collection>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new("default")
    }
}

impl MemoryStorage {
    /// Create an empty collection with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), collection: RwLock::new(Collection::default()) }
    }

    /// Number of stored documents.
    pub fn len(&self) -> Result<usize, StorageError> {
        let collection = self.collection.read().map_err(|_| StorageError::Poisoned)?;
        Ok(collection.documents.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// Look up a document by key.
    pub fn get(&self, key: &StoredKey) -> Result<Option<SampleRecord>, StorageError> {
        let collection = self.collection.read().map_err(|_| StorageError::Poisoned)?;
        Ok(collection.index.get(key).map(|&pos| collection.documents[pos].clone()))
    }

    /// Run a query to completion and return matching documents in storage order.
    fn execute(&self, query: &QueryExpression) -> Result<Vec<SampleRecord>, StorageError> {
        let filter = CompiledFilter::new(query)?;
        let collection = self.collection.read().map_err(|_| StorageError::Poisoned)?;
        Ok(collection.documents.iter().filter(|doc| filter.matches(doc)).cloned().collect())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn store(&self, key: StoredKey, sample: SampleRecord) -> Result<(), StorageError> {
        let mut collection = self.collection.write().map_err(|_| StorageError::Poisoned)?;
        // Upsert: an existing key keeps its position.
        if let Some(&pos) = collection.index.get(&key) {
            collection.documents[pos] = sample;
        } else {
            let pos = collection.documents.len();
            collection.documents.push(sample);
            collection.index.insert(key, pos);
        }
        Ok(())
    }

    async fn query(&self, query: &QueryExpression) -> Result<SampleStream, StorageError> {
        let rows = self.execute(query)?;
        Ok(stream::iter(rows.into_iter().map(Ok)).boxed())
    }

    fn collection_name(&self) -> &str {
        &self.name
    }
}

/// A label predicate with its parameter resolved.
enum LabelCheck {
    Equal(String),
    NotEqual(String),
    Regex(Regex),
    NotRegex(Regex),
}

impl LabelCheck {
    fn matches(&self, value: &str) -> bool {
        match self {
            Self::Equal(expected) => value == expected,
            Self::NotEqual(expected) => value != expected,
            // Unanchored: REGEX_CONTAINS semantics.
            Self::Regex(re) => re.is_match(value),
            Self::NotRegex(re) => !re.is_match(value),
        }
    }
}

/// Predicates of one query, ready to be evaluated per document.
struct CompiledFilter {
    labels: Vec<(String, LabelCheck)>,
    ranges: Vec<(i64, i64)>,
}

impl CompiledFilter {
    fn new(query: &QueryExpression) -> Result<Self, StorageError> {
        let mut labels = Vec::new();
        let mut ranges = Vec::new();

        for predicate in query.predicates() {
            match predicate {
                Predicate::Label { label, kind, param } => {
                    let value = query.param(*param).ok_or_else(|| {
                        StorageError::Query(format!("missing parameter {param} for {label}"))
                    })?;
                    let check = match kind {
                        MatchKind::Equal => LabelCheck::Equal(value.to_string()),
                        MatchKind::NotEqual => LabelCheck::NotEqual(value.to_string()),
                        MatchKind::RegexMatch => LabelCheck::Regex(compile_regex(value)?),
                        MatchKind::RegexNotMatch => LabelCheck::NotRegex(compile_regex(value)?),
                    };
                    labels.push((label.clone(), check));
                }
                Predicate::TimeRange { start_ms, end_ms } => ranges.push((*start_ms, *end_ms)),
            }
        }

        Ok(Self { labels, ranges })
    }

    fn matches(&self, doc: &SampleRecord) -> bool {
        self.ranges.iter().all(|&(start, end)| doc.timestamp >= start && doc.timestamp <= end)
            && self
                .labels
                .iter()
                .all(|(name, check)| doc.metric.get(name).is_some_and(|v| check.matches(v)))
    }
}

fn compile_regex(pattern: &str) -> Result<Regex, StorageError> {
    Regex::new(pattern).map_err(|e| StorageError::Query(format!("invalid regex {pattern:?}: {e}")))
}
