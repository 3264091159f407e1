//! Regrouping of stored rows into time series.

use fnv::FnvHashMap;
use futures::TryStreamExt;

use crate::codec::{Sample, TimeSeries};
use crate::storage::{SampleRecord, SampleStream, StorageError};

/// Folds rows into series keyed by label-set signature.
///
/// Series come out in the order their first row was seen, and samples within
/// a series in the order rows were pushed. Nothing is re-sorted.
#[derive(Debug, Default)]
pub struct SeriesAggregator {
    /// Map from signature to position in `series`
    index: FnvHashMap<String, usize>,
    series: Vec<TimeSeries>,
}

impl SeriesAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one row, creating its series on first sight.
    pub fn push(&mut self, row: SampleRecord) {
        let sample = Sample::new(row.timestamp, row.value);
        let signature = row.metric.signature();

        match self.index.get(&signature) {
            Some(&pos) => self.series[pos].samples.push(sample),
            None => {
                self.index.insert(signature, self.series.len());
                self.series.push(TimeSeries { labels: row.metric.to_labels(), samples: vec![sample] });
            }
        }
    }

    /// Number of distinct series seen so far.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Materialized series in first-seen order.
    pub fn finish(self) -> Vec<TimeSeries> {
        self.series
    }
}

/// Drain a row stream into series. The first row error aborts aggregation.
pub async fn aggregate_rows(mut rows: SampleStream) -> Result<Vec<TimeSeries>, StorageError> {
    let mut aggregator = SeriesAggregator::new();
    while let Some(row) = rows.try_next().await? {
        aggregator.push(row);
    }
    Ok(aggregator.finish())
}
