//! Flattening of remote write series into storable records.

use crate::codec::{TimeSeries, WriteRequest};
use crate::labels::LabelSet;
use crate::storage::{SampleRecord, StoredKey};

/// Map one wire series to one keyed record per sample.
///
/// Every record shares the series' label set. Each gets a fresh key, so two
/// identical samples produce two distinct records.
pub fn map_timeseries(series: &TimeSeries) -> Vec<(StoredKey, SampleRecord)> {
    let metric = LabelSet::from_labels(&series.labels);
    series
        .samples
        .iter()
        .map(|s| (StoredKey::generate(), SampleRecord::new(metric.clone(), s.timestamp, s.value)))
        .collect()
}

/// Map a whole write request, series by series, preserving sample order.
pub fn map_write_request(request: &WriteRequest) -> Vec<(StoredKey, SampleRecord)> {
    request.timeseries.iter().flat_map(map_timeseries).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::codec::{Label, Sample};

    fn request() -> WriteRequest {
        WriteRequest {
            timeseries: vec![
                TimeSeries {
                    labels: vec![Label::new("__name__", "up"), Label::new("job", "api")],
                    samples: vec![Sample::new(1000, 1.0), Sample::new(2000, 1.0), Sample::new(3000, 0.0)],
                },
                TimeSeries {
                    labels: vec![Label::new("__name__", "up"), Label::new("job", "web")],
                    samples: vec![Sample::new(1000, 1.0), Sample::new(1000, 1.0)],
                },
                TimeSeries { labels: vec![Label::new("__name__", "empty")], samples: vec![] },
            ],
            metadata: vec![],
        }
    }

    /// Test that one distinct key is generated per sample.
    #[test]
    fn test_one_key_per_sample() {
        let records = map_write_request(&request());
        assert_eq!(records.len(), 5);

        let keys: HashSet<_> = records.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys.len(), 5);
    }

    /// Test that mapping the same request twice never reuses a key.
    #[test]
    fn test_keys_distinct_across_identical_requests() {
        let first = map_write_request(&request());
        let second = map_write_request(&request());

        let keys: HashSet<_> = first.iter().chain(second.iter()).map(|(k, _)| k.clone()).collect();
        assert_eq!(keys.len(), 10);
        assert_eq!(first[0].1, second[0].1);
    }

    /// Test that records carry the series labels, timestamp and value in order.
    #[test]
    fn test_records_share_series_labels() {
        let records = map_write_request(&request());

        let (_, first) = &records[0];
        assert_eq!(first.metric.get("job"), Some("api"));
        assert_eq!(first.timestamp, 1000);

        let (_, third) = &records[2];
        assert_eq!(third.metric, first.metric);
        assert_eq!(third.timestamp, 3000);
        assert_eq!(third.value, 0.0);

        assert_eq!(records[3].1.metric.get("job"), Some("web"));
    }

    /// Test that a repeated label name keeps its last value.
    #[test]
    fn test_repeated_label_name() {
        let series = TimeSeries {
            labels: vec![Label::new("job", "api"), Label::new("job", "web")],
            samples: vec![Sample::new(1, 2.0)],
        };

        let records = map_timeseries(&series);
        assert_eq!(records[0].1.metric.get("job"), Some("web"));
        assert_eq!(records[0].1.metric.len(), 1);
    }
}
