//! Label sets and their canonical signatures.

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

use crate::codec::Label;

/// Reserved label carrying the metric name.
pub const METRIC_NAME_LABEL: &str = "__name__";

/// Mapping from label name to label value identifying one series.
///
/// Names are unique; building a set from a list where a name repeats keeps
/// the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(FnvHashMap<String, String>);

impl LabelSet {
    /// Create an empty label set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a label set from wire labels, last value wins on repeated names.
    pub fn from_labels(labels: &[Label]) -> Self {
        labels.iter().map(|l| (l.name.clone(), l.value.clone())).collect()
    }

    /// Insert a label, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    /// Value of the named label, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Pairs sorted by label name.
    fn sorted(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));
        pairs
    }

    /// Materialize the set as wire labels, sorted by name.
    pub fn to_labels(&self) -> Vec<Label> {
        self.sorted().into_iter().map(|(name, value)| Label::new(name, value)).collect()
    }

    /// Canonical string for this set, independent of insertion order.
    ///
    /// Rendered like the Prometheus text form: the metric name followed by the
    /// remaining labels in name order, e.g. `up{instance="a:9100", job="node"}`.
    /// Values are always quoted; names are quoted unless they are plain
    /// identifiers, so distinct sets never render the same.
    pub fn signature(&self) -> String {
        let mut out = String::new();
        if let Some(name) = self.get(METRIC_NAME_LABEL) {
            push_name(&mut out, name, is_valid_metric_name(name));
        }
        out.push('{');
        let pairs = self.sorted().into_iter().filter(|(name, _)| *name != METRIC_NAME_LABEL);
        for (i, (name, value)) in pairs.enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            push_name(&mut out, name, is_valid_label_name(name));
            out.push('=');
            out.push_str(&format!("{value:?}"));
        }
        out.push('}');
        out
    }
}

fn push_name(out: &mut String, name: &str, plain: bool) {
    if plain {
        out.push_str(name);
    } else {
        out.push_str(&format!("{name:?}"));
    }
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`
pub fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that repeated names keep the last value.
    #[test]
    fn test_last_value_wins() {
        let labels = vec![Label::new("job", "api"), Label::new("env", "dev"), Label::new("job", "web")];

        let set = LabelSet::from_labels(&labels);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("job"), Some("web"));
    }

    /// Test that insertion order does not affect the signature.
    #[test]
    fn test_signature_is_order_independent() {
        let a: LabelSet = [("job", "api"), ("env", "prod")].into_iter().collect();
        let b: LabelSet = [("env", "prod"), ("job", "api")].into_iter().collect();

        assert_eq!(a.signature(), b.signature());
        assert_eq!(a.signature(), r#"{env="prod", job="api"}"#);
    }

    /// Test that the metric name is rendered in front of the braces.
    #[test]
    fn test_signature_with_metric_name() {
        let set: LabelSet =
            [("job", "node"), ("__name__", "up"), ("instance", "a:9100")].into_iter().collect();

        assert_eq!(set.signature(), r#"up{instance="a:9100", job="node"}"#);
    }

    /// Test that values containing quotes cannot collide with other sets.
    #[test]
    fn test_signature_escapes_values() {
        let a: LabelSet = [("a", r#"x", b="y"#)].into_iter().collect();
        let b: LabelSet = [("a", "x"), ("b", "y")].into_iter().collect();

        assert_ne!(a.signature(), b.signature());
    }

    /// Test that label names containing separators cannot collide with other sets.
    #[test]
    fn test_signature_quotes_unusual_names() {
        let a: LabelSet = [("a", "x"), ("b", "y")].into_iter().collect();
        let b: LabelSet = [(r#"a="x", b"#, "y")].into_iter().collect();

        assert_ne!(a.signature(), b.signature());
        assert_eq!(b.signature(), r#"{"a=\"x\", b"="y"}"#);
    }

    /// Test that an unusual metric name is quoted in front of the braces.
    #[test]
    fn test_signature_quotes_unusual_metric_name() {
        let a: LabelSet = [("__name__", r#"up{a="x"}"#)].into_iter().collect();
        let b: LabelSet = [("__name__", "up"), ("a", "x")].into_iter().collect();

        assert_ne!(a.signature(), b.signature());
        assert_eq!(b.signature(), r#"up{a="x"}"#);
    }

    /// Test the name validity checks.
    #[test]
    fn test_name_validity() {
        assert!(is_valid_label_name("job"));
        assert!(is_valid_label_name("__name__"));
        assert!(!is_valid_label_name("1job"));
        assert!(!is_valid_label_name("a-b"));
        assert!(!is_valid_label_name(""));
        assert!(is_valid_metric_name("node:cpu:rate5m"));
        assert!(!is_valid_metric_name("up{}"));
    }

    /// Test that wire labels come out sorted by name.
    #[test]
    fn test_to_labels_sorted() {
        let set: LabelSet = [("job", "api"), ("__name__", "up"), ("env", "prod")].into_iter().collect();

        let names: Vec<_> = set.to_labels().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["__name__", "env", "job"]);
    }

    /// Test the JSON document shape of a label set.
    #[test]
    fn test_serializes_as_map() {
        let set: LabelSet = [("job", "api")].into_iter().collect();

        let json = serde_json::to_value(&set).expect("serializable");
        assert_eq!(json, serde_json::json!({"job": "api"}));
    }
}
