//! Compilation of read queries into backend query expressions.
//!
//! Each matcher becomes one predicate on the stored `metric` map and a time
//! range predicate is always appended last. Predicates are joined with AND;
//! there is no OR, grouping, or join support.
//!
//! Matcher values are untrusted and always travel as positional parameters.
//! Time bounds are integers and are rendered inline.

use std::fmt;

use thiserror::Error;

use crate::labels::is_valid_label_name;
use crate::matchers::{MatchKind, ReadQuery};

/// Errors raised while compiling a read query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The wire matcher kind is not one of EQ, NEQ, RE, NRE.
    #[error("unsupported matcher type: {0}")]
    UnsupportedMatcher(i32),
    /// The label name cannot be used as a field path.
    #[error("invalid label name: {0:?}")]
    InvalidLabelName(String),
}

/// One clause of a query expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `metric.<label> <op> ?`, with the value at `param` in the parameter list.
    Label { label: String, kind: MatchKind, param: usize },
    /// `timestamp BETWEEN start AND end`, both bounds inclusive.
    TimeRange { start_ms: i64, end_ms: i64 },
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label { label, kind, .. } => match kind {
                MatchKind::Equal => write!(f, "metric.`{label}` = ?"),
                MatchKind::NotEqual => write!(f, "metric.`{label}` != ?"),
                MatchKind::RegexMatch => write!(f, "REGEX_CONTAINS(metric.`{label}`, ?)"),
                MatchKind::RegexNotMatch => write!(f, "NOT REGEX_CONTAINS(metric.`{label}`, ?)"),
            },
            Self::TimeRange { start_ms, end_ms } => {
                write!(f, "timestamp BETWEEN {start_ms} AND {end_ms}")
            }
        }
    }
}

/// A compiled query: predicates in order, their parameters, and the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryExpression {
    collection: String,
    predicates: Vec<Predicate>,
    params: Vec<String>,
}

impl QueryExpression {
    /// Name of the collection the query selects from.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Predicates in matcher order, the time range last.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Values bound positionally to the `?` placeholders.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Value bound to the given placeholder index.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Rendered clauses, in order.
    pub fn clauses(&self) -> Vec<String> {
        self.predicates.iter().map(ToString::to_string).collect()
    }

    /// Full statement text for a SQL-like document store.
    pub fn statement(&self) -> String {
        format!(
            "SELECT `metric`, `timestamp`, `value` FROM `{}` WHERE {}",
            self.collection,
            self.clauses().join(" AND ")
        )
    }
}

/// Compile a read query against the named collection.
///
/// Fails before anything is executed if a label name is not a valid
/// Prometheus label name, since names end up in the statement text.
pub fn compile(query: &ReadQuery, collection: &str) -> Result<QueryExpression, CompileError> {
    let mut predicates = Vec::with_capacity(query.matchers.len() + 1);
    let mut params = Vec::with_capacity(query.matchers.len());

    for matcher in &query.matchers {
        if !is_valid_label_name(&matcher.name) {
            return Err(CompileError::InvalidLabelName(matcher.name.clone()));
        }
        predicates.push(Predicate::Label {
            label: matcher.name.clone(),
            kind: matcher.kind,
            param: params.len(),
        });
        params.push(matcher.value.clone());
    }
    predicates.push(Predicate::TimeRange { start_ms: query.start_ms, end_ms: query.end_ms });

    Ok(QueryExpression { collection: collection.to_string(), predicates, params })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::Matcher;

    fn read_query(matchers: Vec<Matcher>) -> ReadQuery {
        ReadQuery { start_ms: 1000, end_ms: 2000, matchers }
    }

    /// Test the clause list and parameter order for mixed matchers.
    #[test]
    fn test_compile_equal_and_regex() {
        let query = read_query(vec![
            Matcher::new("job", MatchKind::Equal, "api"),
            Matcher::new("env", MatchKind::RegexMatch, "prod.*"),
        ]);

        let expr = compile(&query, "metrics").expect("valid query");
        assert_eq!(
            expr.clauses(),
            vec![
                "metric.`job` = ?",
                "REGEX_CONTAINS(metric.`env`, ?)",
                "timestamp BETWEEN 1000 AND 2000",
            ]
        );
        assert_eq!(expr.params(), ["api", "prod.*"]);
    }

    /// Test rendering of the negated kinds.
    #[test]
    fn test_compile_negated_kinds() {
        let query = read_query(vec![
            Matcher::new("job", MatchKind::NotEqual, "web"),
            Matcher::new("env", MatchKind::RegexNotMatch, "dev.*"),
        ]);

        let expr = compile(&query, "metrics").expect("valid query");
        assert_eq!(expr.clauses()[0], "metric.`job` != ?");
        assert_eq!(expr.clauses()[1], "NOT REGEX_CONTAINS(metric.`env`, ?)");
        assert_eq!(
            expr.predicates()[1],
            Predicate::Label { label: "env".into(), kind: MatchKind::RegexNotMatch, param: 1 }
        );
    }

    /// Test that a query without matchers only carries the time range.
    #[test]
    fn test_compile_without_matchers() {
        let expr = compile(&read_query(vec![]), "metrics").expect("valid query");

        assert_eq!(expr.predicates(), [Predicate::TimeRange { start_ms: 1000, end_ms: 2000 }]);
        assert!(expr.params().is_empty());
    }

    /// Test the full statement text.
    #[test]
    fn test_statement() {
        let query = read_query(vec![Matcher::new("__name__", MatchKind::Equal, "up")]);

        let expr = compile(&query, "default").expect("valid query");
        assert_eq!(
            expr.statement(),
            "SELECT `metric`, `timestamp`, `value` FROM `default` \
             WHERE metric.`__name__` = ? AND timestamp BETWEEN 1000 AND 2000"
        );
        assert_eq!(expr.collection(), "default");
    }

    /// Test that values never leak into the statement text.
    #[test]
    fn test_values_are_parameterized() {
        let query = read_query(vec![Matcher::new("job", MatchKind::Equal, "x' OR '1'='1")]);

        let expr = compile(&query, "metrics").expect("valid query");
        assert!(!expr.statement().contains("OR '1'"));
        assert_eq!(expr.param(0), Some("x' OR '1'='1"));
    }

    /// Test rejection of label names that are not identifiers.
    #[test]
    fn test_invalid_label_name() {
        for name in ["", "1job", "job`) OR (1", "a-b"] {
            let query = read_query(vec![Matcher::new(name, MatchKind::Equal, "v")]);
            let err = compile(&query, "metrics").expect_err("invalid name");
            assert_eq!(err, CompileError::InvalidLabelName(name.to_string()));
        }
    }
}
