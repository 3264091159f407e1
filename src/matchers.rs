//! Typed label matchers decoded from remote read queries.
//!
//! Wire matchers carry their kind as a raw enum value; converting them here
//! is where unknown kinds are rejected, before any query is built.

use std::fmt;

use crate::codec::proto::{label_matcher, LabelMatcher as WireMatcher, Query as WireQuery};
use crate::query::CompileError;

/// Comparison a matcher applies to a label value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    Equal,
    NotEqual,
    RegexMatch,
    RegexNotMatch,
}

impl MatchKind {
    /// Operator as written in a Prometheus selector.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::RegexMatch => "=~",
            Self::RegexNotMatch => "!~",
        }
    }
}

impl TryFrom<i32> for MatchKind {
    type Error = CompileError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match label_matcher::Type::try_from(raw) {
            Ok(label_matcher::Type::Eq) => Ok(Self::Equal),
            Ok(label_matcher::Type::Neq) => Ok(Self::NotEqual),
            Ok(label_matcher::Type::Re) => Ok(Self::RegexMatch),
            Ok(label_matcher::Type::Nre) => Ok(Self::RegexNotMatch),
            Err(_) => Err(CompileError::UnsupportedMatcher(raw)),
        }
    }
}

/// A single label filter: `name <kind> value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    pub name: String,
    pub kind: MatchKind,
    pub value: String,
}

impl Matcher {
    pub fn new(name: impl Into<String>, kind: MatchKind, value: impl Into<String>) -> Self {
        Self { name: name.into(), kind, value: value.into() }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{:?}", self.name, self.kind.as_str(), self.value)
    }
}

impl TryFrom<&WireMatcher> for Matcher {
    type Error = CompileError;

    fn try_from(wire: &WireMatcher) -> Result<Self, Self::Error> {
        let kind = MatchKind::try_from(wire.r#type)?;
        Ok(Self::new(wire.name.clone(), kind, wire.value.clone()))
    }
}

/// One read query: ordered matchers over a closed millisecond interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadQuery {
    pub start_ms: i64,
    pub end_ms: i64,
    pub matchers: Vec<Matcher>,
}

impl TryFrom<&WireQuery> for ReadQuery {
    type Error = CompileError;

    /// Fails on the first matcher whose kind is not known.
    fn try_from(wire: &WireQuery) -> Result<Self, Self::Error> {
        let matchers = wire.matchers.iter().map(Matcher::try_from).collect::<Result<_, _>>()?;
        Ok(Self { start_ms: wire.start_timestamp_ms, end_ms: wire.end_timestamp_ms, matchers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(kind: i32, name: &str, value: &str) -> WireMatcher {
        WireMatcher { r#type: kind, name: name.to_string(), value: value.to_string() }
    }

    /// Test conversion of all four known wire kinds.
    #[test]
    fn test_known_kinds() {
        assert_eq!(MatchKind::try_from(0).expect("known"), MatchKind::Equal);
        assert_eq!(MatchKind::try_from(1).expect("known"), MatchKind::NotEqual);
        assert_eq!(MatchKind::try_from(2).expect("known"), MatchKind::RegexMatch);
        assert_eq!(MatchKind::try_from(3).expect("known"), MatchKind::RegexNotMatch);
    }

    /// Test that an unknown kind anywhere in the query fails the conversion.
    #[test]
    fn test_unknown_kind_rejected() {
        let query = WireQuery {
            start_timestamp_ms: 0,
            end_timestamp_ms: 10,
            matchers: vec![wire(0, "job", "api"), wire(7, "env", "prod")],
            hints: None,
        };

        let err = ReadQuery::try_from(&query).expect_err("kind 7 is unknown");
        assert!(matches!(err, CompileError::UnsupportedMatcher(7)));
    }

    /// Test that matcher order and bounds are preserved.
    #[test]
    fn test_read_query_from_wire() {
        let query = WireQuery {
            start_timestamp_ms: 1000,
            end_timestamp_ms: 2000,
            matchers: vec![wire(0, "job", "api"), wire(2, "env", "prod.*")],
            hints: None,
        };

        let read = ReadQuery::try_from(&query).expect("valid query");
        assert_eq!(read.start_ms, 1000);
        assert_eq!(read.end_ms, 2000);
        assert_eq!(
            read.matchers,
            vec![
                Matcher::new("job", MatchKind::Equal, "api"),
                Matcher::new("env", MatchKind::RegexMatch, "prod.*"),
            ]
        );
    }

    /// Test selector-style rendering used in logs.
    #[test]
    fn test_display() {
        let matcher = Matcher::new("env", MatchKind::RegexNotMatch, "dev.*");
        assert_eq!(matcher.to_string(), r#"env!~"dev.*""#);
    }
}
