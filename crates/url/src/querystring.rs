//! Encoding and decoding of `application/x-www-form-urlencoded` style query strings

use indexmap::IndexMap;
use serde::Serialize;

use crate::percent_encode::{encode_uri_component, percent_decode};

/// Keys after this many pairs are ignored
pub const MAX_KEYS: usize = 1000;

/// A parsed query string, in the order in which keys first appeared
pub type QueryMap = IndexMap<String, QueryValue>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Single(String),

    /// A key that appeared more than once
    Multiple(Vec<String>),
}

impl QueryValue {
    /// The first value
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multiple(values) => values.first().map(String::as_str),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            Self::Single(first) => {
                let first = std::mem::take(first);
                *self = Self::Multiple(vec![first, value]);
            },
            Self::Multiple(values) => values.push(value),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

/// Parses `a=1&b=2&a=3` into `{a: [1, 3], b: 2}`
///
/// `+` decodes to a space. A pair without `=` has an empty value.
#[must_use]
pub fn parse(input: &str) -> QueryMap {
    let mut map = QueryMap::new();
    if input.is_empty() {
        return map;
    }

    for pair in input.split('&').take(MAX_KEYS) {
        let pair = pair.replace('+', "%20");
        let (key, value) = pair.split_once('=').unwrap_or((pair.as_str(), ""));
        let key = unescape(key);
        let value = unescape(value);

        match map.get_mut(&key) {
            Some(existing) => existing.push(value),
            None => {
                map.insert(key, QueryValue::Single(value));
            },
        }
    }

    map
}

/// Serializes a query map, repeating keys that have several values
#[must_use]
pub fn stringify(query: &QueryMap) -> String {
    let mut pairs = Vec::with_capacity(query.len());

    for (key, value) in query {
        let key = escape(key);
        match value {
            QueryValue::Single(value) => pairs.push(format!("{key}={}", escape(value))),
            QueryValue::Multiple(values) => {
                pairs.extend(values.iter().map(|value| format!("{key}={}", escape(value))));
            },
        }
    }

    pairs.join("&")
}

#[inline]
#[must_use]
pub fn escape(input: &str) -> String {
    encode_uri_component(input)
}

#[inline]
#[must_use]
pub fn unescape(input: &str) -> String {
    percent_decode(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pairs() {
        let query = parse("a=1&b=two+words&c&d=x%3Dy");

        assert_eq!(query["a"], QueryValue::from("1"));
        assert_eq!(query["b"], QueryValue::from("two words"));
        assert_eq!(query["c"], QueryValue::from(""));
        assert_eq!(query["d"], QueryValue::from("x=y"));
    }

    #[test]
    fn repeated_keys_are_collected() {
        let query = parse("a=1&b=2&a=3&a=4");

        assert_eq!(
            query["a"],
            QueryValue::Multiple(vec!["1".into(), "3".into(), "4".into()])
        );
        assert_eq!(query.keys().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn empty_input() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn key_limit() {
        let input = (0..1500).map(|i| format!("k{i}=v")).collect::<Vec<_>>().join("&");
        assert_eq!(parse(&input).len(), MAX_KEYS);
    }

    #[test]
    fn stringify_repeats_keys() {
        let mut query = QueryMap::new();
        query.insert("a b".into(), QueryValue::from("1&2"));
        query.insert("list".into(), QueryValue::Multiple(vec!["x".into(), "y".into()]));

        assert_eq!(stringify(&query), "a%20b=1%262&list=x&list=y");
    }
}
