//! Canonical query parameters.
//!
//! Every accepted input shape ends up as a [`ParamMap`]: an ordered list of
//! key/value pairs that keeps duplicate keys.

use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use url::form_urlencoded;

/// Ordered key/value pairs, duplicates allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
    pairs: Vec<(String, String)>,
}

impl ParamMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a raw query string, with or without its leading `?`.
    ///
    /// Decoding is as permissive as browser `URLSearchParams`: `+` becomes a
    /// space, bad percent escapes pass through, and a key without `=` gets an
    /// empty value.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    /// Build from a plain record where each value is absent, one string, or
    /// several strings.
    ///
    /// Absent values are dropped and lists are joined with commas, so they
    /// reach the filter compiler as comma-separated membership values.
    pub fn from_record<I, K>(record: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<RecordValue>)>,
        K: Into<String>,
    {
        record
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key.into(), value.into_joined())))
            .collect()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Value of the last occurrence of `key`.
    #[must_use]
    pub fn last(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }

    /// Encode as `application/x-www-form-urlencoded`, without a leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for ParamMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.pairs
            .extend(iter.into_iter().map(|(key, value)| (key.into(), value.into())));
    }
}

/// A value of a plain record input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValue {
    One(String),
    Many(Vec<String>),
}

impl RecordValue {
    fn into_joined(self) -> String {
        match self {
            Self::One(value) => value,
            Self::Many(values) => values.join(","),
        }
    }
}

impl From<&str> for RecordValue {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for RecordValue {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for RecordValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl From<Vec<&str>> for RecordValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// Any input the parser accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryInput {
    /// A raw query string, optionally prefixed with `?`
    Raw(String),
    /// Already-canonical pairs
    Params(ParamMap),
    /// A plain record; see [`ParamMap::from_record`]
    Record(Vec<(String, Option<RecordValue>)>),
}

impl QueryInput {
    /// Normalise into canonical pairs.
    #[must_use]
    pub fn into_params(self) -> ParamMap {
        match self {
            Self::Raw(query) => ParamMap::parse(&query),
            Self::Params(params) => params,
            Self::Record(record) => ParamMap::from_record(record),
        }
    }
}

impl From<&str> for QueryInput {
    fn from(query: &str) -> Self {
        Self::Raw(query.to_string())
    }
}

impl From<String> for QueryInput {
    fn from(query: String) -> Self {
        Self::Raw(query)
    }
}

impl From<&String> for QueryInput {
    fn from(query: &String) -> Self {
        Self::Raw(query.clone())
    }
}

impl From<ParamMap> for QueryInput {
    fn from(params: ParamMap) -> Self {
        Self::Params(params)
    }
}

impl From<Vec<(String, String)>> for QueryInput {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::Params(pairs.into_iter().collect())
    }
}

impl From<&[(&str, &str)]> for QueryInput {
    fn from(pairs: &[(&str, &str)]) -> Self {
        Self::Params(pairs.iter().copied().collect())
    }
}

impl From<Vec<(String, Option<RecordValue>)>> for QueryInput {
    fn from(record: Vec<(String, Option<RecordValue>)>) -> Self {
        Self::Record(record)
    }
}

impl From<IndexMap<String, Option<RecordValue>>> for QueryInput {
    fn from(record: IndexMap<String, Option<RecordValue>>) -> Self {
        Self::Record(record.into_iter().collect())
    }
}

impl From<BTreeMap<String, String>> for QueryInput {
    fn from(record: BTreeMap<String, String>) -> Self {
        Self::Record(
            record
                .into_iter()
                .map(|(key, value)| (key, Some(RecordValue::One(value))))
                .collect(),
        )
    }
}

/// `HashMap` iteration order is unspecified, so the resulting field order is too.
impl From<HashMap<String, String>> for QueryInput {
    fn from(record: HashMap<String, String>) -> Self {
        Self::Record(
            record
                .into_iter()
                .map(|(key, value)| (key, Some(RecordValue::One(value))))
                .collect(),
        )
    }
}

impl From<HashMap<String, Vec<String>>> for QueryInput {
    fn from(record: HashMap<String, Vec<String>>) -> Self {
        Self::Record(
            record
                .into_iter()
                .map(|(key, values)| (key, Some(RecordValue::Many(values))))
                .collect(),
        )
    }
}
