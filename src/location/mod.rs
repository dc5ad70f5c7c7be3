//! Structured location model and its string codec.
//!
//! A [`Location`] is the in-memory form of a serialized location string:
//! an ordered list of pathname segments, a map of query parameters and a
//! small set of commit options. Actions build new locations from old ones;
//! the codec turns them into the string a location store commits.

mod codec;

pub use codec::{deserialize, serialize};

use std::collections::BTreeMap;

use serde::Serialize;

/// Value stored under a query parameter key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SearchValue {
    /// Boolean presence; serializes as the literal `true`.
    Flag,
    Text(String),
    Number(i64),
    /// Serialized with the bracketed key convention (`key[]=a&key[]=b`).
    List(Vec<String>),
}

impl SearchValue {
    /// Scalar string form of the value, as it reads back from the wire.
    ///
    /// Lists have no scalar form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            SearchValue::Flag => Some("true".to_string()),
            SearchValue::Text(text) => Some(text.clone()),
            SearchValue::Number(n) => Some(n.to_string()),
            SearchValue::List(_) => None,
        }
    }

    /// Integer form, used for stack ranks.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            SearchValue::Number(n) => Some(*n),
            SearchValue::Text(text) => text.trim().parse().ok(),
            SearchValue::Flag | SearchValue::List(_) => None,
        }
    }
}

impl From<&str> for SearchValue {
    fn from(value: &str) -> Self {
        SearchValue::Text(value.to_string())
    }
}

impl From<String> for SearchValue {
    fn from(value: String) -> Self {
        SearchValue::Text(value)
    }
}

impl From<i64> for SearchValue {
    fn from(value: i64) -> Self {
        SearchValue::Number(value)
    }
}

/// Options carried alongside a location until it is committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LocationOptions {
    /// Replace the current history entry instead of pushing a new one.
    pub replace_location: bool,
}

/// Structured location: pathname segments, query parameters, options.
///
/// A `None` search value marks a key for removal; the codec drops it when
/// serializing so that clearing a key survives the merge with the
/// previous location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    pub pathname: Vec<String>,
    pub search: BTreeMap<String, Option<SearchValue>>,
    #[serde(skip)]
    pub options: LocationOptions,
}

impl Location {
    pub fn new() -> Self {
        Self::default()
    }

    /// Present value under `key`, ignoring keys marked for removal.
    pub fn search_value(&self, key: &str) -> Option<&SearchValue> {
        self.search.get(key).and_then(Option::as_ref)
    }

    pub fn search_text(&self, key: &str) -> Option<String> {
        self.search_value(key).and_then(SearchValue::as_text)
    }

    pub fn set_search(&mut self, key: &str, value: impl Into<SearchValue>) {
        self.search.insert(key.to_string(), Some(value.into()));
    }

    /// Marks `key` for removal on the next serialization.
    pub fn clear_search(&mut self, key: &str) {
        self.search.insert(key.to_string(), None);
    }

    pub fn segment(&self, index: usize) -> Option<&str> {
        self.pathname.get(index).map(String::as_str)
    }

    /// Writes `value` at `index` and drops every deeper segment.
    ///
    /// Returns `false` (leaving the pathname untouched) when the segments
    /// before `index` are missing, since a gap would need empty segments.
    pub fn set_segment(&mut self, index: usize, value: &str) -> bool {
        if self.pathname.len() < index || value.is_empty() {
            return false;
        }
        self.pathname.truncate(index);
        self.pathname.push(value.to_string());
        true
    }

    /// Drops the segment at `index` and everything after it.
    pub fn truncate_path(&mut self, index: usize) {
        self.pathname.truncate(index);
    }
}
