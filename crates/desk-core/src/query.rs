//! URL-backed filter state.
//!
//! Listing screens keep their filters in the URL query string so a search can be shared,
//! reloaded, or navigated back to. [`QueryParamStore`] owns the live parameters and knows
//! which keys are volatile: those never enter the per-route [`FilterCache`], so free-text
//! search terms do not follow the user to the next visit while structural filters do.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// A single query-parameter value.
///
/// Values parsed from a URL are always `Text`; `Number` and `Bool` are only introduced by
/// code that builds request parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Text(String),
    Number(i64),
    Bool(bool),
}

impl QueryValue {
    pub fn text(value: impl Into<String>) -> Self {
        QueryValue::Text(value.into())
    }

    /// The value as a string slice, for `Text` values only.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            QueryValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interprets the value as a positive integer, accepting numeric text.
    pub fn as_positive(&self) -> Option<u32> {
        match self {
            QueryValue::Number(n) => u32::try_from(*n).ok().filter(|n| *n > 0),
            QueryValue::Text(s) => s.trim().parse::<u32>().ok().filter(|n| *n > 0),
            QueryValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Text(s) => f.write_str(s),
            QueryValue::Number(n) => write!(f, "{n}"),
            QueryValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Number(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

/// Ordered mapping from query key to value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, QueryValue>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a URL query string (with or without the leading `?`).
    ///
    /// Repeated keys keep the last value, as a browser location would.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let map = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), QueryValue::Text(v.into_owned())))
            .collect();
        Self(map)
    }

    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.0 {
            serializer.append_pair(key, &value.to_string());
        }
        serializer.finish()
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    /// The text value under `key`, if present and textual.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(QueryValue::as_text)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        self.0.remove(key)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &QueryValue) -> bool) {
        self.0.retain(|k, v| keep(k, v));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Live filter state for one listing screen.
#[derive(Clone, Debug, Default)]
pub struct QueryParamStore {
    params: QueryParams,
    volatile: BTreeSet<String>,
}

impl QueryParamStore {
    /// Creates a store with no parameters and the given volatile keys.
    pub fn new<I, S>(volatile: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: QueryParams::new(),
            volatile: volatile.into_iter().map(Into::into).collect(),
        }
    }

    /// Replaces the live parameters with those parsed from `query`.
    pub fn load_url(&mut self, query: &str) {
        self.params = QueryParams::from_query_string(query);
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn to_url(&self) -> String {
        self.params.to_query_string()
    }

    pub fn is_volatile(&self, key: &str) -> bool {
        self.volatile.contains(key)
    }

    /// Merges a partial update into the live parameters.
    ///
    /// `None` and empty text remove the key; anything else overwrites it.
    pub fn update<'a, I>(&mut self, changes: I)
    where
        I: IntoIterator<Item = (&'a str, Option<QueryValue>)>,
    {
        for (key, value) in changes {
            match value {
                Some(QueryValue::Text(s)) if s.is_empty() => {
                    self.params.remove(key);
                }
                Some(v) => self.params.set(key, v),
                None => {
                    self.params.remove(key);
                }
            }
        }
        tracing::debug!(query = %self.params.to_query_string(), "query parameters updated");
    }

    /// The subset of parameters that may be cached across navigation.
    pub fn cacheable(&self) -> QueryParams {
        let mut params = self.params.clone();
        params.retain(|k, _| !self.volatile.contains(k));
        params
    }
}

/// Remembers non-volatile filters per route between visits.
#[derive(Clone, Debug, Default)]
pub struct FilterCache {
    routes: HashMap<String, QueryParams>,
}

impl FilterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the cacheable part of `store` for `route`.
    pub fn remember(&mut self, route: &str, store: &QueryParamStore) {
        let cacheable = store.cacheable();
        if cacheable.is_empty() {
            self.routes.remove(route);
        } else {
            self.routes.insert(route.to_string(), cacheable);
        }
    }

    /// Restores cached filters into `store` when the URL carried none.
    ///
    /// Returns `true` if anything was restored.
    pub fn restore(&self, route: &str, store: &mut QueryParamStore) -> bool {
        if !store.params.is_empty() {
            return false;
        }
        match self.routes.get(route) {
            Some(cached) => {
                store.params = cached.clone();
                true
            }
            None => false,
        }
    }
}
