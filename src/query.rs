//! Query descriptor, result entries, and the naive post-processor
//!
//! The adapter itself only consumes `prefix` and `keys_only`; ordering,
//! offset and limit are applied afterwards by [`apply`] on the raw result
//! set assembled from the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sort order applied to a raw result set.
///
/// Only key orders exist: values may be absent (keys-only queries), so
/// they are not sortable in general.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    ByKey,
    ByKeyDescending,
}

/// A prefix-scan query against the backend key space
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Literal string prefix matched against backend keys
    pub prefix: String,
    /// Skip value and TTL fetches; entries carry empty values and size -1
    pub keys_only: bool,
    /// Optional sort order applied by the post-processor
    pub order: Option<Order>,
    /// Entries skipped from the front of the (ordered) result set
    pub offset: usize,
    /// Maximum number of entries returned
    pub limit: Option<usize>,
}

impl Query {
    /// Create a query matching all keys under `prefix`
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Query {
            prefix: prefix.into(),
            ..Query::default()
        }
    }

    /// Return keys without fetching values or TTLs
    pub fn keys_only(mut self) -> Self {
        self.keys_only = true;
        self
    }

    /// Sort results before offset/limit are applied
    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Skip the first `offset` results
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Cap the number of results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A single query result record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Backend key in its literal string form
    pub key: String,
    /// Stored value; empty for keys-only queries
    pub value: Vec<u8>,
    /// Value size in bytes; -1 for keys-only queries
    pub size: i64,
    /// Approximate absolute expiration, computed as "now + remaining TTL"
    /// at enumeration time. `None` when the key has no expiration or the
    /// query was keys-only. Drifts by network and processing latency;
    /// never exact.
    pub expiration: Option<DateTime<Utc>>,
}

/// Apply order, offset and limit to a raw result set.
///
/// This is the naive in-memory post-processor: sorting is a full sort of
/// the materialized set, offset/limit are plain slicing.
pub fn apply(query: &Query, mut entries: Vec<Entry>) -> Vec<Entry> {
    match query.order {
        Some(Order::ByKey) => entries.sort_by(|a, b| a.key.cmp(&b.key)),
        Some(Order::ByKeyDescending) => entries.sort_by(|a, b| b.key.cmp(&a.key)),
        None => {}
    }

    let mut entries: Vec<Entry> = entries.into_iter().skip(query.offset).collect();
    if let Some(limit) = query.limit {
        entries.truncate(limit);
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str) -> Entry {
        Entry {
            key: key.to_string(),
            value: Vec::new(),
            size: -1,
            expiration: None,
        }
    }

    fn keys(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn test_apply_order_by_key() {
        let raw = vec![entry("/b"), entry("/a/2"), entry("/a/1")];

        let asc = apply(&Query::prefix("/").order(Order::ByKey), raw.clone());
        assert_eq!(keys(&asc), vec!["/a/1", "/a/2", "/b"]);

        let desc = apply(&Query::prefix("/").order(Order::ByKeyDescending), raw);
        assert_eq!(keys(&desc), vec!["/b", "/a/2", "/a/1"]);
    }

    #[test]
    fn test_apply_offset_and_limit() {
        let raw = vec![entry("/a"), entry("/b"), entry("/c"), entry("/d")];
        let q = Query::prefix("/").order(Order::ByKey).offset(1).limit(2);
        let out = apply(&q, raw);
        assert_eq!(keys(&out), vec!["/b", "/c"]);
    }

    #[test]
    fn test_apply_offset_past_end() {
        let raw = vec![entry("/a")];
        let out = apply(&Query::prefix("/").offset(5), raw);
        assert!(out.is_empty());
    }

    #[test]
    fn test_apply_without_order_preserves_input() {
        let raw = vec![entry("/b"), entry("/a")];
        let out = apply(&Query::prefix("/"), raw.clone());
        assert_eq!(out, raw);
    }
}
