//! Abstraction over the remote KV store's primitive operations
//!
//! The adapter in [`crate::store`] is written against this trait so it can
//! be exercised with an in-process fake ([`crate::memory::MemoryBackend`])
//! as well as a live Redis connection ([`crate::redis::RedisBackend`]).
//! The backend is an explicitly constructed, explicitly owned resource
//! handed to the adapter at construction; never a process global.

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A single write queued into a pipelined batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Set { key: String, value: Vec<u8> },
    Del { key: String },
}

/// Primitive operations the remote KV store exposes.
///
/// The engine behind these calls (networking, persistence, eviction) is a
/// black box; implementations only map each primitive onto their client
/// library. No implementation may retry on its own: a replayed pipeline
/// would double-apply non-idempotent batches.
#[async_trait]
pub trait KvBackend: Send + Sync + 'static {
    /// Fetch the value for a literal key, `None` on a miss
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// True iff the key exists
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Unconditional overwrite; `ttl: None` stores without expiration
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;

    /// Remove a key; succeeds whether or not the key existed
    async fn del(&self, key: &str) -> Result<()>;

    /// All stored keys whose string form starts with `prefix`, literally
    async fn keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Remaining time-to-live for a key; `Ok(None)` when the key has no
    /// expiration, `Err(NotFound)` when the key is absent
    async fn ttl(&self, key: &str) -> Result<Option<Duration>>;

    /// Send queued writes to the store as one grouped request.
    ///
    /// Best-effort: the store may apply some operations and fail others;
    /// only an aggregate error comes back.
    async fn apply_batch(&self, ops: Vec<BatchOp>) -> Result<()>;

    /// Release the underlying connection
    async fn close(&self) -> Result<()>;
}
