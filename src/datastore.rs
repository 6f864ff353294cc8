//! Generic datastore interface
//!
//! The storage contract consumers program against. [`Datastore`] is a
//! capability set (read, write, query, batch, lifecycle) with trait
//! objects at the seam, so a Redis-backed store, an in-memory store, or a
//! future on-disk store are interchangeable without touching consumer
//! code.

use crate::error::Result;
use crate::key::Key;
use crate::query::{Entry, Query};
use async_trait::async_trait;

/// Generic storage contract over opaque keys and byte values.
///
/// Every operation is a direct, synchronous round-trip to the backing
/// store; the datastore imposes no internal locking, caching, retry, or
/// timeout. Concurrent callers on one instance get whatever ordering the
/// backing store's own concurrency model provides.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Fetch the value stored under `key`.
    ///
    /// Fails with [`crate::DatastoreError::NotFound`] when the store has
    /// no such key.
    async fn get(&self, key: &Key) -> Result<Vec<u8>>;

    /// True iff `key` currently exists in the store
    async fn has(&self, key: &Key) -> Result<bool>;

    /// Size in bytes of the value stored under `key`.
    ///
    /// Defined as `get(key)?.len()`: the full value is transferred, so
    /// this is never cheaper than `get`.
    async fn get_size(&self, key: &Key) -> Result<usize>;

    /// Scan keys by literal prefix and assemble result entries.
    ///
    /// Cost is linear in the number of matching keys, plus one value and
    /// one TTL fetch per match unless the query is keys-only.
    async fn query(&self, query: Query) -> Result<Vec<Entry>>;

    /// Store `value` under `key`, unconditionally overwriting and
    /// clearing any expiration
    async fn put(&self, key: &Key, value: Vec<u8>) -> Result<()>;

    /// Remove `key`. Idempotent: deleting an absent key is not an error.
    async fn delete(&self, key: &Key) -> Result<()>;

    /// Flush pending writes under `prefix` to durable storage.
    ///
    /// A no-op for remote backends, which provide their own durability;
    /// there is nothing client-side to flush.
    async fn sync(&self, prefix: &Key) -> Result<()>;

    /// Release the underlying connection. Operations after a successful
    /// close have no defined behavior; construct a fresh datastore to
    /// continue.
    async fn close(&self) -> Result<()>;

    /// Create a batch sharing this datastore's connection
    fn batch(&self) -> Result<Box<dyn Batch>>;
}

/// A mutable set of queued writes committed as one grouped request.
///
/// Queued operations stay client-side and are invisible to every reader,
/// including ones on the same connection, until [`Batch::commit`] sends
/// them together. Commit is best-effort, not atomic: the store may apply
/// some operations and fail others, and only an aggregate error is
/// reported. Dropping an uncommitted batch discards it with no backend
/// effect.
#[async_trait]
pub trait Batch: Send {
    /// Queue an overwrite of `key` with `value`
    fn put(&mut self, key: &Key, value: Vec<u8>) -> Result<()>;

    /// Queue a removal of `key`
    fn delete(&mut self, key: &Key) -> Result<()>;

    /// Send all queued operations and wait for completion.
    ///
    /// Consumes the batch; committed is a terminal state.
    async fn commit(self: Box<Self>) -> Result<()>;
}
