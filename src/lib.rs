//! # redis-datastore
//!
//! Redis-backed implementation of a generic datastore interface, so
//! content-addressed storage consumers can use a remote Redis-class KV
//! store interchangeably with other backends.
//!
//! ## Features
//!
//! - 💾 **Point operations**: get / has / get_size / put / delete over
//!   opaque keys and byte values
//! - 🔍 **Prefix queries**: scan-style enumeration with key-only mode and
//!   naive order/offset/limit post-processing
//! - 📦 **Pipelined batches**: queue writes client-side, commit as one
//!   grouped best-effort request
//! - 🔌 **Pluggable backends**: the adapter is written against a backend
//!   trait; Redis and in-memory variants ship in the box
//! - 🔄 **Async/Await**: built on Tokio, no adapter-side locking or retry
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use redis_datastore::{Datastore, Key, Query, RedisDatastore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = RedisDatastore::open("redis://127.0.0.1:6379").await?;
//!
//!     let key = Key::new("/user/1");
//!     store.put(&key, b"John Doe".to_vec()).await?;
//!     let value = store.get(&key).await?;
//!     println!("Value: {:?}", value);
//!
//!     let users = store.query(Query::prefix("/user")).await?;
//!     println!("{} users", users.len());
//!
//!     store.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Known limitations
//!
//! - Entry expirations computed during queries are approximate: the
//!   backend only reports relative TTLs, so "now + TTL" drifts by the
//!   round-trip latency.
//! - Per-key fetch errors during query enumeration are swallowed
//!   (best-effort); only a failed key listing fails the query.
//! - Batch commits are pipelined, not atomic: partial application is
//!   possible and only an aggregate error is reported.

pub mod backend;
pub mod datastore;
pub mod error;
pub mod key;
pub mod memory;
pub mod query;
pub mod redis;
pub mod store;

pub use crate::backend::{BatchOp, KvBackend};
pub use crate::datastore::{Batch, Datastore};
pub use crate::error::{DatastoreError, Result};
pub use crate::key::Key;
pub use crate::memory::MemoryBackend;
pub use crate::query::{Entry, Order, Query};
pub use crate::redis::{RedisBackend, RedisConfig, RedisDatastore};
pub use crate::store::{KvBatch, KvDatastore};
