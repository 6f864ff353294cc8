//! Redis-backed [`KvBackend`]
//!
//! Thin mapping from the backend primitives onto the `redis` crate's
//! multiplexed async connection. No retry, pooling, or caching here; the
//! client library owns transport concerns.

use crate::backend::{BatchOp, KvBackend};
use crate::error::{DatastoreError, Result};
use crate::store::KvDatastore;
use async_trait::async_trait;
use parking_lot::RwLock;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use std::time::Duration;
use tracing::{debug, info};

/// Redis connection configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://127.0.0.1:6379/0`
    pub url: String,
    /// Timeout for establishing the connection
    pub connection_timeout: Duration,
    /// Per-command response timeout applied by the client library
    pub response_timeout: Duration,
}

impl RedisConfig {
    /// Create a configuration with the given connection URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connection_timeout: Duration::from_secs(10),
            response_timeout: Duration::from_secs(30),
        }
    }

    /// Set the connection establishment timeout
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the per-command response timeout
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }
}

/// [`KvBackend`] over a shared multiplexed Redis connection.
///
/// The connection slot empties on [`KvBackend::close`]; later calls get
/// `Unavailable("connection closed")`.
pub struct RedisBackend {
    conn: RwLock<Option<MultiplexedConnection>>,
}

impl RedisBackend {
    /// Connect to Redis with the given configuration
    pub async fn connect(config: RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let conn = client
            .get_multiplexed_async_connection_with_timeouts(
                config.response_timeout,
                config.connection_timeout,
            )
            .await?;

        info!("Connected to Redis at {}", config.url);
        Ok(Self {
            conn: RwLock::new(Some(conn)),
        })
    }

    fn connection(&self) -> Result<MultiplexedConnection> {
        self.conn
            .read()
            .clone()
            .ok_or_else(|| DatastoreError::Unavailable("connection closed".to_string()))
    }
}

/// Turn a literal prefix into a KEYS glob that matches exactly the keys
/// starting with it. Redis glob metacharacters in the prefix are escaped.
fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection()?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection()?;
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.connection()?;
        match ttl {
            // SET EX takes whole seconds; sub-second TTLs round up rather
            // than silently becoming "no expiration".
            Some(ttl) => {
                let secs = ttl.as_secs().max(1);
                let _: () = conn.set_ex(key, value, secs).await?;
            }
            None => {
                let _: () = conn.set(key, value).await?;
            }
        }
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.connection()?;
        // DEL reports how many keys existed; idempotent delete ignores it.
        let _: i64 = conn.del(key).await?;
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut conn = self.connection()?;
        let pattern = prefix_pattern(prefix);
        debug!("KEYS pattern={pattern}");
        let keys: Vec<String> = conn.keys(pattern).await?;
        Ok(keys)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let mut conn = self.connection()?;
        let ttl: i64 = conn.ttl(key).await?;
        match ttl {
            -2 => Err(DatastoreError::NotFound(key.to_string())),
            -1 => Ok(None),
            secs => Ok(Some(Duration::from_secs(secs.max(0) as u64))),
        }
    }

    async fn apply_batch(&self, ops: Vec<BatchOp>) -> Result<()> {
        let mut conn = self.connection()?;

        // MULTI/EXEC pipeline: one grouped request, per-command atomicity
        // only. Redis reports an aggregate failure without saying which
        // queued command caused it.
        let mut pipe = redis::pipe();
        pipe.atomic();
        for op in &ops {
            match op {
                BatchOp::Set { key, value } => {
                    pipe.set(key, value.as_slice()).ignore();
                }
                BatchOp::Del { key } => {
                    pipe.del(key).ignore();
                }
            }
        }

        debug!("EXEC pipeline ops={}", ops.len());
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // Dropping the last clone of the multiplexed connection tears the
        // socket down; taking it out of the slot also makes later calls
        // fail fast instead of reusing a released handle.
        if self.conn.write().take().is_some() {
            info!("Redis connection closed");
        }
        Ok(())
    }
}

/// Redis-backed datastore, the concrete variant consumers construct
pub type RedisDatastore = KvDatastore<RedisBackend>;

impl KvDatastore<RedisBackend> {
    /// Connect to Redis with default timeouts
    pub async fn open(url: impl Into<String>) -> Result<Self> {
        Self::connect(RedisConfig::new(url)).await
    }

    /// Connect to Redis with an explicit configuration
    pub async fn connect(config: RedisConfig) -> Result<Self> {
        Ok(KvDatastore::new(RedisBackend::connect(config).await?))
    }
}
