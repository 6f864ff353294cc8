//! In-memory backend
//!
//! A process-local [`KvBackend`] with the same TTL semantics as the
//! remote store. Useful as the injected fake in adapter tests and as a
//! drop-in variant for consumers that want the datastore contract without
//! a network hop.

use crate::backend::{BatchOp, KvBackend};
use crate::error::{DatastoreError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct StoredValue {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// In-memory KV backend with per-key expiration
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<HashMap<String, StoredValue>>>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) keys
    pub fn len(&self) -> usize {
        self.data.read().values().filter(|v| !v.is_expired()).count()
    }

    /// True when no live keys are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let data = self.data.read();
        Ok(data
            .get(key)
            .filter(|v| !v.is_expired())
            .map(|v| v.data.clone()))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let data = self.data.read();
        Ok(data.get(key).is_some_and(|v| !v.is_expired()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let stored = StoredValue {
            data: value,
            expires_at: ttl.map(|d| Instant::now() + d),
        };
        self.data.write().insert(key.to_string(), stored);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let data = self.data.read();
        Ok(data
            .iter()
            .filter(|(k, v)| k.starts_with(prefix) && !v.is_expired())
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let data = self.data.read();
        match data.get(key).filter(|v| !v.is_expired()) {
            Some(value) => Ok(value
                .expires_at
                .map(|at| at.saturating_duration_since(Instant::now()))),
            None => Err(DatastoreError::NotFound(key.to_string())),
        }
    }

    async fn apply_batch(&self, ops: Vec<BatchOp>) -> Result<()> {
        // One lock for the whole group, mirroring the remote pipeline's
        // single grouped request.
        let mut data = self.data.write();
        for op in ops {
            match op {
                BatchOp::Set { key, value } => {
                    data.insert(
                        key,
                        StoredValue {
                            data: value,
                            expires_at: None,
                        },
                    );
                }
                BatchOp::Del { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let backend = MemoryBackend::new();
        backend.set("/k", b"value".to_vec(), None).await.unwrap();
        assert_eq!(backend.get("/k").await.unwrap(), Some(b"value".to_vec()));
        assert_eq!(backend.get("/missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_key_is_invisible() {
        let backend = MemoryBackend::new();
        backend
            .set("/gone", b"x".to_vec(), Some(Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(backend.get("/gone").await.unwrap(), None);
        assert!(!backend.exists("/gone").await.unwrap());
        assert!(backend.keys("/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ttl_contract() {
        let backend = MemoryBackend::new();
        backend.set("/forever", b"x".to_vec(), None).await.unwrap();
        backend
            .set("/short", b"x".to_vec(), Some(Duration::from_secs(3600)))
            .await
            .unwrap();

        assert_eq!(backend.ttl("/forever").await.unwrap(), None);
        let remaining = backend.ttl("/short").await.unwrap().unwrap();
        assert!(remaining <= Duration::from_secs(3600));
        assert!(backend.ttl("/missing").await.is_err());
    }

    #[tokio::test]
    async fn test_apply_batch_groups_writes() {
        let backend = MemoryBackend::new();
        backend.set("/old", b"x".to_vec(), None).await.unwrap();

        backend
            .apply_batch(vec![
                BatchOp::Set {
                    key: "/new".to_string(),
                    value: b"y".to_vec(),
                },
                BatchOp::Del {
                    key: "/old".to_string(),
                },
            ])
            .await
            .unwrap();

        assert_eq!(backend.get("/new").await.unwrap(), Some(b"y".to_vec()));
        assert_eq!(backend.get("/old").await.unwrap(), None);
    }
}
