//! Common test utilities

use redis_datastore::{Datastore, KvDatastore, MemoryBackend};
use std::sync::Arc;

/// Build a datastore over a fresh in-memory backend, held as a trait
/// object the way consumers hold it
#[allow(dead_code)] // Used by other test modules
pub fn setup_memory_store() -> Box<dyn Datastore> {
    Box::new(KvDatastore::new(MemoryBackend::new()))
}

/// Build two datastore instances sharing one backend connection
#[allow(dead_code)] // Used by other test modules
pub fn setup_shared_stores() -> (Box<dyn Datastore>, Box<dyn Datastore>) {
    let backend = Arc::new(MemoryBackend::new());
    (
        Box::new(KvDatastore::from_arc(Arc::clone(&backend))),
        Box::new(KvDatastore::from_arc(backend)),
    )
}
