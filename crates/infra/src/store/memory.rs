//! In-memory queue and status storage for tests/dev.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use provisiond_core::{ProvisioningRequest, StatusRecord};

use super::{QueueStore, StatusStore, StoreError};

/// In-memory stand-in for the Redis store.
///
/// Records the length of every queue write-back so tests can assert the
/// per-pop persistence behavior.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    queue: Mutex<Vec<ProvisioningRequest>>,
    statuses: Mutex<HashMap<String, StatusRecord>>,
    queue_writebacks: Mutex<Vec<usize>>,
    fail_queue_fetches: AtomicBool,
    fail_status_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the stored queue snapshot.
    pub fn seed_queue(&self, requests: Vec<ProvisioningRequest>) {
        *self.queue.lock().unwrap() = requests;
    }

    /// Lengths of every queue snapshot persisted so far, oldest first.
    pub fn queue_writebacks(&self) -> Vec<usize> {
        self.queue_writebacks.lock().unwrap().clone()
    }

    /// Latest record for an app, bypassing the trait.
    pub fn status_of(&self, app: &str) -> Option<StatusRecord> {
        self.statuses.lock().unwrap().get(app).cloned()
    }

    /// Make every subsequent `fetch_queue` fail, as a connection drop or an
    /// unreadable snapshot would.
    pub fn fail_queue_fetches(&self) {
        self.fail_queue_fetches.store(true, Ordering::SeqCst);
    }

    /// Make every subsequent `put_status` fail.
    pub fn fail_status_writes(&self) {
        self.fail_status_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl QueueStore for InMemoryStore {
    async fn fetch_queue(&self) -> Result<Vec<ProvisioningRequest>, StoreError> {
        if self.fail_queue_fetches.load(Ordering::SeqCst) {
            return Err(StoreError::Serialization(
                "queue snapshot is not valid JSON".to_string(),
            ));
        }
        Ok(self.queue.lock().unwrap().clone())
    }

    async fn store_queue(&self, queue: &[ProvisioningRequest]) -> Result<(), StoreError> {
        *self.queue.lock().unwrap() = queue.to_vec();
        self.queue_writebacks.lock().unwrap().push(queue.len());
        Ok(())
    }
}

#[async_trait]
impl StatusStore for InMemoryStore {
    async fn get_status(&self, app: &str) -> Result<Option<StatusRecord>, StoreError> {
        Ok(self.statuses.lock().unwrap().get(app).cloned())
    }

    async fn put_status(&self, app: &str, record: &StatusRecord) -> Result<(), StoreError> {
        if self.fail_status_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Command("status store unavailable".to_string()));
        }
        self.statuses
            .lock()
            .unwrap()
            .insert(app.to_string(), record.clone());
        Ok(())
    }
}
