//! Queue and status storage over the shared key-value store.
//!
//! The durable queue lives under one well-known key as a JSON array of
//! requests; status records live under one key per tenant application.
//! Both reside in the same Redis database, so [`RedisStore`] implements
//! both traits.

use std::sync::Arc;

use async_trait::async_trait;

use provisiond_core::{ProvisioningRequest, StatusRecord};

mod memory;
mod redis;

pub use memory::InMemoryStore;
pub use redis::RedisStore;

/// Well-known key holding the pending-request queue.
pub const QUEUE_KEY: &str = "queue";

/// Store-level failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store command error: {0}")]
    Command(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Access to the durable request queue.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Fetch the current queue snapshot. An absent key reads as empty.
    async fn fetch_queue(&self) -> Result<Vec<ProvisioningRequest>, StoreError>;

    /// Persist the remaining queue. Called after every pop so the stored
    /// snapshot never runs ahead of processing by more than one request.
    async fn store_queue(&self, queue: &[ProvisioningRequest]) -> Result<(), StoreError>;
}

/// Access to the per-app status records.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Latest record for an app, if any.
    async fn get_status(&self, app: &str) -> Result<Option<StatusRecord>, StoreError>;

    /// Overwrite the record for an app.
    async fn put_status(&self, app: &str, record: &StatusRecord) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> QueueStore for Arc<S>
where
    S: QueueStore + ?Sized,
{
    async fn fetch_queue(&self) -> Result<Vec<ProvisioningRequest>, StoreError> {
        (**self).fetch_queue().await
    }

    async fn store_queue(&self, queue: &[ProvisioningRequest]) -> Result<(), StoreError> {
        (**self).store_queue(queue).await
    }
}

#[async_trait]
impl<S> StatusStore for Arc<S>
where
    S: StatusStore + ?Sized,
{
    async fn get_status(&self, app: &str) -> Result<Option<StatusRecord>, StoreError> {
        (**self).get_status(app).await
    }

    async fn put_status(&self, app: &str, record: &StatusRecord) -> Result<(), StoreError> {
        (**self).put_status(app, record).await
    }
}
