//! Redis-backed queue and status storage.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use provisiond_core::{ProvisioningRequest, StatusRecord};

use super::{QUEUE_KEY, QueueStore, StatusStore, StoreError};

/// Queue + status store on a single Redis database.
///
/// The connection is multiplexed and opened once per worker lifetime; clones
/// share it.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Connect to Redis.
    ///
    /// `redis_url` carries host, port, password and database index
    /// (e.g. `redis://:pw@localhost:6379/2`).
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        conn.get(key)
            .await
            .map_err(|e| StoreError::Command(format!("GET {key} failed: {e}")))
    }

    async fn set_string(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.set(key, value)
            .await
            .map_err(|e| StoreError::Command(format!("SET {key} failed: {e}")))
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

/// Decode a stored queue snapshot. An absent value reads as empty; a value
/// that is not a valid request array surfaces as a store error for the poll
/// loop to log.
fn decode_queue(raw: Option<&str>) -> Result<Vec<ProvisioningRequest>, StoreError> {
    match raw {
        Some(raw) => serde_json::from_str(raw).map_err(|e| {
            StoreError::Serialization(format!("queue snapshot is not valid JSON: {e}"))
        }),
        None => Ok(Vec::new()),
    }
}

#[async_trait]
impl QueueStore for RedisStore {
    async fn fetch_queue(&self) -> Result<Vec<ProvisioningRequest>, StoreError> {
        decode_queue(self.get_string(QUEUE_KEY).await?.as_deref())
    }

    async fn store_queue(&self, queue: &[ProvisioningRequest]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(queue)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.set_string(QUEUE_KEY, raw).await
    }
}

#[async_trait]
impl StatusStore for RedisStore {
    async fn get_status(&self, app: &str) -> Result<Option<StatusRecord>, StoreError> {
        match self.get_string(app).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| {
                    StoreError::Serialization(format!("status record for {app} is invalid: {e}"))
                }),
            None => Ok(None),
        }
    }

    async fn put_status(&self, app: &str, record: &StatusRecord) -> Result<(), StoreError> {
        let raw = serde_json::to_string(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.set_string(app, raw).await
    }
}
