//! `provisiond-infra` — store and server adapters plus the provisioning
//! engine and the queue-draining poll loop.
//!
//! The seams are traits: [`store::QueueStore`] and [`store::StatusStore`]
//! over the shared key-value store, and [`server::DatabaseServer`] over the
//! relational server. Redis and Postgres back them in production; in-memory
//! implementations back the tests.

pub mod consumer;
pub mod engine;
pub mod server;
pub mod store;

pub use consumer::{ConsumerConfig, QueueConsumer};
pub use engine::ProvisioningEngine;
pub use server::{DatabaseServer, InMemoryDatabaseServer, PgDatabaseServer, ServerError};
pub use store::{InMemoryStore, QueueStore, RedisStore, StatusStore, StoreError, QUEUE_KEY};
