//! Queue drain and the process-lifetime poll loop.

use std::time::Duration;

use tracing::{error, info, warn};

use provisiond_core::ProvisionAction;

use crate::engine::ProvisioningEngine;
use crate::server::DatabaseServer;
use crate::store::{QueueStore, StatusStore, StoreError};

/// Poll loop settings.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Sleep between poll cycles. Fixed, not adaptive to queue depth.
    pub poll_interval: Duration,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
        }
    }
}

/// Drains the shared queue and dispatches each request to the engine.
///
/// Consumption is stack-style: the most recently enqueued request is popped
/// first. Requests are processed strictly serially, and after every pop the
/// remaining queue is persisted, so a crash mid-request loses at most the
/// request currently in flight.
pub struct QueueConsumer<Q, S, T> {
    store: Q,
    engine: ProvisioningEngine<S, T>,
    config: ConsumerConfig,
}

impl<Q, S, T> QueueConsumer<Q, S, T>
where
    Q: QueueStore,
    S: DatabaseServer,
    T: StatusStore,
{
    pub fn new(store: Q, engine: ProvisioningEngine<S, T>, config: ConsumerConfig) -> Self {
        Self {
            store,
            engine,
            config,
        }
    }

    /// Run forever. There is no termination condition other than process
    /// shutdown; a failed cycle is logged and the next one starts after the
    /// usual sleep.
    pub async fn run(&self) {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            "provisioning consumer started"
        );
        loop {
            if let Err(e) = self.drain().await {
                error!(error = %e, "poll cycle failed");
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Fetch the current queue snapshot and process it to empty.
    pub async fn drain(&self) -> Result<(), StoreError> {
        let mut queue = self.store.fetch_queue().await?;

        while let Some(request) = queue.pop() {
            info!(
                app = %request.app,
                database = %request.database,
                hostip = %request.hostip,
                "request out of the queue"
            );

            match request.action {
                ProvisionAction::Create | ProvisionAction::Destroy => {
                    self.engine.process(&request).await?;
                }
                ProvisionAction::Other(ref action) => {
                    warn!(app = %request.app, action = %action, "unknown action, skipping");
                }
            }

            // Persist the remainder after every pop, not once per drain.
            self.store.store_queue(&queue).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use provisiond_core::{ProvisionStatus, ProvisioningRequest};

    use super::*;
    use crate::server::InMemoryDatabaseServer;
    use crate::store::InMemoryStore;

    fn request(app: &str, action: ProvisionAction) -> ProvisioningRequest {
        ProvisioningRequest {
            database: format!("{app}_db"),
            username: format!("{app}_user"),
            hostip: "10.0.0.7".to_string(),
            token: "tok".to_string(),
            action,
            app: app.to_string(),
        }
    }

    fn setup() -> (
        Arc<InMemoryDatabaseServer>,
        Arc<InMemoryStore>,
        QueueConsumer<Arc<InMemoryStore>, Arc<InMemoryDatabaseServer>, Arc<InMemoryStore>>,
    ) {
        let server = Arc::new(InMemoryDatabaseServer::new());
        let store = Arc::new(InMemoryStore::new());
        let engine = ProvisioningEngine::new(server.clone(), store.clone(), "s3kr3t");
        let consumer = QueueConsumer::new(store.clone(), engine, ConsumerConfig::default());
        (server, store, consumer)
    }

    #[tokio::test]
    async fn drains_the_queue_to_empty() {
        let (server, store, consumer) = setup();
        store.seed_queue(vec![
            request("alpha", ProvisionAction::Create),
            request("beta", ProvisionAction::Create),
        ]);

        consumer.drain().await.unwrap();

        assert!(store.fetch_queue().await.unwrap().is_empty());
        assert!(server.has_database("alpha_db"));
        assert!(server.has_database("beta_db"));
    }

    #[tokio::test]
    async fn consumes_last_in_first_out() {
        let (server, store, consumer) = setup();
        // Both target the same database name; LIFO means the later request
        // wins the race for the name and the earlier one finds it taken.
        let mut first = request("first", ProvisionAction::Create);
        let mut last = request("last", ProvisionAction::Create);
        first.database = "shared_db".to_string();
        last.database = "shared_db".to_string();
        store.seed_queue(vec![first, last]);

        consumer.drain().await.unwrap();

        assert!(server.has_role("last_user"));
        assert!(!server.has_role("first_user"));
        assert_eq!(
            store.status_of("last").unwrap().status,
            ProvisionStatus::CreatedDb
        );
        assert_eq!(
            store.status_of("first").unwrap().status,
            ProvisionStatus::AlreadyExists
        );
    }

    #[tokio::test]
    async fn writes_the_remainder_back_after_every_pop() {
        let (_server, store, consumer) = setup();
        store.seed_queue(vec![
            request("a", ProvisionAction::Create),
            request("b", ProvisionAction::Create),
            request("c", ProvisionAction::Create),
        ]);

        consumer.drain().await.unwrap();

        assert_eq!(store.queue_writebacks(), vec![2, 1, 0]);
    }

    #[tokio::test]
    async fn unknown_actions_are_skipped_without_a_status_write() {
        let (server, store, consumer) = setup();
        store.seed_queue(vec![request(
            "gamma",
            ProvisionAction::Other("migrate".to_string()),
        )]);

        consumer.drain().await.unwrap();

        assert!(store.fetch_queue().await.unwrap().is_empty());
        assert!(store.status_of("gamma").is_none());
        assert_eq!(server.mutation_count(), 0);
    }

    #[tokio::test]
    async fn unreadable_snapshot_surfaces_as_a_store_error() {
        let (server, store, consumer) = setup();
        store.seed_queue(vec![request("delta", ProvisionAction::Create)]);
        store.fail_queue_fetches();

        // The cycle fails cleanly; run() logs this and sleeps into the next
        // cycle rather than crashing.
        let err = consumer.drain().await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
        assert_eq!(server.mutation_count(), 0);
    }

    #[tokio::test]
    async fn empty_queue_is_a_quiet_cycle() {
        let (_server, store, consumer) = setup();

        consumer.drain().await.unwrap();

        assert!(store.queue_writebacks().is_empty());
    }
}
