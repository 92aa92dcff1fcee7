//! `provisiond` — tenant database provisioning worker.

mod config;

use provisiond_infra::{
    ConsumerConfig, PgDatabaseServer, ProvisioningEngine, QueueConsumer, RedisStore,
};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    provisiond_observability::init();

    let config = Config::from_env()?;

    let server = PgDatabaseServer::connect(&config.pg_url).await?;
    let store = RedisStore::connect(&config.redis_url).await?;

    let engine = ProvisioningEngine::new(server, store.clone(), config.shared_secret.clone());
    let consumer = QueueConsumer::new(
        store,
        engine,
        ConsumerConfig {
            poll_interval: config.poll_interval,
        },
    );

    tracing::info!("provisioning worker starting");
    consumer.run().await;

    Ok(())
}
