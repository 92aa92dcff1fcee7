//! Relational server operations.
//!
//! The trait covers exactly what the engine needs: full-list existence
//! checks and the create/alter/grant/drop statements for one database + role
//! pair. Idempotency lives behind `ensure_*`: an already-present role or
//! database is re-altered rather than failed.

use std::sync::Arc;

use async_trait::async_trait;

mod memory;
mod postgres;

pub use memory::{InMemoryDatabaseServer, ServerOp};
pub use postgres::PgDatabaseServer;

/// Relational-server failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServerError {
    #[error("database server connection error: {0}")]
    Connection(String),

    #[error("database server error: {0}")]
    Sql(String),
}

/// Operations the provisioning engine performs against the server.
#[async_trait]
pub trait DatabaseServer: Send + Sync {
    /// Whether a login role with this name exists.
    ///
    /// Scans the full login list and tests membership by name, like the
    /// database-existence check. O(total logins) and fine at this scale.
    async fn role_exists(&self, username: &str) -> Result<bool, ServerError>;

    /// Whether a database with this name exists.
    async fn database_exists(&self, database: &str) -> Result<bool, ServerError>;

    /// Create the role with LOGIN and the given password, or re-alter the
    /// password if the role already exists.
    async fn ensure_role(&self, username: &str, password: &str) -> Result<(), ServerError>;

    /// Create the database from `template0` (or re-alter it if present) and
    /// grant the role all privileges on it.
    async fn ensure_database(&self, database: &str, username: &str) -> Result<(), ServerError>;

    /// Drop the database.
    async fn drop_database(&self, database: &str) -> Result<(), ServerError>;

    /// Drop the role.
    async fn drop_role(&self, username: &str) -> Result<(), ServerError>;
}

#[async_trait]
impl<S> DatabaseServer for Arc<S>
where
    S: DatabaseServer + ?Sized,
{
    async fn role_exists(&self, username: &str) -> Result<bool, ServerError> {
        (**self).role_exists(username).await
    }

    async fn database_exists(&self, database: &str) -> Result<bool, ServerError> {
        (**self).database_exists(database).await
    }

    async fn ensure_role(&self, username: &str, password: &str) -> Result<(), ServerError> {
        (**self).ensure_role(username, password).await
    }

    async fn ensure_database(&self, database: &str, username: &str) -> Result<(), ServerError> {
        (**self).ensure_database(database, username).await
    }

    async fn drop_database(&self, database: &str) -> Result<(), ServerError> {
        (**self).drop_database(database).await
    }

    async fn drop_role(&self, username: &str) -> Result<(), ServerError> {
        (**self).drop_role(username).await
    }
}
