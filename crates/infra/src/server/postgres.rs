//! Postgres-backed server operations via sqlx.
//!
//! DDL statements cannot take bound parameters, so database and role names
//! are quoted as identifiers and interpolated. The statements match what
//! pollers and operators already expect to see in server logs:
//! `CREATE|ALTER DATABASE <db> TEMPLATE template0`,
//! `GRANT ALL ON DATABASE <db> TO <user>`,
//! `CREATE|ALTER ROLE <user> WITH PASSWORD '<derived>' LOGIN`,
//! `DROP DATABASE <db>`, `DROP ROLE <user>`.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::debug;

use super::{DatabaseServer, ServerError};

/// Server operations on a sqlx connection pool.
///
/// The pool is opened once per worker lifetime against a maintenance
/// database (conventionally `template1`) with a role allowed to create
/// databases and roles.
#[derive(Debug, Clone)]
pub struct PgDatabaseServer {
    pool: PgPool,
}

impl PgDatabaseServer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the server's maintenance database.
    pub async fn connect(pg_url: &str) -> Result<Self, ServerError> {
        let pool = PgPool::connect(pg_url)
            .await
            .map_err(|e| ServerError::Connection(e.to_string()))?;
        Ok(Self::new(pool))
    }

    async fn execute(&self, sql: &str) -> Result<(), ServerError> {
        debug!(statement = sql, "executing");
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(|e| ServerError::Sql(e.to_string()))?;
        Ok(())
    }
}

/// Quote a name for use as a SQL identifier.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string for use as a SQL literal.
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[async_trait]
impl DatabaseServer for PgDatabaseServer {
    async fn role_exists(&self, username: &str) -> Result<bool, ServerError> {
        let rows = sqlx::query("SELECT usename FROM pg_catalog.pg_user")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServerError::Sql(e.to_string()))?;

        Ok(rows
            .iter()
            .any(|row| row.get::<String, _>("usename") == username))
    }

    async fn database_exists(&self, database: &str) -> Result<bool, ServerError> {
        let rows = sqlx::query("SELECT datname FROM pg_database")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServerError::Sql(e.to_string()))?;

        Ok(rows
            .iter()
            .any(|row| row.get::<String, _>("datname") == database))
    }

    async fn ensure_role(&self, username: &str, password: &str) -> Result<(), ServerError> {
        let verb = if self.role_exists(username).await? {
            "ALTER"
        } else {
            "CREATE"
        };
        self.execute(&format!(
            "{verb} ROLE {} WITH PASSWORD {} LOGIN",
            quote_ident(username),
            quote_literal(password),
        ))
        .await
    }

    async fn ensure_database(&self, database: &str, username: &str) -> Result<(), ServerError> {
        let verb = if self.database_exists(database).await? {
            "ALTER"
        } else {
            "CREATE"
        };
        self.execute(&format!(
            "{verb} DATABASE {} TEMPLATE template0",
            quote_ident(database),
        ))
        .await?;
        self.execute(&format!(
            "GRANT ALL ON DATABASE {} TO {}",
            quote_ident(database),
            quote_ident(username),
        ))
        .await
    }

    async fn drop_database(&self, database: &str) -> Result<(), ServerError> {
        self.execute(&format!("DROP DATABASE {}", quote_ident(database)))
            .await
    }

    async fn drop_role(&self, username: &str) -> Result<(), ServerError> {
        self.execute(&format!("DROP ROLE {}", quote_ident(username)))
            .await
    }
}
