//! Idempotent create/destroy state machine for a database + role pair.

use tracing::{error, info};

use provisiond_core::{
    ErrorDetail, ProvisionAction, ProvisionStatus, ProvisioningRequest, StatusRecord,
    derive_password, timestamp_now,
};

use crate::server::{DatabaseServer, ServerError};
use crate::store::{StatusStore, StoreError};

/// Executes one provisioning request against the relational server and
/// reports every transition through the status store.
///
/// Server failures never propagate: each one is absorbed into a
/// `failed on db` / `failed on user` record with the error detail attached,
/// and the engine moves on. It never retries and never re-enqueues. Status
/// store failures do propagate, since without the status store the outcome
/// of an operation would be unobservable.
pub struct ProvisioningEngine<S, T> {
    server: S,
    status: T,
    shared_secret: String,
}

impl<S, T> ProvisioningEngine<S, T>
where
    S: DatabaseServer,
    T: StatusStore,
{
    pub fn new(server: S, status: T, shared_secret: impl Into<String>) -> Self {
        Self {
            server,
            status,
            shared_secret: shared_secret.into(),
        }
    }

    /// Run the state machine for one request.
    pub async fn process(&self, request: &ProvisioningRequest) -> Result<(), StoreError> {
        match request.action {
            ProvisionAction::Create => self.create(request).await,
            ProvisionAction::Destroy => self.destroy(request).await,
            // The consumer filters unknown actions before dispatch.
            ProvisionAction::Other(_) => Ok(()),
        }
    }

    /// Create path: role first, then database, guarded by a prior-existence
    /// check on either.
    async fn create(&self, request: &ProvisioningRequest) -> Result<(), StoreError> {
        let db_present = match self.server.database_exists(&request.database).await {
            Ok(present) => present,
            Err(e) => return self.record_failure(request, ProvisionStatus::FailedOnDb, &e).await,
        };
        let role_present = match self.server.role_exists(&request.username).await {
            Ok(present) => present,
            Err(e) => {
                return self
                    .record_failure(request, ProvisionStatus::FailedOnUser, &e)
                    .await;
            }
        };

        if db_present || role_present {
            error!(
                app = %request.app,
                database = %request.database,
                "database or role already exists"
            );
            return self
                .set_status(request, ProvisionStatus::AlreadyExists, None)
                .await;
        }

        // A role failure does not short-circuit the database step; each step
        // reports its own outcome, matching the two sequential status writes.
        self.create_user(request).await?;
        self.create_db(request).await
    }

    async fn create_user(&self, request: &ProvisioningRequest) -> Result<(), StoreError> {
        let password = derive_password(&self.shared_secret, &request.token);
        match self.server.ensure_role(&request.username, &password).await {
            Ok(()) => {
                info!(app = %request.app, username = %request.username, "user created");
                self.set_status(request, ProvisionStatus::CreatedUser, None)
                    .await
            }
            Err(e) => {
                self.record_failure(request, ProvisionStatus::FailedOnUser, &e)
                    .await
            }
        }
    }

    async fn create_db(&self, request: &ProvisioningRequest) -> Result<(), StoreError> {
        match self
            .server
            .ensure_database(&request.database, &request.username)
            .await
        {
            Ok(()) => {
                info!(app = %request.app, database = %request.database, "database created");
                self.set_status(request, ProvisionStatus::CreatedDb, None)
                    .await
            }
            Err(e) => {
                self.record_failure(request, ProvisionStatus::FailedOnDb, &e)
                    .await
            }
        }
    }

    /// Destroy path. Both drops are gated on database existence only,
    /// observed once before the first drop; role existence is never checked.
    /// An absent database makes the whole destroy a no-op that still writes
    /// its status transitions.
    async fn destroy(&self, request: &ProvisioningRequest) -> Result<(), StoreError> {
        let db_present = match self.server.database_exists(&request.database).await {
            Ok(present) => present,
            Err(e) => return self.record_failure(request, ProvisionStatus::FailedOnDb, &e).await,
        };

        if db_present {
            match self.server.drop_database(&request.database).await {
                Ok(()) => {
                    self.set_status(request, ProvisionStatus::DestroyedDb, None)
                        .await?;
                }
                Err(e) => {
                    self.record_failure(request, ProvisionStatus::FailedOnDb, &e)
                        .await?;
                }
            }
        } else {
            self.set_status(request, ProvisionStatus::DestroyedDb, None)
                .await?;
        }

        if db_present {
            match self.server.drop_role(&request.username).await {
                Ok(()) => {
                    self.set_status(request, ProvisionStatus::DestroyedUser, None)
                        .await?;
                }
                Err(e) => {
                    self.record_failure(request, ProvisionStatus::FailedOnUser, &e)
                        .await?;
                }
            }
        } else {
            self.set_status(request, ProvisionStatus::DestroyedUser, None)
                .await?;
        }

        info!(
            app = %request.app,
            database = %request.database,
            "database and user destroyed"
        );
        Ok(())
    }

    async fn record_failure(
        &self,
        request: &ProvisioningRequest,
        status: ProvisionStatus,
        error: &ServerError,
    ) -> Result<(), StoreError> {
        error!(
            app = %request.app,
            database = %request.database,
            status = %status,
            error = %error,
            "server operation failed"
        );
        let detail = ErrorDetail {
            message: error.to_string(),
            backtrace: format!("{error:?}"),
        };
        self.set_status(request, status, Some(detail)).await
    }

    /// Status tracker: read the prior record solely to recover `started_at`,
    /// then overwrite the record for this app.
    async fn set_status(
        &self,
        request: &ProvisioningRequest,
        status: ProvisionStatus,
        error: Option<ErrorDetail>,
    ) -> Result<(), StoreError> {
        let prior = self.status.get_status(&request.app).await?;
        let now = timestamp_now();
        let started_at = match prior {
            Some(record) => record.started_at,
            None => now.clone(),
        };

        let record = StatusRecord {
            database: request.database.clone(),
            username: request.username.clone(),
            passwd_string: request.token.clone(),
            status,
            started_at,
            finished_at: now,
            error,
        };
        self.status.put_status(&request.app, &record).await
    }
}
