//! In-memory server fake for tests/dev.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{DatabaseServer, ServerError};

/// Operation kinds the fake can be armed to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerOp {
    EnsureRole,
    EnsureDatabase,
    DropDatabase,
    DropRole,
}

#[derive(Debug, Default)]
struct State {
    /// role name -> currently applied password
    roles: HashMap<String, String>,
    /// database name -> granted role
    databases: HashMap<String, String>,
    failures: HashMap<ServerOp, String>,
    mutations: u32,
}

/// In-memory stand-in for the Postgres server.
///
/// Tracks which roles and databases exist, the password most recently
/// applied to each role, and a mutation counter so tests can assert that a
/// no-op path really issued no DDL.
#[derive(Debug, Default)]
pub struct InMemoryDatabaseServer {
    state: Mutex<State>,
}

impl InMemoryDatabaseServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-create a role, as if a previous run provisioned it.
    pub fn seed_role(&self, username: &str, password: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .roles
            .insert(username.to_string(), password.to_string());
    }

    /// Pre-create a database.
    pub fn seed_database(&self, database: &str, owner: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .databases
            .insert(database.to_string(), owner.to_string());
    }

    /// Make one operation kind fail with the given message.
    pub fn fail_on(&self, op: ServerOp, message: &str) {
        let mut state = self.state.lock().unwrap();
        state.failures.insert(op, message.to_string());
    }

    pub fn has_role(&self, username: &str) -> bool {
        self.state.lock().unwrap().roles.contains_key(username)
    }

    pub fn has_database(&self, database: &str) -> bool {
        self.state.lock().unwrap().databases.contains_key(database)
    }

    /// Password most recently applied to a role.
    pub fn role_password(&self, username: &str) -> Option<String> {
        self.state.lock().unwrap().roles.get(username).cloned()
    }

    /// How many mutating statements have run.
    pub fn mutation_count(&self) -> u32 {
        self.state.lock().unwrap().mutations
    }

    fn check_failure(state: &State, op: ServerOp) -> Result<(), ServerError> {
        match state.failures.get(&op) {
            Some(message) => Err(ServerError::Sql(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DatabaseServer for InMemoryDatabaseServer {
    async fn role_exists(&self, username: &str) -> Result<bool, ServerError> {
        Ok(self.has_role(username))
    }

    async fn database_exists(&self, database: &str) -> Result<bool, ServerError> {
        Ok(self.has_database(database))
    }

    async fn ensure_role(&self, username: &str, password: &str) -> Result<(), ServerError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state, ServerOp::EnsureRole)?;
        state
            .roles
            .insert(username.to_string(), password.to_string());
        state.mutations += 1;
        Ok(())
    }

    async fn ensure_database(&self, database: &str, username: &str) -> Result<(), ServerError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state, ServerOp::EnsureDatabase)?;
        state
            .databases
            .insert(database.to_string(), username.to_string());
        state.mutations += 1;
        Ok(())
    }

    async fn drop_database(&self, database: &str) -> Result<(), ServerError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state, ServerOp::DropDatabase)?;
        state.databases.remove(database);
        state.mutations += 1;
        Ok(())
    }

    async fn drop_role(&self, username: &str) -> Result<(), ServerError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state, ServerOp::DropRole)?;
        state.roles.remove(username);
        state.mutations += 1;
        Ok(())
    }
}
