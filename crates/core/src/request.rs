//! Queue-resident provisioning request.

use serde::{Deserialize, Serialize};

/// Requested operation for a database + role pair.
///
/// Unknown labels are preserved rather than rejected so that a queue entry
/// written by a newer peer never poisons the drain loop; the consumer logs
/// and skips them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionAction {
    /// Create the database and login role.
    Create,
    /// Drop the database and login role.
    Destroy,
    /// Any other label found on the wire.
    #[serde(untagged)]
    Other(String),
}

/// One provisioning request, consumed destructively from the shared queue.
///
/// `app` is the tenant application identifier and the primary key into the
/// status store; the queue itself is not an audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningRequest {
    /// Target database name, unique within the server.
    pub database: String,
    /// Target login role name.
    pub username: String,
    /// Origin host of the requester. Audit-only, never acted on.
    pub hostip: String,
    /// Caller-supplied secret fragment used in password derivation.
    pub token: String,
    /// Operation to perform.
    pub action: ProvisionAction,
    /// Tenant application identifier.
    pub app: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_wire_format() {
        let json = r#"{
            "database": "acme_db",
            "username": "acme_user",
            "hostip": "10.0.0.7",
            "token": "tok1",
            "action": "create",
            "app": "acme"
        }"#;

        let request: ProvisioningRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.database, "acme_db");
        assert_eq!(request.action, ProvisionAction::Create);
        assert_eq!(request.app, "acme");
    }

    #[test]
    fn unknown_action_is_preserved() {
        let json = r#"{
            "database": "d",
            "username": "u",
            "hostip": "h",
            "token": "t",
            "action": "migrate",
            "app": "a"
        }"#;

        let request: ProvisioningRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.action, ProvisionAction::Other("migrate".to_string()));
    }

    #[test]
    fn action_serializes_to_lowercase_labels() {
        assert_eq!(
            serde_json::to_string(&ProvisionAction::Create).unwrap(),
            r#""create""#
        );
        assert_eq!(
            serde_json::to_string(&ProvisionAction::Destroy).unwrap(),
            r#""destroy""#
        );
    }
}
