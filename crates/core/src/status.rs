//! Status vocabulary for provisioning outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome label carried by a [`crate::StatusRecord`].
///
/// The known variants form a closed set, but external consumers treat the
/// serialized label as an opaque string, so parsing never fails: anything
/// outside the known set lands in [`ProvisionStatus::Other`]. Serialization
/// is the exact label the enqueuing peer and pollers already expect
/// (`"created db"`, `"failed on user"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisionStatus {
    /// Written by the enqueuing peer when the request enters the queue.
    #[serde(rename = "waiting")]
    Waiting,
    /// Login role created (or re-altered) successfully.
    #[serde(rename = "created user")]
    CreatedUser,
    /// Database created (or re-altered) and granted successfully.
    #[serde(rename = "created db")]
    CreatedDb,
    /// Create requested but the database or role was already present.
    #[serde(rename = "already exists")]
    AlreadyExists,
    /// Database dropped (or drop skipped because it was absent).
    #[serde(rename = "destroyed db")]
    DestroyedDb,
    /// Role dropped (or drop skipped).
    #[serde(rename = "destroyed user")]
    DestroyedUser,
    /// A database-side operation failed; details in the record's `error`.
    #[serde(rename = "failed on db")]
    FailedOnDb,
    /// A role-side operation failed; details in the record's `error`.
    #[serde(rename = "failed on user")]
    FailedOnUser,
    /// Any label outside the known set.
    #[serde(untagged)]
    Other(String),
}

impl ProvisionStatus {
    /// The wire label for this status.
    pub fn as_str(&self) -> &str {
        match self {
            ProvisionStatus::Waiting => "waiting",
            ProvisionStatus::CreatedUser => "created user",
            ProvisionStatus::CreatedDb => "created db",
            ProvisionStatus::AlreadyExists => "already exists",
            ProvisionStatus::DestroyedDb => "destroyed db",
            ProvisionStatus::DestroyedUser => "destroyed user",
            ProvisionStatus::FailedOnDb => "failed on db",
            ProvisionStatus::FailedOnUser => "failed on user",
            ProvisionStatus::Other(label) => label,
        }
    }

    /// True for the `failed on *` labels.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ProvisionStatus::FailedOnDb | ProvisionStatus::FailedOnUser
        )
    }
}

impl fmt::Display for ProvisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_round_trip() {
        let labels = [
            (ProvisionStatus::Waiting, "waiting"),
            (ProvisionStatus::CreatedUser, "created user"),
            (ProvisionStatus::CreatedDb, "created db"),
            (ProvisionStatus::AlreadyExists, "already exists"),
            (ProvisionStatus::DestroyedDb, "destroyed db"),
            (ProvisionStatus::DestroyedUser, "destroyed user"),
            (ProvisionStatus::FailedOnDb, "failed on db"),
            (ProvisionStatus::FailedOnUser, "failed on user"),
        ];

        for (status, label) in labels {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{label}\""));
            let parsed: ProvisionStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn unknown_label_parses_as_other() {
        let parsed: ProvisionStatus = serde_json::from_str("\"quarantined\"").unwrap();
        assert_eq!(parsed, ProvisionStatus::Other("quarantined".to_string()));
        assert_eq!(parsed.as_str(), "quarantined");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: any label survives a parse/serialize cycle unchanged.
            #[test]
            fn arbitrary_labels_are_opaque(label in "[a-z ]{1,30}") {
                let json = format!("\"{label}\"");
                let parsed: ProvisionStatus = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(parsed.as_str(), label.as_str());
                prop_assert_eq!(serde_json::to_string(&parsed).unwrap(), json);
            }
        }
    }
}
