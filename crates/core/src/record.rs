//! Persisted status record, one per tenant application.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::status::ProvisionStatus;

/// Structured failure payload embedded in a [`StatusRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Human-readable failure message.
    pub message: String,
    /// Diagnostic trace for the failure.
    pub backtrace: String,
}

/// Outcome snapshot for one tenant's most recent provisioning operation.
///
/// Keyed by `app` in the status store; overwritten in place on every status
/// transition. `started_at` is set on the first write for an `app` and then
/// preserved verbatim across all later writes (the prior record is read back
/// solely to recover it), while `finished_at` refreshes on every write.
///
/// `passwd_string` holds the caller token, never the derived password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub database: String,
    pub username: String,
    pub passwd_string: String,
    pub status: ProvisionStatus,
    /// Timestamp of the first status write for this app.
    pub started_at: String,
    /// Timestamp of the most recent status write.
    pub finished_at: String,
    /// Present only when the latest transition failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

/// Current wall-clock time in the record timestamp format.
///
/// Stored records may carry timestamps written by other peers in other
/// formats; they are treated as opaque strings and preserved, never reparsed.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
