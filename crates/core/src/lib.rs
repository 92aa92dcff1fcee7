//! `provisiond-core` — domain types for tenant database provisioning.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the queue-resident request, the persisted status record, the closed status
//! vocabulary, and the derived-credential computation.

pub mod record;
pub mod request;
pub mod secret;
pub mod status;

pub use record::{timestamp_now, ErrorDetail, StatusRecord};
pub use request::{ProvisionAction, ProvisioningRequest};
pub use secret::derive_password;
pub use status::ProvisionStatus;
