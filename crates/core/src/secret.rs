//! Derived login credentials.

use sha1::{Digest, Sha1};

/// Derive the effective login password for a role.
///
/// The password is the hex digest of `"{shared_secret}-{token}"`. The
/// enqueuing peer performs the same derivation from the same shared secret,
/// so both sides agree on the credential without it ever crossing the queue
/// or landing in a status record. SHA-1 is retained for compatibility with
/// that peer.
pub fn derive_password(shared_secret: &str, token: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(shared_secret.as_bytes());
    hasher.update(b"-");
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
