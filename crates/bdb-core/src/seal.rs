//! Sealed-field transform
//!
//! Columns whose name contains `"pass"` (case-insensitive substring, so
//! `password_hint` and `PassCode` both match) never store their raw value.
//! The stored form is `enc_` plus the hex SHA-512 digest of the input:
//! opaque, one-way, and deterministic, so equal inputs always seal to the
//! same output. There is no unseal.

use sha2::{Digest, Sha512};

/// Marker prefix on every sealed value.
pub const SEALED_PREFIX: &str = "enc_";

/// Whether a field name designates a column that must be sealed.
pub fn field_is_sensitive(name: &str) -> bool {
    name.to_lowercase().contains("pass")
}

/// Seal a value for storage.
pub fn seal(value: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(value.as_bytes());
    format!("{}{}", SEALED_PREFIX, hex::encode(hasher.finalize()))
}
