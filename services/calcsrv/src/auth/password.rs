//! bcrypt password hashes
//!
//! Stored in the standard `$2b$<cost>$<salt+hash>` form. The cost travels
//! with the hash, so changing the configured cost does not invalidate
//! existing accounts.

use crate::error::{CalcsrvError, Result};

/// Cost for new hashes when none is configured
pub const DEFAULT_COST: u32 = 10;

/// Lowest cost bcrypt accepts (mirrors the crate's private bound)
pub const MIN_COST: u32 = 4;

/// Highest cost bcrypt accepts (mirrors the crate's private bound)
pub const MAX_COST: u32 = 31;

/// Hash `password` with a fresh random salt
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost)
        .map_err(|e| CalcsrvError::internal(format!("Password hashing failed: {}", e)))
}

/// Check `password` against a stored hash
///
/// `Ok(false)` on mismatch; `Err(MalformedHash)` when `stored` is not a
/// bcrypt hash.
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    bcrypt::verify(password, stored).map_err(|_| CalcsrvError::MalformedHash)
}
