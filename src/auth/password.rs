use bcrypt::{hash, verify};
use thiserror::Error;

/// bcrypt only consumes the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),
    /// The stored hash string is not a structurally valid bcrypt hash.
    #[error("Malformed password hash: {0}")]
    HashFormat(String),
}

/// Salted bcrypt hashing with a fixed work factor.
///
/// The cost is chosen once at startup and never changes for the lifetime of
/// the hasher. Hash strings are self-describing (`$2b$<cost>$<salt+digest>`),
/// so verification needs nothing but the stored string.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        hash(truncate(password), self.cost).map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// Returns `Ok(false)` on a mismatch and `Err(HashFormat)` when the stored
    /// hash cannot be parsed. Callers treat both as "not verified".
    pub fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, PasswordError> {
        verify(truncate(password), hashed_password)
            .map_err(|e| PasswordError::HashFormat(e.to_string()))
    }
}

/// Cuts the UTF-8 encoding at 72 bytes. Applied on both the hash and verify
/// paths; the cut may fall inside a multi-byte character, which is fine since
/// bcrypt works on raw bytes.
fn truncate(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    &bytes[..bytes.len().min(MAX_PASSWORD_BYTES)]
}
