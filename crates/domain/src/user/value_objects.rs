//! Value objects for the user domain.
//!
//! Field-level format rules are enforced where commands enter the system;
//! these types only carry already-accepted values.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

/// Login name, unique across users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Email address, unique across users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A clear-text password as supplied by the caller.
///
/// Never serialized and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Hashes the password for storage and comparison.
    pub fn hash(&self) -> PasswordSha512 {
        PasswordSha512(hex::encode(Sha512::digest(self.0.as_bytes())))
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Lower-case hex SHA-512 digest of a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordSha512(String);

impl PasswordSha512 {
    /// Returns true if `password` hashes to this digest.
    pub fn matches(&self, password: &Password) -> bool {
        *self == password.hash()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Random token sent to a user to prove ownership of the email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityToken(String);

impl SecurityToken {
    const BYTES: usize = 20;

    /// Generates a fresh random token.
    pub fn generate() -> Self {
        let mut bytes = [0u8; Self::BYTES];
        rand::thread_rng().fill(&mut bytes[..]);
        Self(hex::encode(bytes))
    }

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SecurityToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_sha512_hex() {
        let hash = Password::new("12345678").hash();
        assert_eq!(hash.as_str().len(), 128);
        assert!(hash.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, Password::new("12345678").hash());
    }

    #[test]
    fn password_hash_matches_only_same_password() {
        let hash = Password::new("abc123def").hash();
        assert!(hash.matches(&Password::new("abc123def")));
        assert!(!hash.matches(&Password::new("abc123deF")));
    }

    #[test]
    fn password_debug_is_redacted() {
        let debug = format!("{:?}", Password::new("secret"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn generated_tokens_differ() {
        let a = SecurityToken::generate();
        let b = SecurityToken::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 40);
    }
}
