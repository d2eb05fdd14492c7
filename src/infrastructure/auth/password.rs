//! Salted password hashing using Argon2

use std::fmt::Debug;

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::domain::DomainError;

const SALT_LENGTH: usize = 32;
const HASH_LENGTH: usize = 32;

/// Salt and hash pair produced by [`PasswordHasher::hash`]
#[derive(Clone, PartialEq, Eq)]
pub struct SaltedHash {
    pub salt: String,
    pub hash: String,
}

impl Debug for SaltedHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaltedHash")
            .field("salt", &"[hidden]")
            .field("hash", &"[hidden]")
            .finish()
    }
}

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password.
    ///
    /// Without a salt a fresh random one is generated. With a salt (the
    /// verification path) the same salt is returned next to the hash.
    fn hash(&self, password: &str, salt: Option<&str>) -> Result<SaltedHash, DomainError>;

    /// Re-hash with the stored salt and compare against the stored hash
    fn verify(&self, password: &str, salt: &str, expected: &str) -> Result<bool, DomainError> {
        let attempt = self.hash(password, Some(salt))?;
        Ok(hashes_match(&attempt.hash, expected))
    }
}

/// Argon2id hasher with an explicit, separately stored salt
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Create a new Argon2 hasher with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hasher with explicit memory (KiB) and iteration costs
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, DomainError> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| DomainError::configuration(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self { params })
    }

    fn generate_salt() -> String {
        let mut bytes = [0u8; SALT_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        STANDARD.encode(bytes)
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str, salt: Option<&str>) -> Result<SaltedHash, DomainError> {
        let salt = match salt {
            Some(s) => s.to_string(),
            None => Self::generate_salt(),
        };

        let mut output = [0u8; HASH_LENGTH];
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
            .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut output)
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))?;

        Ok(SaltedHash {
            salt,
            hash: hex::encode(output),
        })
    }
}

/// Compare two hashes without short-circuiting on the first differing byte
pub fn hashes_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());

    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
