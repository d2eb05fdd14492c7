//! Authentication infrastructure module
//!
//! Password hashing, credential decoding, signed session tokens, the session
//! manager and the admin gate.

mod admin;
mod credentials;
mod password;
mod service;
mod token;

pub use admin::{AdminGate, TokenValidator};
pub use credentials::BasicCredentials;
pub use password::{Argon2Hasher, PasswordHasher, SaltedHash, hashes_match};
pub use service::{AuthSessionManager, DEFAULT_SESSION_TTL_HOURS, SessionPolicy, SignUpRequest};
pub use token::{JwtTokenIssuer, SessionClaims, SessionTokenIssuer};
