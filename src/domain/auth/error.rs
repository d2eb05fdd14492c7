//! Authentication failure taxonomy

use thiserror::Error;

use crate::domain::DomainError;

/// Failures reported by sign-up, sign-in, sign-out and authorization checks
///
/// Each kind carries a stable machine-readable code (see [`AuthError::code`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Try any other Username, this Username has already been taken")]
    DuplicateUsername,

    #[error("This user has already been registered, try with any other emailId")]
    DuplicateEmail,

    #[error("Registration failed: {message}")]
    RegistrationFailure { message: String },

    #[error("Malformed credentials: {message}")]
    MalformedCredentials { message: String },

    #[error("This username does not exist")]
    UnknownUser,

    #[error("Password failed")]
    BadCredentials,

    #[error("Could not create session: {message}")]
    SessionPersistFailure { message: String },

    #[error("User has not signed in")]
    NotSignedIn,

    #[error("User is signed out. Sign in first")]
    SignedOut,

    #[error("Session has expired. Sign in again")]
    SessionExpired,

    #[error("Unauthorized access, entered user is not an admin")]
    Forbidden,

    #[error("User with entered uuid does not exist")]
    NotFound,

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl AuthError {
    pub fn registration_failure(message: impl Into<String>) -> Self {
        Self::RegistrationFailure {
            message: message.into(),
        }
    }

    pub fn malformed_credentials(message: impl Into<String>) -> Self {
        Self::MalformedCredentials {
            message: message.into(),
        }
    }

    pub fn session_persist_failure(message: impl Into<String>) -> Self {
        Self::SessionPersistFailure {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Stable error code reported to callers
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateUsername => "SGR-001",
            Self::DuplicateEmail => "SGR-002",
            Self::RegistrationFailure { .. } => "SGR-003",
            Self::UnknownUser => "ATH-001",
            Self::BadCredentials => "ATH-002",
            Self::SessionPersistFailure { .. } => "ATH-003",
            Self::MalformedCredentials { .. } => "ATH-004",
            Self::NotSignedIn => "ATHR-001",
            Self::SignedOut => "ATHR-002",
            Self::Forbidden => "ATHR-003",
            Self::SessionExpired => "ATHR-004",
            Self::NotFound => "USR-001",
            Self::Storage { .. } => "STR-001",
        }
    }

    /// Short label used for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateUsername => "duplicate_username",
            Self::DuplicateEmail => "duplicate_email",
            Self::RegistrationFailure { .. } => "registration_failure",
            Self::MalformedCredentials { .. } => "malformed_credentials",
            Self::UnknownUser => "unknown_user",
            Self::BadCredentials => "bad_credentials",
            Self::SessionPersistFailure { .. } => "session_persist_failure",
            Self::NotSignedIn => "not_signed_in",
            Self::SignedOut => "signed_out",
            Self::SessionExpired => "session_expired",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Storage { .. } => "storage",
        }
    }
}

impl From<DomainError> for AuthError {
    fn from(err: DomainError) -> Self {
        Self::storage(err.to_string())
    }
}
