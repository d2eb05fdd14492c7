use thiserror::Error;

/// Errors reported by stores and other infrastructure collaborators
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    #[error("Duplicate {field}: {message}")]
    Duplicate { field: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    /// A uniqueness constraint on `field` was violated
    pub fn duplicate(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Duplicate {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// The field name if this is a uniqueness violation
    pub fn duplicate_field(&self) -> Option<&str> {
        match self {
            Self::Duplicate { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Account 'abc' not found");
        assert_eq!(error.to_string(), "Not found: Account 'abc' not found");
    }

    #[test]
    fn test_duplicate_error() {
        let error = DomainError::duplicate("username", "Username 'alice' already exists");
        assert_eq!(
            error.to_string(),
            "Duplicate username: Username 'alice' already exists"
        );
        assert_eq!(error.duplicate_field(), Some("username"));
    }

    #[test]
    fn test_duplicate_field_absent_for_other_errors() {
        assert_eq!(DomainError::storage("down").duplicate_field(), None);
    }
}
