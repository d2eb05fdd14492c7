//! Basic credential blob decoding

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::domain::AuthError;

const BASIC_PREFIX: &str = "Basic ";

/// Username and password carried by a `Basic` credential blob
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Decode `"Basic " + base64("<username>:<password>")`.
    ///
    /// Only the first colon separates the fields, so passwords may contain colons.
    pub fn decode(blob: &str) -> Result<Self, AuthError> {
        let encoded = blob
            .strip_prefix(BASIC_PREFIX)
            .ok_or_else(|| AuthError::malformed_credentials("expected 'Basic <base64>'"))?;

        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| AuthError::malformed_credentials(format!("invalid base64: {}", e)))?;

        let decoded = String::from_utf8(bytes)
            .map_err(|_| AuthError::malformed_credentials("credentials are not valid UTF-8"))?;

        let (username, password) = decoded.split_once(':').ok_or_else(|| {
            AuthError::malformed_credentials("missing ':' between username and password")
        })?;

        Ok(Self::new(username, password))
    }

    /// Encode into the blob format accepted by [`BasicCredentials::decode`]
    pub fn encode(&self) -> String {
        format!(
            "{}{}",
            BASIC_PREFIX,
            STANDARD.encode(format!("{}:{}", self.username, self.password))
        )
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn test_decode_valid() {
        let credentials = BasicCredentials::decode(&blob("alice:pw123")).unwrap();
        assert_eq!(credentials.username(), "alice");
        assert_eq!(credentials.password(), "pw123");
    }

    #[test]
    fn test_password_with_colon_is_preserved() {
        let credentials = BasicCredentials::decode(&blob("alice:pw:with:colons")).unwrap();
        assert_eq!(credentials.username(), "alice");
        assert_eq!(credentials.password(), "pw:with:colons");
    }

    #[test]
    fn test_empty_password() {
        let credentials = BasicCredentials::decode(&blob("alice:")).unwrap();
        assert_eq!(credentials.password(), "");
    }

    #[test]
    fn test_missing_scheme() {
        let err = BasicCredentials::decode(&STANDARD.encode("alice:pw")).unwrap_err();
        assert!(matches!(err, AuthError::MalformedCredentials { .. }));

        let err =
            BasicCredentials::decode(&format!("Bearer {}", STANDARD.encode("a:b"))).unwrap_err();
        assert!(matches!(err, AuthError::MalformedCredentials { .. }));
    }

    #[test]
    fn test_invalid_base64() {
        let err = BasicCredentials::decode("Basic !!!not-base64!!!").unwrap_err();
        assert!(matches!(err, AuthError::MalformedCredentials { .. }));
    }

    #[test]
    fn test_missing_colon() {
        let err = BasicCredentials::decode(&blob("alicepw123")).unwrap_err();
        assert!(matches!(err, AuthError::MalformedCredentials { .. }));
        assert_eq!(err.code(), "ATH-004");
    }

    #[test]
    fn test_encode_matches_decode() {
        let credentials = BasicCredentials::new("alice", "pw:123");
        assert_eq!(BasicCredentials::decode(&credentials.encode()).unwrap(), credentials);
    }

    #[test]
    fn test_debug_redacts_password() {
        let credentials = BasicCredentials::new("alice", "hunter2");
        assert!(!format!("{:?}", credentials).contains("hunter2"));
    }
}
