//! Signed session tokens (HS256 JWT with a server-held secret)

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, DomainError, SessionId};

/// Claims embedded in a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (account ID)
    pub sub: String,
    /// Session ID, keeps tokens unique across sign-ins in the same second
    pub sid: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(
        account_id: &AccountId,
        session_id: &SessionId,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: account_id.to_string(),
            sid: session_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.sub
    }
}

/// Trait for session token operations
pub trait SessionTokenIssuer: Send + Sync + Debug {
    /// Sign a token for a new session
    fn issue(&self, claims: &SessionClaims) -> Result<String, DomainError>;

    /// Check the token signature and return its claims.
    ///
    /// Expiry is not checked here; the session record is authoritative.
    fn verify(&self, token: &str) -> Result<SessionClaims, DomainError>;
}

/// HMAC-SHA256 JWT issuer
#[derive(Clone)]
pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for JwtTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenIssuer")
            .field("algorithm", &Algorithm::HS256)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtTokenIssuer {
    /// Create an issuer signing with the given secret
    pub fn new(secret: &str) -> Result<Self, DomainError> {
        if secret.is_empty() {
            return Err(DomainError::configuration("Token secret cannot be empty"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

impl SessionTokenIssuer for JwtTokenIssuer {
    fn issue(&self, claims: &SessionClaims) -> Result<String, DomainError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign session token: {}", e)))
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, DomainError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| DomainError::invalid_id(format!("Invalid session token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_claims(issued_at: DateTime<Utc>) -> SessionClaims {
        SessionClaims::new(
            &AccountId::generate(),
            &SessionId::generate(),
            issued_at,
            issued_at + Duration::hours(8),
        )
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = JwtTokenIssuer::new("test-secret").unwrap();
        let claims = create_claims(Utc::now());

        let token = issuer.issue(&claims).unwrap();
        let verified = issuer.verify(&token).unwrap();

        assert_eq!(verified, claims);
        assert_eq!(verified.exp - verified.iat, 8 * 3600);
    }

    #[test]
    fn test_expired_token_still_verifies_signature() {
        let issuer = JwtTokenIssuer::new("test-secret").unwrap();
        let claims = create_claims(Utc::now() - Duration::days(2));

        let token = issuer.issue(&claims).unwrap();
        assert!(issuer.verify(&token).is_ok());
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issuer = JwtTokenIssuer::new("secret-a").unwrap();
        let other = JwtTokenIssuer::new("secret-b").unwrap();

        let token = other.issue(&create_claims(Utc::now())).unwrap();
        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let issuer = JwtTokenIssuer::new("test-secret").unwrap();
        let token = issuer.issue(&create_claims(Utc::now())).unwrap();

        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let forged = SessionClaims {
            sub: AccountId::generate().to_string(),
            ..create_claims(Utc::now())
        };
        parts[1] = base64::Engine::encode(
            &base64::engine::general_purpose::URL_SAFE_NO_PAD,
            serde_json::to_vec(&forged).unwrap(),
        );

        assert!(issuer.verify(&parts.join(".")).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let issuer = JwtTokenIssuer::new("test-secret").unwrap();
        assert!(issuer.verify("not-a-token").is_err());
        assert!(issuer.verify("").is_err());
    }

    #[test]
    fn test_distinct_sessions_give_distinct_tokens() {
        let issuer = JwtTokenIssuer::new("test-secret").unwrap();
        let now = Utc::now();

        let a = issuer.issue(&create_claims(now)).unwrap();
        let b = issuer.issue(&create_claims(now)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(JwtTokenIssuer::new("").is_err());
    }

    #[test]
    fn test_debug_hides_keys() {
        let issuer = JwtTokenIssuer::new("super-secret").unwrap();
        assert!(!format!("{:?}", issuer).contains("super-secret"));
    }
}
