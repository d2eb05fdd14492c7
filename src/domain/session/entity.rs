//! Session entity and signed-out semantics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::account::AccountId;

/// Session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a recorded logout timestamp is interpreted during authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SignedOutCheck {
    /// Any recorded logout terminates the session
    #[default]
    Presence,
    /// Legacy admin-path comparison: terminated only once the logout timestamp
    /// lies strictly before now, so a future-dated logout still authorizes
    LogoutElapsed,
}

impl SignedOutCheck {
    pub fn is_signed_out(&self, logged_out_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match (self, logged_out_at) {
            (_, None) => false,
            (Self::Presence, Some(_)) => true,
            (Self::LogoutElapsed, Some(at)) => at < now,
        }
    }
}

/// One sign-in; retained after logout for history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    account_id: AccountId,
    /// Bearer token - never exposed in serialization
    #[serde(skip_serializing)]
    token: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    logged_out_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(
        id: SessionId,
        account_id: AccountId,
        token: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account_id,
            token: token.into(),
            issued_at,
            expires_at,
            logged_out_at: None,
        }
    }

    /// Restore a persisted logout timestamp
    pub fn with_logged_out_at(mut self, logged_out_at: Option<DateTime<Utc>>) -> Self {
        self.logged_out_at = logged_out_at;
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn logged_out_at(&self) -> Option<DateTime<Utc>> {
        self.logged_out_at
    }

    /// Stamp the logout time. A second call overwrites the earlier stamp.
    pub fn sign_out(&mut self, at: DateTime<Utc>) {
        self.logged_out_at = Some(at);
    }

    pub fn is_signed_out(&self, check: SignedOutCheck, now: DateTime<Utc>) -> bool {
        check.is_signed_out(self.logged_out_at, now)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
