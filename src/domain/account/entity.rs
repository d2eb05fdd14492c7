//! Account entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Account identifier - a random UUID assigned at sign-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse an identifier from its string form
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(id).map(Self).map_err(|e| {
            DomainError::invalid_id(format!("'{}' is not a valid account id: {}", id, e))
        })
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role tag distinguishing administrators from ordinary users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AccountRole {
    #[serde(rename = "admin")]
    Admin,
    #[default]
    #[serde(rename = "nonadmin")]
    NonAdmin,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::NonAdmin => "nonadmin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "nonadmin" => Some(Self::NonAdmin),
            _ => None,
        }
    }
}

/// Free-text profile details supplied at sign-up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
}

/// Sign-up input; credentials and identity are filled in during registration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountDraft {
    pub profile: AccountProfile,
    pub role: AccountRole,
}

impl AccountDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: AccountProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_role(mut self, role: AccountRole) -> Self {
        self.role = role;
        self
    }
}

/// Registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    username: String,
    email: String,
    /// Never exposed in serialization
    #[serde(skip_serializing)]
    password_hash: String,
    #[serde(skip_serializing)]
    salt: String,
    role: AccountRole,
    profile: AccountProfile,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_sign_in_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Build a newly registered account from a draft
    pub fn register(
        draft: AccountDraft,
        username: impl Into<String>,
        email: impl Into<String>,
        salt: impl Into<String>,
        password_hash: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AccountId::generate(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            salt: salt.into(),
            role: draft.role,
            profile: draft.profile,
            created_at: now,
            updated_at: now,
            last_sign_in_at: None,
        }
    }

    /// Replace the generated identifier (used when loading persisted rows)
    pub fn with_id(mut self, id: AccountId) -> Self {
        self.id = id;
        self
    }

    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    pub fn with_last_sign_in_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.last_sign_in_at = at;
        self
    }

    // Getters

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn role(&self) -> AccountRole {
        self.role
    }

    pub fn profile(&self) -> &AccountProfile {
        &self.profile
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn last_sign_in_at(&self) -> Option<DateTime<Utc>> {
        self.last_sign_in_at
    }

    pub fn is_admin(&self) -> bool {
        self.role == AccountRole::Admin
    }

    /// Stamp a successful sign-in without touching `updated_at`
    pub fn record_sign_in(&mut self, at: DateTime<Utc>) {
        self.last_sign_in_at = Some(at);
    }
}
