//! Account registration, sign-in sessions and token validation

use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use crate::domain::{
    Account, AccountDraft, AccountId, AccountRole, AccountStore, AuthError, AuthStore,
    AuthTransaction, Clock, DomainError, Session, SessionId, SessionStore, SignedOutCheck,
    SystemClock,
};
use crate::infrastructure::observability::record_auth_outcome;

use super::credentials::BasicCredentials;
use super::password::PasswordHasher;
use super::token::{SessionClaims, SessionTokenIssuer};

/// Default session lifetime
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 8;

/// Session lifetime and signed-out interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub ttl: Duration,
    pub signed_out_check: SignedOutCheck,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            signed_out_check: SignedOutCheck::default(),
        }
    }
}

impl SessionPolicy {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_signed_out_check(mut self, check: SignedOutCheck) -> Self {
        self.signed_out_check = check;
        self
    }
}

/// Request for registering a new account
#[derive(Clone)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub draft: AccountDraft,
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("draft", &self.draft)
            .finish()
    }
}

impl SignUpRequest {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            draft: AccountDraft::default(),
        }
    }

    pub fn with_draft(mut self, draft: AccountDraft) -> Self {
        self.draft = draft;
        self
    }
}

/// Orchestrates sign-up, sign-in, sign-out, token validation and account deletion.
///
/// Every operation runs inside one store transaction that is committed only on
/// success; an early return drops the transaction and rolls it back.
#[derive(Debug)]
pub struct AuthSessionManager<S: AuthStore, H: PasswordHasher> {
    store: Arc<S>,
    hasher: Arc<H>,
    tokens: Arc<dyn SessionTokenIssuer>,
    clock: Arc<dyn Clock>,
    policy: SessionPolicy,
}

impl<S: AuthStore, H: PasswordHasher> AuthSessionManager<S, H> {
    /// Create a new manager using the system clock and the default policy
    pub fn new(store: Arc<S>, hasher: Arc<H>, tokens: Arc<dyn SessionTokenIssuer>) -> Self {
        Self {
            store,
            hasher,
            tokens,
            clock: Arc::new(SystemClock),
            policy: SessionPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Register a new account
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<Account, AuthError> {
        let result = self.try_sign_up(request).await;
        record_auth_outcome("sign_up", &result);
        result
    }

    /// Authenticate a `Basic` credential blob and open a session
    pub async fn sign_in(&self, blob: &str) -> Result<Session, AuthError> {
        let result = self.try_sign_in(blob).await;
        record_auth_outcome("sign_in", &result);
        result
    }

    /// Terminate the session identified by `token` and return its owner
    pub async fn sign_out(&self, token: &str) -> Result<Account, AuthError> {
        let result = self.try_sign_out(token).await;
        record_auth_outcome("sign_out", &result);
        result
    }

    /// Resolve a token to the account that owns its live session
    pub async fn validate_token(&self, token: &str) -> Result<Account, AuthError> {
        let result = self.try_validate_token(token).await;
        record_auth_outcome("validate_token", &result);
        result
    }

    /// Get an account by ID
    pub async fn fetch_by_id(&self, id: &AccountId) -> Result<Account, AuthError> {
        let result = self.try_fetch_by_id(id).await;
        record_auth_outcome("fetch_by_id", &result);
        result
    }

    /// Delete `target` on behalf of `requesting`, which must be an admin
    pub async fn delete_account(
        &self,
        requesting: &Account,
        target: &AccountId,
    ) -> Result<Account, AuthError> {
        let result = self.try_delete_account(requesting, target).await;
        record_auth_outcome("delete_account", &result);
        result
    }

    /// Register an admin account unless the username is already taken.
    ///
    /// Returns `None` when the account already exists.
    pub async fn ensure_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, AuthError> {
        let request = SignUpRequest::new(username, email, password)
            .with_draft(AccountDraft::new().with_role(AccountRole::Admin));

        match self.sign_up(request).await {
            Ok(account) => Ok(Some(account)),
            Err(AuthError::DuplicateUsername) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Open and roll back a transaction to check the store is reachable
    pub async fn check_store(&self) -> Result<(), DomainError> {
        self.store.begin().await?.rollback().await
    }

    async fn try_sign_up(&self, request: SignUpRequest) -> Result<Account, AuthError> {
        let mut tx = self.store.begin().await?;

        if tx.find_account_by_username(&request.username).await?.is_some() {
            return Err(AuthError::DuplicateUsername);
        }

        if tx.find_account_by_email(&request.email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let hashed = self
            .hasher
            .hash(&request.password, None)
            .map_err(|e| AuthError::registration_failure(e.to_string()))?;

        let account = Account::register(
            request.draft,
            request.username,
            request.email,
            hashed.salt,
            hashed.hash,
            self.clock.now(),
        );

        let account = tx.insert_account(account).await.map_err(registration_error)?;
        tx.commit().await.map_err(registration_error)?;

        info!(
            account_id = %account.id(),
            username = %account.username(),
            role = account.role().as_str(),
            "Account registered"
        );

        Ok(account)
    }

    async fn try_sign_in(&self, blob: &str) -> Result<Session, AuthError> {
        let credentials = BasicCredentials::decode(blob)?;
        let mut tx = self.store.begin().await?;

        let mut account = tx
            .find_account_by_username(credentials.username())
            .await?
            .ok_or(AuthError::UnknownUser)?;

        if !self
            .hasher
            .verify(credentials.password(), account.salt(), account.password_hash())?
        {
            return Err(AuthError::BadCredentials);
        }

        let issued_at = self.clock.now();
        let expires_at = issued_at
            .checked_add_signed(self.policy.ttl)
            .ok_or_else(|| AuthError::session_persist_failure("session expiry out of range"))?;
        let session_id = SessionId::generate();

        let token = self
            .tokens
            .issue(&SessionClaims::new(account.id(), &session_id, issued_at, expires_at))
            .map_err(|e| AuthError::session_persist_failure(e.to_string()))?;

        let session = Session::new(session_id, *account.id(), token, issued_at, expires_at);
        let session = tx
            .insert_session(session)
            .await
            .map_err(|e| AuthError::session_persist_failure(e.to_string()))?;

        account.record_sign_in(issued_at);
        tx.update_account(&account)
            .await
            .map_err(|e| AuthError::session_persist_failure(e.to_string()))?;
        tx.commit()
            .await
            .map_err(|e| AuthError::session_persist_failure(e.to_string()))?;

        info!(
            account_id = %account.id(),
            session_id = %session.id(),
            expires_at = %session.expires_at(),
            "Signed in"
        );

        Ok(session)
    }

    async fn try_sign_out(&self, token: &str) -> Result<Account, AuthError> {
        let mut tx = self.store.begin().await?;

        let mut session = tx
            .find_session_by_token(token)
            .await?
            .ok_or(AuthError::NotSignedIn)?;

        session.sign_out(self.clock.now());
        tx.update_session(&session).await?;

        let account = tx
            .find_account_by_id(session.account_id())
            .await?
            .ok_or(AuthError::NotSignedIn)?;
        tx.commit().await?;

        info!(account_id = %account.id(), session_id = %session.id(), "Signed out");

        Ok(account)
    }

    async fn try_validate_token(&self, token: &str) -> Result<Account, AuthError> {
        let claims = self
            .tokens
            .verify(token)
            .map_err(|_| AuthError::NotSignedIn)?;

        let mut tx = self.store.begin().await?;

        let session = tx
            .find_session_by_token(token)
            .await?
            .ok_or(AuthError::NotSignedIn)?;

        if claims.account_id() != session.account_id().to_string() {
            return Err(AuthError::NotSignedIn);
        }

        let now = self.clock.now();

        if session.is_signed_out(self.policy.signed_out_check, now) {
            return Err(AuthError::SignedOut);
        }

        if session.is_expired(now) {
            return Err(AuthError::SessionExpired);
        }

        let account = tx
            .find_account_by_id(session.account_id())
            .await?
            .ok_or(AuthError::NotSignedIn)?;
        tx.commit().await?;

        Ok(account)
    }

    async fn try_fetch_by_id(&self, id: &AccountId) -> Result<Account, AuthError> {
        let mut tx = self.store.begin().await?;
        let account = tx.find_account_by_id(id).await?.ok_or(AuthError::NotFound)?;
        tx.commit().await?;

        Ok(account)
    }

    async fn try_delete_account(
        &self,
        requesting: &Account,
        target: &AccountId,
    ) -> Result<Account, AuthError> {
        if !requesting.is_admin() {
            return Err(AuthError::Forbidden);
        }

        let mut tx = self.store.begin().await?;

        let account = tx.find_account_by_id(target).await?.ok_or(AuthError::NotFound)?;
        let sessions_removed = tx.delete_sessions_for_account(target).await?;
        tx.delete_account(target).await?;
        tx.commit().await?;

        info!(
            account_id = %target,
            requested_by = %requesting.id(),
            sessions_removed,
            "Account deleted"
        );

        Ok(account)
    }
}

/// Map a store failure during registration, keeping unique-constraint races distinct
fn registration_error(err: DomainError) -> AuthError {
    match err.duplicate_field() {
        Some("username") => AuthError::DuplicateUsername,
        Some("email") => AuthError::DuplicateEmail,
        _ => AuthError::registration_failure(err.to_string()),
    }
}
